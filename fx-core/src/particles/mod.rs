//! # Particles 模块
//!
//! 预算受限的特效模拟器：火花、冲击环、分叉闪电、速度线、飘字、
//! 余烬、烟花、环绕光球与指针轨迹。
//!
//! ## 核心概念
//!
//! - `PoolKind` / `Budget`: 分类与容量上限（按设备档位区分）
//! - `Pool`: FIFO 淘汰的固定容量池
//! - `Particle` / `Simulate`: 粒子变体与统一的推进/绘制接口
//! - `ParticleEngine`: 持有全部池与随机源的模拟器
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut fx = ParticleEngine::new(DeviceClass::detect(user_agent));
//! fx.emit_shockwave(click, ShockwaveTier::Crit);
//! fx.emit_sparks(click, 24, &[Color::AMBER, Color::RED], &SparkOptions::default());
//!
//! // 每帧
//! fx.render(dt_seconds, &mut surface);
//! ```

mod engine;
mod firework;
mod lightning;
mod orb;
mod particle;
mod pool;
pub mod presets;
mod registry;
mod shockwave;
mod spark;
mod speed_line;
mod text;
mod trail;

pub use engine::{ParticleEngine, ParticleStats};
pub use firework::Firework;
pub use lightning::{Lightning, LightningParams};
pub use orb::Orb;
pub use particle::{MIN_LIFE, Particle, Simulate};
pub use pool::{Entry, Pool};
pub use presets::SparkOptions;
pub use registry::{Budget, BudgetOverrides, DeviceClass, PoolKind, defaults};
pub use shockwave::{RingRecipe, Shockwave, ShockwaveTier};
pub use spark::{Spark, SparkShape, star_path};
pub use speed_line::SpeedLine;
pub use text::TextPopup;
pub use trail::{Trail, TrailPoint};
