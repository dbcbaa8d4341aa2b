//! # FX Core
//!
//! 点击放置类游戏的实时视觉反馈核心库。
//!
//! ## 架构概述
//!
//! `fx-core` 不依赖任何窗口或渲染后端，由宿主每帧驱动：
//!
//! ```text
//! Host                                  fx-core
//!   │                                      │
//!   │── play() / chain() / cancel_tag() ─►│ AnimationEngine
//!   │── update(dt_ms) ───────────────────►│   → TweenTarget::set_transform
//!   │◄─ Vec<TweenEvent> ──────────────────│
//!   │                                      │
//!   │── emit_*() / update_orbs() ────────►│ ParticleEngine
//!   │── render(dt_s, &mut surface) ──────►│   → DrawSurface
//!   │                                      │
//! ```
//!
//! ## 核心类型
//!
//! - [`AnimationEngine`]：关键帧补间调度器
//! - [`ParticleEngine`]：预算受限的粒子模拟器
//! - [`TweenTarget`]：补间目标接口
//! - [`DrawSurface`]：二维绘制接口
//! - [`EngineConfig`]：引擎配置
//!
//! ## 使用示例
//!
//! ```ignore
//! use fx_core::{AnimationEngine, EngineConfig, RecordingSurface};
//!
//! let config = EngineConfig::load("fx.json");
//! let mut tweens = AnimationEngine::new();
//! let mut fx = config.particle_engine();
//! let mut surface = RecordingSurface::new();
//!
//! loop {
//!     let dt_ms = config.clamp_frame_delta(frame_ms);
//!     tweens.update(dt_ms);
//!     fx.render(dt_ms / 1000.0, &mut surface);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`animation`]：缓动、关键帧、补间与调度器
//! - [`particles`]：粒子池、粒子变体、配方与模拟器
//! - [`surface`]：绘制接口与记录型实现
//! - [`color`]：颜色与调色板
//! - [`rng`]：可注入随机源
//! - [`config`]：引擎配置
//! - [`error`]：错误类型定义

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod particles;
pub mod rng;
pub mod surface;

// 重导出核心类型
pub use animation::{
    AnimationEngine, AnimationHandle, Ease, EasingFunction, Keyframe, PropertyMap, PropertyValue,
    RecordingTarget, Transform, TweenConfig, TweenEvent, TweenId, TweenTarget, Vec2,
};
pub use color::Color;
pub use config::{DeviceSetting, EngineConfig};
pub use error::{ConfigError, ParseError};
pub use particles::{
    Budget, DeviceClass, LightningParams, ParticleEngine, ParticleStats, PoolKind, ShockwaveTier,
    SparkOptions, SparkShape,
};
pub use rng::FxRng;
pub use surface::{DrawCommand, DrawSurface, RecordingSurface};
