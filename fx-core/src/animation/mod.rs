//! # Animation 模块
//!
//! 关键帧补间系统：把任意数值属性沿关键帧序列、按缓动曲线推进，
//! 支持延迟、链式播放、优先级与按标签打断。
//!
//! ## 核心概念
//!
//! - `EasingFunction` / `Ease`: 缓动函数（名称注册表或自定义函数）
//! - `Keyframe` / `PropertyValue`: 关键帧与带标签的属性值
//! - `TweenConfig`: 补间配置
//! - `AnimationEngine`: 补间调度器
//! - `TweenTarget`: 目标接口（变换 + 透明度）
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut engine = AnimationEngine::new();
//! let hammer = Rc::new(RecordingTarget::new());
//!
//! engine.play(
//!     TweenConfig::new(vec![
//!         Keyframe::new().with("scale", 1.0).with("rotate", 0.0),
//!         Keyframe::new().with("scale", 0.88).with("rotate", -28.0),
//!         Keyframe::new().with("scale", 1.03).with("rotate", 0.0),
//!     ])
//!     .with_target(&hammer)
//!     .with_duration(140.0)
//!     .with_easing("outCubic")
//!     .with_tag("hammer"),
//! );
//!
//! // 每帧
//! engine.update(dt_ms);
//! ```

mod easing;
mod engine;
pub mod keyframe;
mod target;
mod transform;
mod tween;

pub use easing::{Ease, EasingFunction};
pub use engine::{AnimationEngine, AnimationHandle, TweenEvent};
pub use keyframe::{Keyframe, PropertyMap, PropertyValue};
pub use target::{RecordedState, RecordingTarget, TargetRef, TweenTarget, downgrade};
pub use transform::{Transform, Vec2};
pub use tween::{
    CompleteCallback, DEFAULT_DURATION_MS, MIN_DURATION_MS, Tween, TweenConfig, TweenId,
    TweenStep, UpdateCallback,
};
