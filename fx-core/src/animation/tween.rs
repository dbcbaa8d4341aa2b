//! # Tween 模块
//!
//! 单个关键帧补间的配置与运行时实例。
//!
//! 时间单位为毫秒。

use std::fmt;
use std::rc::Rc;

use super::easing::Ease;
use super::keyframe::{self, Keyframe, PropertyMap};
use super::target::{self, TargetRef, TweenTarget};

/// 默认时长（毫秒）
pub const DEFAULT_DURATION_MS: f64 = 300.0;
/// 最小时长（毫秒）；更短的时长会被抬高到这里，避免除零
pub const MIN_DURATION_MS: f64 = 1.0;

/// 补间 ID（单调递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

impl TweenId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TweenId({})", self.0)
    }
}

/// 每帧回调：`(原始进度, 插值结果)`
pub type UpdateCallback = Box<dyn FnMut(f64, &PropertyMap)>;
/// 完成回调
pub type CompleteCallback = Box<dyn FnOnce()>;

/// 补间配置
///
/// 所有可选字段都有默认值，畸形配置只会得到退化的动画，不会报错。
#[derive(Default)]
pub struct TweenConfig {
    /// 目标（可选）
    pub target: Option<TargetRef>,
    /// 关键帧序列
    pub keyframes: Vec<Keyframe>,
    /// 时长（毫秒），缺省为 [`DEFAULT_DURATION_MS`]
    pub duration: Option<f64>,
    /// 启动延迟（毫秒）
    pub delay: f64,
    /// 缓动，缺省为线性
    pub easing: Ease,
    /// 优先级
    pub priority: i32,
    /// 打断标签
    pub tag: Option<String>,
    /// 每帧回调
    pub on_update: Option<UpdateCallback>,
    /// 完成回调
    pub on_complete: Option<CompleteCallback>,
}

impl TweenConfig {
    /// 创建补间配置
    pub fn new(keyframes: Vec<Keyframe>) -> Self {
        Self {
            keyframes,
            ..Self::default()
        }
    }

    /// 设置目标（引擎只持有弱引用）
    pub fn with_target<T: TweenTarget + 'static>(mut self, target: &Rc<T>) -> Self {
        self.target = Some(target::downgrade(target));
        self
    }

    /// 设置时长（毫秒）
    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration = Some(duration_ms);
        self
    }

    /// 设置延迟（毫秒）
    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay = delay_ms;
        self
    }

    /// 设置缓动（预设、名称或自定义函数）
    pub fn with_easing(mut self, easing: impl Into<Ease>) -> Self {
        self.easing = easing.into();
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 设置打断标签
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// 设置每帧回调
    pub fn on_update(mut self, f: impl FnMut(f64, &PropertyMap) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// 设置完成回调
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// 规范化后的时长
    pub fn effective_duration(&self) -> f64 {
        sanitize_duration(self.duration)
    }

    /// 规范化后的延迟
    pub fn effective_delay(&self) -> f64 {
        sanitize_delay(self.delay)
    }
}

impl fmt::Debug for TweenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenConfig")
            .field("keyframes", &self.keyframes.len())
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("priority", &self.priority)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

fn sanitize_duration(duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d.is_finite() => d.max(MIN_DURATION_MS),
        _ => DEFAULT_DURATION_MS,
    }
}

fn sanitize_delay(delay: f64) -> f64 {
    if delay.is_finite() { delay.max(0.0) } else { 0.0 }
}

/// 单帧推进的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenStep {
    /// 仍在延迟中
    Waiting,
    /// 播放中
    Running,
    /// 本帧到达终点
    Finished,
}

/// 运行中的补间
pub struct Tween {
    id: TweenId,
    target: Option<TargetRef>,
    keyframes: Vec<Keyframe>,
    duration: f64,
    delay: f64,
    easing: Ease,
    priority: i32,
    tag: Option<String>,
    elapsed: f64,
    started: bool,
    progress: f64,
    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,
}

impl Tween {
    /// 从配置创建
    pub fn new(id: TweenId, config: TweenConfig) -> Self {
        Self {
            id,
            duration: config.effective_duration(),
            delay: config.effective_delay(),
            target: config.target,
            keyframes: config.keyframes,
            easing: config.easing,
            priority: config.priority,
            tag: config.tag,
            elapsed: 0.0,
            started: false,
            progress: 0.0,
            on_update: config.on_update,
            on_complete: config.on_complete,
        }
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// 规范化后的时长（毫秒）
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// 规范化后的延迟（毫秒）
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// 延迟是否已过
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// 最近一次计算的原始进度（0.0 - 1.0）
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// 是否会被 `(tag, priority)` 的新补间打断
    pub fn yields_to(&self, tag: &str, priority: i32) -> bool {
        self.tag.as_deref() == Some(tag) && self.priority <= priority
    }

    /// 推进 `dt` 毫秒
    ///
    /// 依次：计算进度 → 关键帧插值 → 应用到目标 → 每帧回调。
    /// 返回 [`TweenStep::Finished`] 时完成回调尚未调用，由调用方在移除时调用
    /// [`finish`](Self::finish)。
    pub fn advance(&mut self, dt: f64) -> TweenStep {
        self.elapsed += dt;
        if self.elapsed < self.delay {
            return TweenStep::Waiting;
        }
        self.started = true;

        let raw = ((self.elapsed - self.delay) / self.duration).min(1.0);
        let raw = if raw.is_nan() { 1.0 } else { raw };
        self.progress = raw;

        let complete = raw >= 1.0;
        let eased = self.easing.apply(raw);
        let props = keyframe::sample(&self.keyframes, eased, complete);

        target::apply(self.target.as_ref(), &props);
        if let Some(on_update) = self.on_update.as_mut() {
            on_update(raw, &props);
        }

        if complete {
            TweenStep::Finished
        } else {
            TweenStep::Running
        }
    }

    /// 调用完成回调（只会调用一次）
    pub fn finish(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.id)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("priority", &self.priority)
            .field("tag", &self.tag)
            .field("elapsed", &self.elapsed)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}
