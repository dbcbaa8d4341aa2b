//! # Engine 模块
//!
//! 补间调度器。
//!
//! 宿主每帧调用一次 [`AnimationEngine::update`]；游戏逻辑调用 `play`/`chain`/`cancel`
//! 排入新动画。回调运行时引擎正被独占借用，回调里如需再排动画，使用
//! [`AnimationHandle`]：
//!
//! ```rust,ignore
//! let handle = engine.handle();
//! engine.play(
//!     TweenConfig::new(swing_keyframes())
//!         .with_duration(140.0)
//!         .on_complete(move || {
//!             handle.play(TweenConfig::new(settle_keyframes()));
//!         }),
//! );
//! ```
//!
//! 经由句柄排入的操作在下一次 `update` 开始前（帧间排入的）或本次 `update`
//! 结束后（帧内回调排入的）生效，不会在排入它的那一帧被推进。

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use super::tween::{Tween, TweenConfig, TweenId, TweenStep};

/// 补间事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TweenEvent {
    /// 延迟结束，开始播放
    Started(TweenId),
    /// 播放完成（完成回调已调用）
    Completed(TweenId),
    /// 被同标签、优先级不低于它的新补间打断
    Interrupted(TweenId),
}

/// 排队中的操作
enum PendingOp {
    Play(TweenId, TweenConfig),
    Cancel(TweenId),
    CancelTag(String),
}

/// 引擎与句柄共享的状态
struct Shared {
    next_id: Cell<u64>,
    pending: RefCell<Vec<PendingOp>>,
}

impl Shared {
    fn alloc_id(&self) -> TweenId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TweenId(id)
    }

    fn push(&self, op: PendingOp) {
        self.pending.borrow_mut().push(op);
    }
}

/// 把一组配置改写为首尾相接：每项的延迟加上之前各项 `延迟 + 时长` 之和
fn chain_delays(configs: Vec<TweenConfig>) -> Vec<TweenConfig> {
    let mut offset = 0.0;
    configs
        .into_iter()
        .map(|mut config| {
            let own = config.effective_delay();
            let duration = config.effective_duration();
            config.delay = own + offset;
            offset += own + duration;
            config
        })
        .collect()
}

/// 补间调度器
///
/// 持有全部活动补间，按插入顺序推进。
pub struct AnimationEngine {
    /// 活动补间（插入顺序）
    tweens: Vec<Tween>,
    /// 与句柄共享的 ID 计数器和操作队列
    shared: Rc<Shared>,
    /// 待返回的事件
    events: Vec<TweenEvent>,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnimationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationEngine")
            .field("tweens", &self.tweens.len())
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl AnimationEngine {
    /// 创建新的调度器
    pub fn new() -> Self {
        Self {
            tweens: Vec::new(),
            shared: Rc::new(Shared {
                next_id: Cell::new(1),
                pending: RefCell::new(Vec::new()),
            }),
            events: Vec::new(),
        }
    }

    /// 获取可在回调中使用的句柄
    pub fn handle(&self) -> AnimationHandle {
        AnimationHandle {
            shared: self.shared.clone(),
        }
    }

    // ========== 动画控制 ==========

    /// 播放补间，立即返回 ID
    ///
    /// 带标签时，先移除所有同标签且优先级 ≤ 新补间的活动补间
    /// （同优先级也会被覆盖：后到者胜出）。
    pub fn play(&mut self, config: TweenConfig) -> TweenId {
        let id = self.shared.alloc_id();
        self.insert(id, config);
        id
    }

    /// 依次播放一组补间（首尾相接）
    pub fn chain(&mut self, configs: Vec<TweenConfig>) -> Vec<TweenId> {
        chain_delays(configs)
            .into_iter()
            .map(|config| self.play(config))
            .collect()
    }

    /// 按 ID 取消；不存在时无操作
    pub fn cancel(&mut self, id: TweenId) {
        self.tweens.retain(|t| t.id() != id);
        self.shared
            .pending
            .borrow_mut()
            .retain(|op| !matches!(op, PendingOp::Play(pid, _) if *pid == id));
    }

    /// 取消某标签下的全部补间；没有时无操作
    pub fn cancel_tag(&mut self, tag: &str) {
        self.tweens.retain(|t| t.tag() != Some(tag));
        self.shared.pending.borrow_mut().retain(
            |op| !matches!(op, PendingOp::Play(_, config) if config.tag.as_deref() == Some(tag)),
        );
    }

    /// 推进所有补间 `dt_ms` 毫秒
    ///
    /// 非有限或负的 `dt_ms` 视为 0。
    ///
    /// # 返回
    /// 本帧产生的事件（包括自上次 `update` 以来的打断事件）
    pub fn update(&mut self, dt_ms: f64) -> Vec<TweenEvent> {
        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        self.flush_pending();

        let events = &mut self.events;
        self.tweens.retain_mut(|tween| {
            let was_started = tween.is_started();
            let step = tween.advance(dt);
            if !was_started && tween.is_started() {
                events.push(TweenEvent::Started(tween.id()));
            }
            match step {
                TweenStep::Finished => {
                    tween.finish();
                    events.push(TweenEvent::Completed(tween.id()));
                    false
                }
                TweenStep::Waiting | TweenStep::Running => true,
            }
        });

        // 回调里排入的操作：进入活动集，但本帧不推进
        self.flush_pending();

        trace!(active = self.tweens.len(), "补间帧推进完成");
        std::mem::take(&mut self.events)
    }

    /// 立即应用句柄排入的操作
    pub fn flush_pending(&mut self) {
        let ops = std::mem::take(&mut *self.shared.pending.borrow_mut());
        for op in ops {
            match op {
                PendingOp::Play(id, config) => self.insert(id, config),
                PendingOp::Cancel(id) => self.cancel(id),
                PendingOp::CancelTag(tag) => self.cancel_tag(&tag),
            }
        }
    }

    /// 清空所有补间和排队操作（不调用完成回调）
    pub fn clear(&mut self) {
        self.tweens.clear();
        self.shared.pending.borrow_mut().clear();
        self.events.clear();
    }

    fn insert(&mut self, id: TweenId, config: TweenConfig) {
        if let Some(tag) = config.tag.as_deref() {
            let priority = config.priority;
            let events = &mut self.events;
            self.tweens.retain(|t| {
                if t.yields_to(tag, priority) {
                    debug!(interrupted = %t.id(), by = %id, tag, "同标签补间被打断");
                    events.push(TweenEvent::Interrupted(t.id()));
                    false
                } else {
                    true
                }
            });
        }
        self.tweens.push(Tween::new(id, config));
    }

    // ========== 查询方法 ==========

    /// 活动补间数量
    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    /// 句柄排入、尚未生效的操作数量
    pub fn pending_count(&self) -> usize {
        self.shared.pending.borrow().len()
    }

    /// 检查某补间是否仍在活动集中
    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.iter().any(|t| t.id() == id)
    }

    /// 按标签查找活动补间的 ID（插入顺序）
    pub fn ids_with_tag(&self, tag: &str) -> Vec<TweenId> {
        self.tweens
            .iter()
            .filter(|t| t.tag() == Some(tag))
            .map(Tween::id)
            .collect()
    }
}

/// 调度器句柄
///
/// 可克隆、可被回调捕获；操作先排队，由调度器在安全的时机应用。
#[derive(Clone)]
pub struct AnimationHandle {
    shared: Rc<Shared>,
}

impl AnimationHandle {
    /// 排入一个补间，立即返回它将使用的 ID
    pub fn play(&self, config: TweenConfig) -> TweenId {
        let id = self.shared.alloc_id();
        self.shared.push(PendingOp::Play(id, config));
        id
    }

    /// 排入一组首尾相接的补间
    pub fn chain(&self, configs: Vec<TweenConfig>) -> Vec<TweenId> {
        chain_delays(configs)
            .into_iter()
            .map(|config| self.play(config))
            .collect()
    }

    /// 排入取消操作
    pub fn cancel(&self, id: TweenId) {
        self.shared.push(PendingOp::Cancel(id));
    }

    /// 排入按标签取消
    pub fn cancel_tag(&self, tag: impl Into<String>) {
        self.shared.push(PendingOp::CancelTag(tag.into()));
    }
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("pending", &self.shared.pending.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::keyframe::Keyframe;
    use crate::animation::target::RecordingTarget;

    fn x_keyframes() -> Vec<Keyframe> {
        vec![
            Keyframe::new().with("x", 0.0),
            Keyframe::new().with("x", 10.0),
        ]
    }

    fn tagged(tag: &str, priority: i32) -> TweenConfig {
        TweenConfig::new(x_keyframes())
            .with_duration(100.0)
            .with_tag(tag)
            .with_priority(priority)
    }

    #[test]
    fn test_engine_creation() {
        let engine = AnimationEngine::new();
        assert_eq!(engine.active_count(), 0);
        assert_eq!(engine.pending_count(), 0);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut engine = AnimationEngine::new();
        let a = engine.play(TweenConfig::new(x_keyframes()));
        let b = engine.handle().play(TweenConfig::new(x_keyframes()));
        let c = engine.play(TweenConfig::new(x_keyframes()));
        assert!(a < b && b < c);
    }

    #[test]
    fn test_play_has_no_side_effects_until_update() {
        let mut engine = AnimationEngine::new();
        let target = Rc::new(RecordingTarget::new());
        engine.play(TweenConfig::new(x_keyframes()).with_target(&target));
        assert_eq!(target.state().transform_writes, 0);

        engine.update(0.0);
        assert_eq!(target.number("x"), Some(0.0));
    }

    #[test]
    fn test_equal_priority_overrides() {
        let mut engine = AnimationEngine::new();
        let a = engine.play(tagged("x", 2));
        let b = engine.play(tagged("x", 2));
        assert!(!engine.is_active(a));
        assert!(engine.is_active(b));

        let events = engine.update(0.0);
        assert!(events.contains(&TweenEvent::Interrupted(a)));
    }

    #[test]
    fn test_lower_priority_does_not_override() {
        let mut engine = AnimationEngine::new();
        let b = engine.play(tagged("x", 2));
        let c = engine.play(tagged("x", 1));
        assert!(engine.is_active(b));
        assert!(engine.is_active(c));
        assert_eq!(engine.ids_with_tag("x"), vec![b, c]);
    }

    #[test]
    fn test_untagged_never_interrupts() {
        let mut engine = AnimationEngine::new();
        engine.play(tagged("x", 0));
        engine.play(TweenConfig::new(x_keyframes()).with_priority(99));
        assert_eq!(engine.active_count(), 2);
    }

    #[test]
    fn test_cancel_and_cancel_tag() {
        let mut engine = AnimationEngine::new();
        let a = engine.play(tagged("a", 0));
        engine.play(tagged("b", 0));
        engine.play(tagged("b", -1));

        engine.cancel(a);
        assert!(!engine.is_active(a));
        engine.cancel(TweenId(999));
        assert_eq!(engine.active_count(), 2);

        engine.cancel_tag("b");
        assert_eq!(engine.active_count(), 0);
        engine.cancel_tag("missing");
    }

    #[test]
    fn test_chain_runs_back_to_back() {
        let mut engine = AnimationEngine::new();
        let starts = Rc::new(RefCell::new(Vec::new()));

        let configs = (0..3)
            .map(|i| {
                let starts = starts.clone();
                let mut fired = false;
                TweenConfig::new(x_keyframes())
                    .with_duration(100.0)
                    .on_update(move |_, _| {
                        if !fired {
                            fired = true;
                            starts.borrow_mut().push(i);
                        }
                    })
            })
            .collect();
        let ids = engine.chain(configs);
        assert_eq!(ids.len(), 3);

        // 每段 100ms，帧长 50ms
        let mut started_at = Vec::new();
        for frame in 0..8 {
            let before = starts.borrow().len();
            engine.update(50.0);
            if starts.borrow().len() > before {
                started_at.push(frame);
            }
        }
        assert_eq!(started_at, vec![0, 1, 3]);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_chain_accounts_for_own_delay() {
        let chained = chain_delays(vec![
            TweenConfig::new(x_keyframes()).with_duration(100.0).with_delay(20.0),
            TweenConfig::new(x_keyframes()).with_duration(50.0),
            TweenConfig::new(x_keyframes()).with_delay(10.0),
        ]);
        let delays: Vec<f64> = chained.iter().map(|c| c.delay).collect();
        assert_eq!(delays, vec![20.0, 120.0, 180.0]);
    }

    #[test]
    fn test_handle_play_from_completion_callback() {
        let mut engine = AnimationEngine::new();
        let handle = engine.handle();
        let target = Rc::new(RecordingTarget::new());
        let follow_up_target = target.clone();

        engine.play(
            TweenConfig::new(x_keyframes())
                .with_duration(10.0)
                .on_complete(move || {
                    handle.play(
                        TweenConfig::new(vec![
                            Keyframe::new().with("y", 0.0),
                            Keyframe::new().with("y", 4.0),
                        ])
                        .with_duration(10.0)
                        .with_target(&follow_up_target),
                    );
                }),
        );

        engine.update(10.0);
        // 第一段已完成，后续补间已入队但本帧未推进
        assert_eq!(engine.active_count(), 1);
        assert_eq!(target.number("y"), None);

        engine.update(5.0);
        assert_eq!(target.number("y"), Some(2.0));
    }

    #[test]
    fn test_handle_ops_between_ticks_apply_before_pass() {
        let mut engine = AnimationEngine::new();
        let handle = engine.handle();
        let target = Rc::new(RecordingTarget::new());

        let id = handle.play(
            TweenConfig::new(x_keyframes())
                .with_duration(100.0)
                .with_target(&target),
        );
        assert_eq!(engine.pending_count(), 1);
        assert!(!engine.is_active(id));

        engine.update(50.0);
        assert_eq!(target.number("x"), Some(5.0));

        handle.cancel(id);
        engine.update(10.0);
        assert!(!engine.is_active(id));
        assert_eq!(target.number("x"), Some(5.0));
    }

    #[test]
    fn test_cancel_removes_pending_play() {
        let mut engine = AnimationEngine::new();
        let id = engine.handle().play(TweenConfig::new(x_keyframes()));
        engine.cancel(id);
        assert_eq!(engine.pending_count(), 0);
        engine.update(1.0);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_started_and_completed_events() {
        let mut engine = AnimationEngine::new();
        let id = engine.play(TweenConfig::new(x_keyframes()).with_duration(20.0).with_delay(10.0));

        assert!(engine.update(5.0).is_empty());
        assert_eq!(engine.update(10.0), vec![TweenEvent::Started(id)]);
        assert_eq!(engine.update(20.0), vec![TweenEvent::Completed(id)]);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut engine = AnimationEngine::new();
        let id = engine.play(TweenConfig::new(x_keyframes()).with_duration(10.0));
        engine.update(f64::NAN);
        engine.update(-100.0);
        assert!(engine.is_active(id));
        engine.update(10.0);
        assert!(!engine.is_active(id));
    }

    #[test]
    fn test_clear() {
        let mut engine = AnimationEngine::new();
        engine.play(TweenConfig::new(x_keyframes()));
        engine.handle().play(TweenConfig::new(x_keyframes()));
        engine.clear();
        assert_eq!(engine.active_count(), 0);
        assert_eq!(engine.pending_count(), 0);
    }
}
