//! # Target 模块
//!
//! 补间目标接口。
//!
//! 目标由调用方拥有，引擎只持有 `Weak` 引用；目标被释放后，
//! 属性应用在该帧被跳过，补间仍按时结束。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::keyframe::{PropertyMap, PropertyValue};
use super::transform::Transform;

/// 补间目标
///
/// 方法都取 `&self`：实现方通过 `RefCell`/`Cell` 管理内部可变性。
pub trait TweenTarget {
    /// 目标是否仍然有效（例如已从场景移除时返回 false）
    fn is_valid(&self) -> bool {
        true
    }

    /// 设置组合变换
    fn set_transform(&self, transform: &Transform);

    /// 设置透明度（只有插值结果包含 `opacity` 时才会调用）
    fn set_opacity(&self, opacity: f64);

    /// 逐个接收插值后的属性（默认忽略）
    fn set_property(&self, _name: &str, _value: &PropertyValue) {}
}

/// 目标的非拥有引用
pub type TargetRef = Weak<dyn TweenTarget>;

/// 从 `Rc` 创建非拥有引用
pub fn downgrade<T: TweenTarget + 'static>(target: &Rc<T>) -> TargetRef {
    let target: Rc<dyn TweenTarget> = target.clone();
    Rc::downgrade(&target)
}

/// 把一帧的插值结果应用到目标
///
/// 目标不存在或无效时返回 false，不做任何事。
pub(crate) fn apply(target: Option<&TargetRef>, props: &PropertyMap) -> bool {
    let Some(target) = target.and_then(Weak::upgrade) else {
        return false;
    };
    if !target.is_valid() {
        return false;
    }

    target.set_transform(&Transform::from_properties(props));
    if let Some(opacity) = props.get("opacity").and_then(PropertyValue::as_number) {
        target.set_opacity(opacity.clamp(0.0, 1.0));
    }
    for (name, value) in props {
        target.set_property(name, value);
    }
    true
}

/// 记录型目标的内部数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedState {
    /// 最近一次设置的变换
    pub transform: Option<Transform>,
    /// 最近一次设置的透明度
    pub opacity: Option<f64>,
    /// 最近一次设置的各属性
    pub properties: PropertyMap,
    /// 变换被设置的次数
    pub transform_writes: usize,
}

/// 记录型目标：保存最近一次写入的值
///
/// 用于无窗口运行和测试；也可以作为真实目标的状态缓冲。
#[derive(Debug, Default)]
pub struct RecordingTarget {
    state: RefCell<RecordedState>,
    detached: std::cell::Cell<bool>,
}

impl RecordingTarget {
    /// 创建新的记录型目标
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前记录的状态（拷贝）
    pub fn state(&self) -> RecordedState {
        self.state.borrow().clone()
    }

    /// 最近一次写入的数值属性
    pub fn number(&self, name: &str) -> Option<f64> {
        self.state
            .borrow()
            .properties
            .get(name)
            .and_then(PropertyValue::as_number)
    }

    /// 标记为已脱离（之后 `is_valid` 返回 false）
    pub fn detach(&self) {
        self.detached.set(true);
    }
}

impl TweenTarget for RecordingTarget {
    fn is_valid(&self) -> bool {
        !self.detached.get()
    }

    fn set_transform(&self, transform: &Transform) {
        let mut state = self.state.borrow_mut();
        state.transform = Some(*transform);
        state.transform_writes += 1;
    }

    fn set_opacity(&self, opacity: f64) {
        self.state.borrow_mut().opacity = Some(opacity);
    }

    fn set_property(&self, name: &str, value: &PropertyValue) {
        self.state
            .borrow_mut()
            .properties
            .insert(name.to_string(), value.clone());
    }
}
