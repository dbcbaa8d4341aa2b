//! # Keyframe 模块
//!
//! 关键帧与属性值。
//!
//! 关键帧是 `属性名 -> 属性值` 的映射，属性值按标签区分数值和不透明值：
//! 数值做线性插值，不透明值在补间结束前保持起点值，结束时切换为终点值。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 属性值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// 可插值的数值
    Number(f64),
    /// 不可插值的值（如颜色字符串、class 名）
    Opaque(String),
}

impl PropertyValue {
    /// 数值（不透明值返回 `None`）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Opaque(_) => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Opaque(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Opaque(v)
    }
}

/// 插值结果：属性名 -> 当前值
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// 关键帧
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyframe {
    props: PropertyMap,
}

impl Keyframe {
    /// 空关键帧
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式设置属性
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// 设置属性
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.props.insert(name.into(), value.into());
    }

    /// 读取属性
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.props.get(name)
    }

    /// 属性数量
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// 是否没有任何属性
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// 全部属性
    pub fn properties(&self) -> &PropertyMap {
        &self.props
    }

    /// 取出内部映射
    pub fn into_map(self) -> PropertyMap {
        self.props
    }
}

/// 数值插值，两端精确：`t == 0` 得到 `from`，`t == 1` 得到 `to`
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from * (1.0 - t) + to * t
}

/// 关键帧段定位结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// 段起点关键帧的索引
    pub index: usize,
    /// 段内局部进度
    pub local_t: f64,
}

/// 把缓动后的进度映射到关键帧段
///
/// `count` 个关键帧构成 `count - 1` 段；
/// 段索引限制在 `[0, count - 2]`，因此回弹缓动越界时只会在首/尾段内外推。
/// 少于两个关键帧时返回 `None`。
pub fn locate_segment(count: usize, eased: f64) -> Option<Segment> {
    if count < 2 {
        return None;
    }
    let seg_count = (count - 1) as f64;
    let scaled = eased * seg_count;
    let index = scaled.floor().clamp(0.0, seg_count - 1.0) as usize;
    Some(Segment {
        index,
        local_t: scaled - index as f64,
    })
}

/// 在两帧之间插值
///
/// 只遍历 `from` 中出现的属性：
/// - 两端都是数值：按 `t` 线性插值
/// - 其他情况：`complete` 为真时取 `to` 的值（`to` 缺失则省略），否则保持 `from` 的值
pub fn interpolate(from: &Keyframe, to: &Keyframe, t: f64, complete: bool) -> PropertyMap {
    let mut out = PropertyMap::new();
    for (name, from_value) in &from.props {
        let to_value = to.props.get(name);
        let value = match (from_value, to_value) {
            (PropertyValue::Number(a), Some(PropertyValue::Number(b))) => {
                Some(PropertyValue::Number(lerp(*a, *b, t)))
            }
            _ if complete => to_value.cloned(),
            _ => Some(from_value.clone()),
        };
        if let Some(value) = value {
            out.insert(name.clone(), value);
        }
    }
    out
}

/// 按缓动进度对整条关键帧序列取样
///
/// - 没有关键帧：空结果
/// - 只有一个关键帧：原样返回
pub fn sample(keyframes: &[Keyframe], eased: f64, complete: bool) -> PropertyMap {
    match locate_segment(keyframes.len(), eased) {
        Some(seg) => interpolate(
            &keyframes[seg.index],
            &keyframes[seg.index + 1],
            seg.local_t,
            complete,
        ),
        None => keyframes
            .first()
            .map(|kf| kf.props.clone())
            .unwrap_or_default(),
    }
}
