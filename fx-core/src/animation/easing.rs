//! # Easing 模块
//!
//! 缓动函数库，用于动画的时间插值。
//!
//! 输入被限制在 [0, 1]，输出**不做**限制：`OutBack`、`OutElastic` 会有意越过 1，
//! 用来产生回弹的视觉效果。

use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EasingFunction {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 二次缓入
    InQuad,
    /// 二次缓出
    OutQuad,
    /// 二次缓入缓出
    InOutQuad,
    /// 三次缓入
    InCubic,
    /// 三次缓出
    OutCubic,
    /// 三次缓入缓出
    InOutCubic,
    /// 回拉缓出（越过终点再回落）
    OutBack,
    /// 弹性缓出
    OutElastic,
    /// 弹跳缓出
    OutBounce,
    /// 指数缓入
    InExpo,
    /// 指数缓出
    OutExpo,
    /// 正弦缓入
    InSine,
    /// 正弦缓出
    OutSine,
    /// 正弦缓入缓出
    InOutSine,
}

impl EasingFunction {
    /// 名称查找失败时使用的缓动
    pub const FALLBACK: EasingFunction = EasingFunction::OutCubic;

    /// 全部缓动（注册表顺序）
    pub const ALL: [EasingFunction; 15] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::OutBack,
        Self::OutElastic,
        Self::OutBounce,
        Self::InExpo,
        Self::OutExpo,
        Self::InSine,
        Self::OutSine,
        Self::InOutSine,
    ];

    /// 注册表中的名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InQuad => "inQuad",
            Self::OutQuad => "outQuad",
            Self::InOutQuad => "inOutQuad",
            Self::InCubic => "inCubic",
            Self::OutCubic => "outCubic",
            Self::InOutCubic => "inOutCubic",
            Self::OutBack => "outBack",
            Self::OutElastic => "outElastic",
            Self::OutBounce => "outBounce",
            Self::InExpo => "inExpo",
            Self::OutExpo => "outExpo",
            Self::InSine => "inSine",
            Self::OutSine => "outSine",
            Self::InOutSine => "inOutSine",
        }
    }

    /// 按名称查找（大小写敏感）
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    /// 按名称查找，未知名称静默降级为 [`FALLBACK`](Self::FALLBACK)
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::debug!(name, "未知缓动名，降级为 outCubic");
            Self::FALLBACK
        })
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)，NaN 视为 1.0
    ///
    /// # 返回
    /// - 缓动后的进度值（回弹类缓动可能超出 [0, 1]）
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };

        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t).powi(2),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::InCubic => t.powi(3),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t.powi(3)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::OutBack => ease_out_back(t),
            Self::OutElastic => ease_out_elastic(t),
            Self::OutBounce => ease_out_bounce(t),
            Self::InExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f64.powf(10.0 * t - 10.0)
                }
            }
            Self::OutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
            Self::InSine => 1.0 - (t * PI / 2.0).cos(),
            Self::OutSine => (t * PI / 2.0).sin(),
            Self::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

impl FromStr for EasingFunction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ParseError::UnknownEasing {
            name: s.to_string(),
        })
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 回拉缓出（c = 1.7）
fn ease_out_back(t: f64) -> f64 {
    let c = 1.7;
    1.0 + (c + 1.0) * (t - 1.0).powi(3) + c * (t - 1.0).powi(2)
}

/// 弹性缓出
fn ease_out_elastic(t: f64) -> f64 {
    if t == 0.0 || t == 1.0 {
        t
    } else {
        let c4 = (2.0 * PI) / 3.0;
        2.0_f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
    }
}

/// 弹跳缓出
fn ease_out_bounce(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

/// 补间使用的缓动：注册表里的预设，或调用方直接传入的函数
#[derive(Clone)]
pub enum Ease {
    /// 注册表预设
    Preset(EasingFunction),
    /// 自定义函数
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl Ease {
    /// 包装自定义函数
    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    /// 按名称选择，未知名称降级为 `outCubic`
    pub fn named(name: &str) -> Self {
        Self::Preset(EasingFunction::resolve(name))
    }

    /// 计算缓动值
    ///
    /// 自定义函数返回非有限值时视为 1.0（保证补间能够结束）。
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Self::Preset(easing) => easing.apply(t),
            Self::Custom(f) => {
                let v = f(t);
                if v.is_finite() { v } else { 1.0 }
            }
        }
    }
}

impl Default for Ease {
    fn default() -> Self {
        Self::Preset(EasingFunction::Linear)
    }
}

impl fmt::Debug for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(easing) => write!(f, "Preset({})", easing),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<EasingFunction> for Ease {
    fn from(easing: EasingFunction) -> Self {
        Self::Preset(easing)
    }
}

impl From<&str> for Ease {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}
