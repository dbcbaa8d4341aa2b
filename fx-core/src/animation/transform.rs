//! # Transform 模块
//!
//! 二维向量与组合变换（平移、缩放、旋转）。

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::keyframe::PropertyMap;

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 单位向量 (1, 1)
    pub const fn one() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// 极坐标构造：方向 `angle`（弧度），长度 `length`
    pub fn from_angle(angle: f64, length: f64) -> Self {
        Self {
            x: angle.cos() * length,
            y: angle.sin() * length,
        }
    }

    /// 中点
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// 线性插值
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// 两个分量都是有限数
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for (f64, f64) {
    fn from(v: Vec2) -> Self {
        (v.x, v.y)
    }
}

/// 组合变换
///
/// 应用顺序与 CSS 一致：先平移，再缩放，最后旋转。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// 平移（像素）
    pub translate: Vec2,
    /// 缩放因子
    pub scale: Vec2,
    /// 旋转角度（度）
    pub rotation_deg: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate: Vec2::zero(),
            scale: Vec2::one(),
            rotation_deg: 0.0,
        }
    }
}

impl Transform {
    /// 无平移、无缩放、无旋转
    pub fn identity() -> Self {
        Self::default()
    }

    /// 从插值后的属性组合变换
    ///
    /// 识别的属性：`translateX`、`translateY`、`scaleX`、`scaleY`、
    /// `scale`（`scaleX`/`scaleY` 缺失时的统一缩放）、`rotate`（度）。
    /// 缺失的平移取 0，缺失的缩放取 1，缺失的旋转取 0。
    pub fn from_properties(props: &PropertyMap) -> Self {
        let number = |key: &str| props.get(key).and_then(|v| v.as_number());
        let uniform = number("scale");

        Self {
            translate: Vec2::new(
                number("translateX").unwrap_or(0.0),
                number("translateY").unwrap_or(0.0),
            ),
            scale: Vec2::new(
                number("scaleX").or(uniform).unwrap_or(1.0),
                number("scaleY").or(uniform).unwrap_or(1.0),
            ),
            rotation_deg: number("rotate").unwrap_or(0.0),
        }
    }

    /// 旋转角度（弧度）
    pub fn rotation_rad(&self) -> f64 {
        self.rotation_deg.to_radians()
    }

    /// CSS `transform` 字符串，供 DOM 类目标直接使用
    pub fn to_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({}, {}) rotate({}deg)",
            self.translate.x, self.translate.y, self.scale.x, self.scale.y, self.rotation_deg
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::keyframe::Keyframe;

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.translate, Vec2::zero());
        assert_eq!(t.scale, Vec2::one());
        assert_eq!(t.rotation_deg, 0.0);
    }

    #[test]
    fn test_from_properties_uniform_scale_fallback() {
        let props = Keyframe::new()
            .with("scale", 2.0)
            .with("scaleY", 0.5)
            .with("rotate", -28.0)
            .into_map();
        let t = Transform::from_properties(&props);
        assert_eq!(t.scale, Vec2::new(2.0, 0.5));
        assert_eq!(t.rotation_deg, -28.0);
        assert_eq!(t.translate, Vec2::zero());
    }

    #[test]
    fn test_to_css() {
        let props = Keyframe::new()
            .with("translateX", 4.0)
            .with("translateY", -2.5)
            .into_map();
        let t = Transform::from_properties(&props);
        assert_eq!(t.to_css(), "translate(4px, -2.5px) scale(1, 1) rotate(0deg)");
    }

    #[test]
    fn test_vec2_ops() {
        let v1 = Vec2::new(0.0, 0.0);
        let v2 = Vec2::new(10.0, 20.0);
        let mid = v1.lerp(v2, 0.5);
        assert_eq!(mid, Vec2::new(5.0, 10.0));
        assert_eq!(v1.midpoint(v2), mid);
        assert_eq!(v2 - v1, v2);
        assert_eq!(v2 * 0.5 + v1, mid);
        assert!(!Vec2::new(f64::NAN, 0.0).is_finite());
    }
}
