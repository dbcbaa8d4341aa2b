//! # Particle 模块
//!
//! 粒子的统一接口与变体枚举。

use crate::surface::DrawSurface;

use super::firework::Firework;
use super::lightning::Lightning;
use super::orb::Orb;
use super::shockwave::Shockwave;
use super::spark::Spark;
use super::speed_line::SpeedLine;
use super::text::TextPopup;

/// 最小寿命（秒）；非正或非有限的寿命会被抬高到这里
pub const MIN_LIFE: f64 = 1e-3;

/// 规范化寿命
pub(crate) fn positive_life(life: f64) -> f64 {
    if life.is_finite() && life > 0.0 {
        life
    } else {
        MIN_LIFE
    }
}

/// 按参考帧率定义的衰减系数，换算到 `dt` 秒
pub(crate) fn frame_decay(factor: f64, dt: f64) -> f64 {
    factor.powf(dt * super::registry::defaults::REFERENCE_FPS)
}

/// 可模拟、可绘制的元素
///
/// `update` 只推进状态，`draw` 只读取状态。
pub trait Simulate {
    /// 推进 `dt` 秒
    fn update(&mut self, dt: f64);
    /// 是否应从池中移除
    fn is_dead(&self) -> bool;
    /// 绘制到表面
    fn draw(&self, surface: &mut dyn DrawSurface);
    /// 状态是否已退化（出现非有限值）
    fn is_degenerate(&self) -> bool {
        false
    }
}

/// 粒子变体
#[derive(Debug, Clone)]
pub enum Particle {
    /// 火花（余烬也是火花）
    Spark(Spark),
    Shockwave(Shockwave),
    Lightning(Lightning),
    SpeedLine(SpeedLine),
    Text(TextPopup),
    /// 烟花：共享生命周期的一组火花
    Firework(Firework),
    Orb(Orb),
}

impl Particle {
    /// 变体名称（日志用）
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Spark(_) => "spark",
            Self::Shockwave(_) => "shockwave",
            Self::Lightning(_) => "lightning",
            Self::SpeedLine(_) => "speed_line",
            Self::Text(_) => "text",
            Self::Firework(_) => "firework",
            Self::Orb(_) => "orb",
        }
    }

    fn inner(&self) -> &dyn Simulate {
        match self {
            Self::Spark(p) => p,
            Self::Shockwave(p) => p,
            Self::Lightning(p) => p,
            Self::SpeedLine(p) => p,
            Self::Text(p) => p,
            Self::Firework(p) => p,
            Self::Orb(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Simulate {
        match self {
            Self::Spark(p) => p,
            Self::Shockwave(p) => p,
            Self::Lightning(p) => p,
            Self::SpeedLine(p) => p,
            Self::Text(p) => p,
            Self::Firework(p) => p,
            Self::Orb(p) => p,
        }
    }

    pub fn as_spark(&self) -> Option<&Spark> {
        match self {
            Self::Spark(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_shockwave(&self) -> Option<&Shockwave> {
        match self {
            Self::Shockwave(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_lightning(&self) -> Option<&Lightning> {
        match self {
            Self::Lightning(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextPopup> {
        match self {
            Self::Text(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_orb(&self) -> Option<&Orb> {
        match self {
            Self::Orb(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_orb_mut(&mut self) -> Option<&mut Orb> {
        match self {
            Self::Orb(p) => Some(p),
            _ => None,
        }
    }
}

impl Simulate for Particle {
    fn update(&mut self, dt: f64) {
        self.inner_mut().update(dt);
    }

    fn is_dead(&self) -> bool {
        self.inner().is_dead()
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        self.inner().draw(surface);
    }

    fn is_degenerate(&self) -> bool {
        self.inner().is_degenerate()
    }
}

macro_rules! impl_from_variant {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Particle {
                fn from(p: $ty) -> Self {
                    Self::$variant(p)
                }
            }
        )*
    };
}

impl_from_variant! {
    Spark => Spark,
    Shockwave => Shockwave,
    Lightning => Lightning,
    SpeedLine => SpeedLine,
    TextPopup => Text,
    Firework => Firework,
    Orb => Orb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_life() {
        assert_eq!(positive_life(0.5), 0.5);
        assert_eq!(positive_life(0.0), MIN_LIFE);
        assert_eq!(positive_life(-1.0), MIN_LIFE);
        assert_eq!(positive_life(f64::NAN), MIN_LIFE);
    }

    #[test]
    fn test_frame_decay() {
        assert!((frame_decay(0.97, 1.0 / 60.0) - 0.97).abs() < 1e-12);
        assert_eq!(frame_decay(0.97, 0.0), 1.0);
    }
}
