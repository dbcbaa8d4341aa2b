//! # Shockwave 模块
//!
//! 扩散冲击环，以及按档位组合的环配方。
//!
//! 半径按 `max_radius * outCubic(p)` 增长，透明度与线宽随 `p` 线性收缩到 0。
//! 多环档位的错开通过每个环自带的启动延迟实现。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::{EasingFunction, Vec2};
use crate::color::Color;
use crate::error::ParseError;
use crate::surface::{DrawSurface, Stroke};

use super::particle::{Simulate, positive_life};

/// 冲击环发光半径
const GLOW_BLUR: f64 = 8.0;
/// 起始透明度
const START_ALPHA: f64 = 0.7;

/// 冲击档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShockwaveTier {
    #[default]
    Normal,
    Crit,
    Super,
    Ultra,
}

/// 单个环的配方
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingRecipe {
    pub max_radius: f64,
    /// 持续时间（秒）
    pub duration: f64,
    pub color: Color,
    pub line_width: f64,
    /// 启动延迟（秒）
    pub delay: f64,
}

const fn ring(max_radius: f64, duration: f64, color: Color, line_width: f64, delay: f64) -> RingRecipe {
    RingRecipe {
        max_radius,
        duration,
        color,
        line_width,
        delay,
    }
}

const NORMAL_RINGS: [RingRecipe; 1] = [ring(100.0, 0.45, Color::AMBER, 2.0, 0.0)];
const CRIT_RINGS: [RingRecipe; 1] = [ring(180.0, 0.6, Color::RED, 3.0, 0.0)];
const SUPER_RINGS: [RingRecipe; 2] = [
    ring(220.0, 0.65, Color::RED, 3.5, 0.0),
    ring(300.0, 0.8, Color::AMBER, 2.5, 0.1),
];
const ULTRA_RINGS: [RingRecipe; 3] = [
    ring(280.0, 0.7, Color::PINK, 4.0, 0.0),
    ring(350.0, 0.85, Color::VIOLET, 3.0, 0.08),
    ring(400.0, 0.95, Color::CYAN, 2.0, 0.16),
];

impl ShockwaveTier {
    pub const ALL: [ShockwaveTier; 4] = [Self::Normal, Self::Crit, Self::Super, Self::Ultra];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Crit => "crit",
            Self::Super => "super",
            Self::Ultra => "ultra",
        }
    }

    /// 宽松解析：未知名称按普通档处理
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            debug!(name, "未知冲击波等级，降级为 normal");
            Self::Normal
        })
    }

    /// 该档位的环（按启动先后排列）
    pub fn rings(&self) -> &'static [RingRecipe] {
        match self {
            Self::Normal => &NORMAL_RINGS,
            Self::Crit => &CRIT_RINGS,
            Self::Super => &SUPER_RINGS,
            Self::Ultra => &ULTRA_RINGS,
        }
    }
}

impl FromStr for ShockwaveTier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.name() == s)
            .ok_or_else(|| ParseError::UnknownShockwaveTier {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for ShockwaveTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 扩散环
#[derive(Debug, Clone)]
pub struct Shockwave {
    pub center: Vec2,
    pub max_radius: f64,
    pub color: Color,
    pub line_width: f64,
    duration: f64,
    delay: f64,
    t: f64,
}

impl Shockwave {
    pub fn new(center: Vec2, max_radius: f64, duration: f64, color: Color, line_width: f64) -> Self {
        Self {
            center,
            max_radius,
            color,
            line_width,
            duration: positive_life(duration),
            delay: 0.0,
            t: 0.0,
        }
    }

    /// 从配方创建
    pub fn from_recipe(center: Vec2, recipe: &RingRecipe) -> Self {
        Self::new(
            center,
            recipe.max_radius,
            recipe.duration,
            recipe.color,
            recipe.line_width,
        )
        .with_delay(recipe.delay)
    }

    /// 设置启动延迟（秒）；延迟期间不推进也不绘制
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// 剩余延迟
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// 已扩散时间
    pub fn elapsed(&self) -> f64 {
        self.t
    }

    /// 是否还在延迟中
    pub fn is_pending(&self) -> bool {
        self.delay > 0.0
    }

    /// 进度 `t / duration`，限制在 [0, 1]
    pub fn progress(&self) -> f64 {
        (self.t / self.duration).clamp(0.0, 1.0)
    }

    /// 当前半径
    pub fn radius(&self) -> f64 {
        self.max_radius * EasingFunction::OutCubic.apply(self.progress())
    }
}

impl Simulate for Shockwave {
    fn update(&mut self, mut dt: f64) {
        if self.delay > 0.0 {
            let used = dt.min(self.delay);
            self.delay -= used;
            dt -= used;
        }
        self.t += dt;
    }

    fn is_dead(&self) -> bool {
        self.t >= self.duration
    }

    fn is_degenerate(&self) -> bool {
        !(self.center.is_finite() && self.max_radius.is_finite() && self.t.is_finite())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        if self.is_pending() {
            return;
        }
        let p = self.progress();
        surface.save();
        surface.set_global_alpha((1.0 - p) * START_ALPHA);
        surface.set_glow(self.color, GLOW_BLUR);
        surface.stroke_circle(
            self.center,
            self.radius(),
            Stroke::new(self.color, self.line_width * (1.0 - p)),
        );
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_tier_recipes() {
        assert_eq!(ShockwaveTier::Normal.rings().len(), 1);
        assert_eq!(ShockwaveTier::Crit.rings()[0].max_radius, 180.0);
        assert_eq!(ShockwaveTier::Super.rings()[1].delay, 0.1);
        let ultra = ShockwaveTier::Ultra.rings();
        assert_eq!(ultra.len(), 3);
        assert_eq!(ultra[2].color, Color::CYAN);
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("ultra".parse::<ShockwaveTier>().unwrap(), ShockwaveTier::Ultra);
        assert!("mega".parse::<ShockwaveTier>().is_err());
        assert_eq!(ShockwaveTier::resolve("mega"), ShockwaveTier::Normal);
    }

    #[test]
    fn test_radius_reaches_max_at_duration() {
        let mut wave = Shockwave::new(Vec2::zero(), 100.0, 0.45, Color::AMBER, 2.0);
        assert_eq!(wave.radius(), 0.0);
        wave.update(0.2);
        assert!(wave.radius() > 0.0 && wave.radius() < 100.0);
        assert!(!wave.is_dead());
        wave.update(0.3);
        assert!(wave.is_dead());
        assert_eq!(wave.radius(), 100.0);
    }

    #[test]
    fn test_delay_consumed_first() {
        let mut wave = Shockwave::new(Vec2::zero(), 300.0, 0.8, Color::AMBER, 2.5).with_delay(0.1);
        wave.update(0.06);
        assert!(wave.is_pending());
        assert_eq!(wave.elapsed(), 0.0);

        let mut surface = RecordingSurface::new();
        wave.draw(&mut surface);
        assert_eq!(surface.primitive_count(), 0);

        wave.update(0.06);
        assert!(!wave.is_pending());
        assert!((wave.elapsed() - 0.02).abs() < 1e-12);
        wave.draw(&mut surface);
        assert_eq!(surface.ring_radii().len(), 1);
    }
}
