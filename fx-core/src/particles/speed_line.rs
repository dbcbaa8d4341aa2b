//! # SpeedLine 模块
//!
//! 从固定内半径向外延伸的径向速度线。

use crate::animation::{EasingFunction, Vec2};
use crate::color::Color;
use crate::surface::{DrawSurface, Stroke};

use super::particle::{Simulate, positive_life};
use super::registry::defaults;

/// 内半径在寿命内的增长量
const INNER_GROWTH: f64 = 20.0;
/// 外端缓动进度的提前量
const LEAD: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct SpeedLine {
    pub center: Vec2,
    /// 方向（弧度）
    pub angle: f64,
    pub length: f64,
    pub color: Color,
    pub inner_radius: f64,
    life: f64,
    max_life: f64,
}

impl SpeedLine {
    pub fn new(center: Vec2, angle: f64, length: f64, color: Color, life: f64) -> Self {
        let life = positive_life(life);
        Self {
            center,
            angle,
            length,
            color,
            inner_radius: defaults::SPEED_LINE_INNER_RADIUS,
            life,
            max_life: life,
        }
    }

    pub fn life(&self) -> f64 {
        self.life
    }

    pub fn alpha(&self) -> f64 {
        (self.life / self.max_life).max(0.0)
    }

    /// 当前线段的内外两端
    pub fn endpoints(&self) -> (Vec2, Vec2) {
        let t = 1.0 - self.alpha();
        let r1 = self.inner_radius + t * INNER_GROWTH;
        let r2 = r1 + self.length * EasingFunction::OutCubic.apply((t + LEAD).min(1.0));
        (
            self.center + Vec2::from_angle(self.angle, r1),
            self.center + Vec2::from_angle(self.angle, r2),
        )
    }
}

impl Simulate for SpeedLine {
    fn update(&mut self, dt: f64) {
        self.life -= dt;
    }

    fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    fn is_degenerate(&self) -> bool {
        !(self.center.is_finite() && self.angle.is_finite() && self.life.is_finite())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        let a = self.alpha();
        let (inner, outer) = self.endpoints();
        surface.save();
        surface.set_global_alpha(a * 0.55);
        surface.set_glow(self.color, 6.0);
        surface.stroke_path(&[inner, outer], Stroke::new(self.color, 2.5 * a).round());
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_recede_outward() {
        let mut line = SpeedLine::new(Vec2::zero(), 0.0, 100.0, Color::WHITE, 0.4);
        let (inner0, outer0) = line.endpoints();
        assert_eq!(inner0, Vec2::new(40.0, 0.0));
        assert!(outer0.x > inner0.x);

        line.update(0.2);
        let (inner1, outer1) = line.endpoints();
        assert!(inner1.x > inner0.x);
        assert!(outer1.x > outer0.x);
    }

    #[test]
    fn test_dies_after_life() {
        let mut line = SpeedLine::new(Vec2::zero(), 1.0, 80.0, Color::WHITE, 0.35);
        line.update(0.2);
        assert!(!line.is_dead());
        line.update(0.2);
        assert!(line.is_dead());
    }
}
