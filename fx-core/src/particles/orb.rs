//! # Orb 模块
//!
//! 环绕中心做椭圆运动的常驻光球。光球没有寿命，只会被池淘汰或清空。

use crate::animation::Vec2;
use crate::color::Color;
use crate::rng::FxRng;
use crate::surface::DrawSurface;

use super::particle::Simulate;
use super::registry::defaults;

const GLOW_BLUR: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct Orb {
    /// 轨道中心（随宿主移动）
    pub center: Vec2,
    /// 当前角度（弧度）
    pub angle: f64,
    pub radius: f64,
    /// 角速度（rad/s）
    pub speed: f64,
    pub size: f64,
    pub color: Color,
}

impl Orb {
    pub fn new(center: Vec2, angle: f64, radius: f64, speed: f64, size: f64, color: Color) -> Self {
        Self {
            center,
            angle,
            radius,
            speed,
            size,
            color,
        }
    }

    /// 随机轨道：半径 70..200，角速度 0.3..0.8，大小 1.5..3.5
    pub fn random(rng: &mut FxRng, center: Vec2, palette: &[Color]) -> Self {
        let angle = rng.angle();
        let radius = rng.spread(70.0, 130.0);
        let speed = rng.spread(0.3, 0.5);
        let size = rng.spread(1.5, 2.0);
        let color = rng.pick(palette).copied().unwrap_or_default();
        Self::new(center, angle, radius, speed, size, color)
    }

    /// 当前位置（竖直方向压扁成椭圆）
    pub fn position(&self) -> Vec2 {
        Vec2::new(
            self.center.x + self.angle.cos() * self.radius,
            self.center.y + self.angle.sin() * self.radius * defaults::ORB_SQUASH,
        )
    }

    pub fn alpha(&self) -> f64 {
        0.35 + (self.angle * 2.0).sin() * 0.2
    }
}

impl Simulate for Orb {
    fn update(&mut self, dt: f64) {
        self.angle += self.speed * dt;
    }

    fn is_dead(&self) -> bool {
        false
    }

    fn is_degenerate(&self) -> bool {
        !(self.center.is_finite() && self.angle.is_finite() && self.radius.is_finite())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        surface.save();
        surface.set_global_alpha(self.alpha());
        surface.set_glow(self.color, GLOW_BLUR);
        surface.fill_circle(self.position(), self.size, self.color);
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette;

    #[test]
    fn test_random_orbit_ranges() {
        let mut rng = FxRng::seeded(5);
        for _ in 0..50 {
            let orb = Orb::random(&mut rng, Vec2::zero(), &palette::ORBS);
            assert!((70.0..200.0).contains(&orb.radius));
            assert!((0.3..0.8).contains(&orb.speed));
            assert!(palette::ORBS.contains(&orb.color));
        }
    }

    #[test]
    fn test_orbit_never_dies() {
        let mut orb = Orb::new(Vec2::new(100.0, 100.0), 0.0, 100.0, 0.5, 2.0, Color::CYAN);
        assert_eq!(orb.position(), Vec2::new(200.0, 100.0));
        for _ in 0..1000 {
            orb.update(1.0);
        }
        assert!(!orb.is_dead());
        assert_eq!(orb.angle, 500.0);
    }

    #[test]
    fn test_alpha_range() {
        let mut orb = Orb::new(Vec2::zero(), 0.0, 100.0, 1.0, 2.0, Color::CYAN);
        for _ in 0..100 {
            orb.update(0.1);
            assert!((0.15 - 1e-9..=0.55 + 1e-9).contains(&orb.alpha()));
        }
    }
}
