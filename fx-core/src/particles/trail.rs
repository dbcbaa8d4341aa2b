//! # Trail 模块
//!
//! 跟随指针的短命轨迹点。轨迹列表不走预算表，而是有自己的硬上限。

use std::collections::VecDeque;

use crate::animation::Vec2;
use crate::color::Color;
use crate::surface::DrawSurface;

use super::registry::defaults;

const GLOW_BLUR: f64 = 5.0;
const MAX_ALPHA: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub color: Color,
    pub size: f64,
    life: f64,
    max_life: f64,
}

impl TrailPoint {
    pub fn new(pos: Vec2, color: Color) -> Self {
        Self {
            pos,
            color,
            size: defaults::TRAIL_SIZE,
            life: defaults::TRAIL_LIFE,
            max_life: defaults::TRAIL_LIFE,
        }
    }

    pub fn life(&self) -> f64 {
        self.life
    }

    fn fraction(&self) -> f64 {
        (self.life / self.max_life).max(0.0)
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        let f = self.fraction();
        surface.save();
        surface.set_global_alpha(f * MAX_ALPHA);
        surface.set_glow(self.color, GLOW_BLUR);
        surface.fill_circle(self.pos, self.size * f, self.color);
        surface.restore();
    }
}

/// 轨迹列表
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(defaults::TRAIL_CAPACITY)),
            capacity,
        }
    }

    /// 追加一个点；超过上限时丢弃最旧的点
    pub fn push(&mut self, point: TrailPoint) {
        if !point.pos.is_finite() {
            return;
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// 推进寿命并移除到期的点
    pub fn step(&mut self, dt: f64) {
        for point in &mut self.points {
            point.life -= dt;
        }
        self.points.retain(|p| p.life > 0.0);
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        for point in &self.points {
            point.draw(surface);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new(defaults::TRAIL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_cap_drops_oldest() {
        let mut trail = Trail::default();
        for i in 0..200 {
            trail.push(TrailPoint::new(Vec2::new(i as f64, 0.0), Color::WHITE));
        }
        assert_eq!(trail.len(), 150);
        assert_eq!(trail.iter().next().map(|p| p.pos.x), Some(50.0));
    }

    #[test]
    fn test_points_expire() {
        let mut trail = Trail::new(10);
        trail.push(TrailPoint::new(Vec2::zero(), Color::WHITE));
        trail.step(0.0);
        assert_eq!(trail.len(), 1);
        trail.step(0.1);
        assert_eq!(trail.len(), 1);
        trail.step(0.2);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_non_finite_point_ignored() {
        let mut trail = Trail::new(10);
        trail.push(TrailPoint::new(Vec2::new(f64::NAN, 0.0), Color::WHITE));
        assert!(trail.is_empty());
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut trail = Trail::new(usize::MAX);
        trail.push(TrailPoint::new(Vec2::zero(), Color::WHITE));
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.capacity(), usize::MAX);
    }
}
