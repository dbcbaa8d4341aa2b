//! # Presets 模块
//!
//! 由火花原语组合出的命名配方。配方只决定初始参数（角度分布、速度、
//! 重力方向、形状、调色板），物理行为全部来自 [`Spark`]。
//!
//! 批量配方都带 `keep` 参数：一次发射 `count` 个而池只能留下 `keep` 个时，
//! 只生成最后 `keep` 个，内存占用与预算成正比而不是与 `count` 成正比。

use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::animation::Vec2;
use crate::color::{Color, palette};
use crate::rng::FxRng;

use super::firework::Firework;
use super::spark::{Spark, SparkShape};
use super::speed_line::SpeedLine;

/// 地面碎屑默认数量
pub const GROUND_IMPACT_COUNT: usize = 8;
/// 光环默认粒子数
pub const AURA_RING_COUNT: usize = 24;
/// 金色爆发默认强度
pub const GOLDEN_BURST_INTENSITY: f64 = 1.0;

/// `emit_sparks` 的可选参数
///
/// 各字段的实际取值为 `x + [0, x_var)`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SparkOptions {
    pub speed: f64,
    pub speed_var: f64,
    pub size: f64,
    pub size_var: f64,
    pub life: f64,
    pub life_var: f64,
    pub gravity: f64,
    /// 强制形状；缺省时随机（35% 星形，其余一半短线一半圆形）
    pub shape: Option<SparkShape>,
}

impl Default for SparkOptions {
    fn default() -> Self {
        Self {
            speed: 140.0,
            speed_var: 90.0,
            size: 3.0,
            size_var: 3.0,
            life: 0.5,
            life_var: 0.35,
            gravity: 400.0,
            shape: None,
        }
    }
}

/// 发射 `count` 个、最多留下 `keep` 个时真正留下的下标
///
/// 更早的下标在同一次发射里就会被挤出。
pub fn surviving(count: usize, keep: usize) -> Range<usize> {
    count.saturating_sub(keep)..count
}

fn pick_color(rng: &mut FxRng, colors: &[Color]) -> Color {
    rng.pick(colors).copied().unwrap_or_default()
}

fn spark(rng: &mut FxRng, pos: Vec2, vel: Vec2, color: Color) -> Spark {
    Spark::new(pos, vel, color).with_random_spin(rng)
}

/// 放射状火花
pub fn sparks(
    rng: &mut FxRng,
    origin: Vec2,
    count: usize,
    colors: &[Color],
    options: &SparkOptions,
    keep: usize,
) -> Vec<Spark> {
    let step = TAU / count.max(1) as f64;
    surviving(count, keep)
        .map(|i| {
            let angle = step * i as f64 + rng.jitter(0.6);
            let speed = rng.spread(options.speed, options.speed_var);
            let color = pick_color(rng, colors);
            let shape = options.shape.unwrap_or_else(|| {
                if rng.unit() > 0.65 {
                    SparkShape::Star
                } else if rng.unit() > 0.5 {
                    SparkShape::Spark
                } else {
                    SparkShape::Circle
                }
            });
            let size = rng.spread(options.size, options.size_var);
            let life = rng.spread(options.life, options.life_var);
            spark(rng, origin, Vec2::from_angle(angle, speed), color)
                .with_size(size)
                .with_life(life)
                .with_gravity(options.gravity)
                .with_shape(shape)
        })
        .collect()
}

/// 余烬：缓慢上升（负重力）的小火花
pub fn ember(rng: &mut FxRng, origin: Vec2, color: Color) -> Spark {
    let vel = Vec2::new(rng.jitter(30.0), -rng.spread(90.0, 140.0));
    let size = rng.spread(2.0, 4.0);
    let life = rng.spread(2.0, 3.0);
    let shape = if rng.unit() > 0.5 {
        SparkShape::Circle
    } else {
        SparkShape::Spark
    };
    spark(rng, origin, vel, color)
        .with_size(size)
        .with_life(life)
        .with_gravity(-15.0)
        .with_shape(shape)
}

/// 烟花：35 - 65 个子火花
pub fn firework(rng: &mut FxRng, origin: Vec2, colors: &[Color]) -> Firework {
    let n = rng.spread(35.0, 30.0);
    let count = n.ceil() as usize;
    let step = TAU / n;
    let parts = (0..count)
        .map(|i| {
            let angle = step * i as f64 + rng.jitter(0.3);
            let speed = rng.spread(100.0, 220.0);
            let color = pick_color(rng, colors);
            let shape = if rng.unit() > 0.6 {
                SparkShape::Star
            } else if rng.unit() > 0.5 {
                SparkShape::Diamond
            } else {
                SparkShape::Circle
            };
            let size = rng.spread(2.0, 5.0);
            let life = rng.spread(0.7, 0.9);
            spark(rng, origin, Vec2::from_angle(angle, speed), color)
                .with_size(size)
                .with_life(life)
                .with_gravity(180.0)
                .with_shape(shape)
        })
        .collect();
    Firework::new(parts)
}

/// 彩纸：随机方向，整体向上抛起
pub fn confetti(
    rng: &mut FxRng,
    origin: Vec2,
    count: usize,
    colors: &[Color],
    keep: usize,
) -> Vec<Spark> {
    surviving(count, keep)
        .map(|_| {
            let angle = rng.angle();
            let speed = rng.spread(80.0, 200.0);
            let color = pick_color(rng, colors);
            let pos = origin + Vec2::new(rng.jitter(80.0), rng.jitter(50.0));
            let vel = Vec2::from_angle(angle, speed) - Vec2::new(0.0, 120.0);
            let size = rng.spread(3.0, 5.0);
            let life = rng.spread(1.5, 1.5);
            let shape = if rng.unit() > 0.5 {
                SparkShape::Diamond
            } else {
                SparkShape::Star
            };
            spark(rng, pos, vel, color)
                .with_size(size)
                .with_life(life)
                .with_gravity(130.0)
                .with_shape(shape)
        })
        .collect()
}

/// 金色爆发：`floor(20 · intensity)` 颗金色星星
///
/// 数量按 `usize` 饱和，实际只生成最后 `keep` 颗。
pub fn golden_burst(rng: &mut FxRng, origin: Vec2, intensity: f64, keep: usize) -> Vec<Spark> {
    let intensity = if intensity.is_finite() { intensity.max(0.0) } else { 0.0 };
    let count = (20.0 * intensity).floor() as usize;
    let step = TAU / count.max(1) as f64;
    surviving(count, keep)
        .map(|i| {
            let angle = step * i as f64 + rng.jitter(0.4);
            let speed = 50.0 + rng.unit() * 110.0 * intensity;
            let color = pick_color(rng, &palette::GOLDEN);
            let size = 3.0 + rng.unit() * 4.0 * intensity;
            let life = rng.spread(0.6, 0.5);
            spark(rng, origin, Vec2::from_angle(angle, speed), color)
                .with_size(size)
                .with_life(life)
                .with_gravity(20.0)
                .with_shape(SparkShape::Star)
        })
        .collect()
}

/// 地面碎屑：向上锥形飞溅后快速下落
pub fn ground_impact(rng: &mut FxRng, origin: Vec2, count: usize, keep: usize) -> Vec<Spark> {
    surviving(count, keep)
        .map(|_| {
            let angle = -FRAC_PI_2 + rng.jitter(1.8);
            let speed = rng.spread(40.0, 120.0);
            let color = pick_color(rng, &palette::DEBRIS);
            let pos = origin + Vec2::new(rng.jitter(40.0), 0.0);
            let vel = Vec2::from_angle(angle, speed) - Vec2::new(0.0, 50.0);
            let size = rng.spread(1.5, 2.0);
            let life = rng.spread(0.3, 0.3);
            spark(rng, pos, vel, color)
                .with_size(size)
                .with_life(life)
                .with_gravity(500.0)
                .with_shape(SparkShape::Circle)
        })
        .collect()
}

/// 光环：从半径 20 处向外扩散的菱形粒子
pub fn aura_ring(
    rng: &mut FxRng,
    origin: Vec2,
    radius: f64,
    colors: &[Color],
    count: usize,
    keep: usize,
) -> Vec<Spark> {
    let step = TAU / count.max(1) as f64;
    surviving(count, keep)
        .map(|i| {
            let angle = step * i as f64;
            let pos = origin + Vec2::from_angle(angle, 20.0);
            let color = pick_color(rng, colors);
            let size = rng.spread(2.0, 3.0);
            let life = rng.spread(0.8, 0.4);
            spark(rng, pos, Vec2::from_angle(angle, radius * 0.8), color)
                .with_size(size)
                .with_life(life)
                .with_gravity(-10.0)
                .with_shape(SparkShape::Diamond)
        })
        .collect()
}

/// 放射状速度线
pub fn speed_lines(
    rng: &mut FxRng,
    center: Vec2,
    count: usize,
    colors: &[Color],
    keep: usize,
) -> Vec<SpeedLine> {
    let step = TAU / count.max(1) as f64;
    surviving(count, keep)
        .map(|i| {
            let angle = step * i as f64 + rng.jitter(0.3);
            let color = pick_color(rng, colors);
            let length = rng.spread(60.0, 80.0);
            let life = rng.spread(0.35, 0.2);
            SpeedLine::new(center, angle, length, color, life)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparks_follow_options() {
        let mut rng = FxRng::seeded(9);
        let options = SparkOptions {
            shape: Some(SparkShape::Diamond),
            gravity: 0.0,
            ..Default::default()
        };
        let sparks = sparks(&mut rng, Vec2::zero(), 40, &[Color::RED], &options, usize::MAX);
        assert_eq!(sparks.len(), 40);
        for s in &sparks {
            assert_eq!(s.shape, SparkShape::Diamond);
            assert_eq!(s.color, Color::RED);
            assert_eq!(s.gravity, 0.0);
            let speed = s.vel.x.hypot(s.vel.y);
            assert!((140.0 - 1e-9..230.0 + 1e-9).contains(&speed));
            assert!((3.0..6.0).contains(&s.size));
            assert!((0.5..0.85).contains(&s.life()));
        }
    }

    #[test]
    fn test_sparks_with_empty_palette() {
        let mut rng = FxRng::seeded(9);
        let sparks = sparks(&mut rng, Vec2::zero(), 3, &[], &SparkOptions::default(), usize::MAX);
        assert!(sparks.iter().all(|s| s.color == Color::WHITE));
    }

    #[test]
    fn test_ember_rises() {
        let mut rng = FxRng::seeded(2);
        for _ in 0..20 {
            let e = ember(&mut rng, Vec2::zero(), Color::AMBER);
            assert!(e.vel.y < -89.0);
            assert!(e.gravity < 0.0);
            assert!((2.0..5.0).contains(&e.life()));
        }
    }

    #[test]
    fn test_firework_child_count() {
        let mut rng = FxRng::seeded(4);
        for _ in 0..20 {
            let fw = firework(&mut rng, Vec2::zero(), &palette::ORBS);
            assert!((35..=65).contains(&fw.len()));
        }
    }

    #[test]
    fn test_golden_burst_scales_with_intensity() {
        let mut rng = FxRng::seeded(4);
        assert_eq!(golden_burst(&mut rng, Vec2::zero(), 1.0, usize::MAX).len(), 20);
        assert_eq!(golden_burst(&mut rng, Vec2::zero(), 2.5, usize::MAX).len(), 50);
        assert!(golden_burst(&mut rng, Vec2::zero(), f64::NAN, usize::MAX).is_empty());
        assert!(golden_burst(&mut rng, Vec2::zero(), -1.0, usize::MAX).is_empty());
    }

    #[test]
    fn test_ground_impact_goes_up() {
        let mut rng = FxRng::seeded(8);
        let debris = ground_impact(&mut rng, Vec2::new(0.0, 500.0), GROUND_IMPACT_COUNT, usize::MAX);
        assert_eq!(debris.len(), 8);
        for d in &debris {
            assert!(d.vel.y < 0.0);
            assert_eq!(d.pos.y, 500.0);
        }
    }

    #[test]
    fn test_aura_ring_spawns_on_circle() {
        let mut rng = FxRng::seeded(8);
        let ring = aura_ring(&mut rng, Vec2::zero(), 100.0, &[Color::VIOLET], AURA_RING_COUNT, usize::MAX);
        assert_eq!(ring.len(), 24);
        for p in &ring {
            assert!((p.pos.x.hypot(p.pos.y) - 20.0).abs() < 1e-9);
            assert!((p.vel.x.hypot(p.vel.y) - 80.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_speed_lines() {
        let mut rng = FxRng::seeded(8);
        let lines = speed_lines(&mut rng, Vec2::zero(), 12, &[Color::WHITE], usize::MAX);
        assert_eq!(lines.len(), 12);
        assert!(lines.iter().all(|l| (60.0..140.0).contains(&l.length)));
    }

    #[test]
    fn test_only_surviving_tail_is_generated() {
        assert_eq!(surviving(10, 3), 7..10);
        assert_eq!(surviving(2, 3), 0..2);
        assert_eq!(surviving(5, 0), 5..5);

        let mut rng = FxRng::seeded(6);
        let kept = aura_ring(&mut rng, Vec2::zero(), 100.0, &[Color::VIOLET], 8, 2);
        assert_eq!(kept.len(), 2);
        // 保留的是最后两个角度：6·π/4 与 7·π/4
        let angle = kept[0].pos.y.atan2(kept[0].pos.x);
        assert!((angle - (-TAU / 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_huge_golden_burst_is_bounded() {
        let mut rng = FxRng::seeded(6);
        let burst = golden_burst(&mut rng, Vec2::zero(), 1e30, 300);
        assert_eq!(burst.len(), 300);
        assert!(burst.iter().all(|s| s.shape == SparkShape::Star));
    }
}
