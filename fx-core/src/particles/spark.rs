//! # Spark 模块
//!
//! 弹道火花：受重力与水平阻力影响的点粒子，带可选形状。

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::Vec2;
use crate::color::Color;
use crate::rng::FxRng;
use crate::surface::{DrawSurface, Stroke};

use super::particle::{Simulate, frame_decay, positive_life};
use super::registry::defaults;

/// 火花形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SparkShape {
    #[default]
    Circle,
    /// 五角星
    Star,
    /// 短线
    Spark,
    /// 菱形
    Diamond,
}

impl SparkShape {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Star => "star",
            Self::Spark => "spark",
            Self::Diamond => "diamond",
        }
    }
}

impl fmt::Display for SparkShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `points` 角星的闭合路径（内半径为外半径的 0.4）
pub fn star_path(center: Vec2, radius: f64, points: usize) -> Vec<Vec2> {
    let n = points.max(2) * 2;
    (0..n)
        .map(|i| {
            let angle = i as f64 * PI / points.max(2) as f64 - PI / 2.0;
            let r = if i % 2 == 0 { radius } else { radius * 0.4 };
            center + Vec2::from_angle(angle, r)
        })
        .collect()
}

/// 火花粒子
#[derive(Debug, Clone)]
pub struct Spark {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub size: f64,
    pub gravity: f64,
    pub shape: SparkShape,
    pub rotation: f64,
    pub rotation_speed: f64,
    life: f64,
    max_life: f64,
}

impl Spark {
    /// 创建火花：默认大小 3、寿命 0.5 秒、重力 400、圆形、不旋转
    pub fn new(pos: Vec2, vel: Vec2, color: Color) -> Self {
        Self {
            pos,
            vel,
            color,
            size: 3.0,
            gravity: defaults::SPARK_GRAVITY,
            shape: SparkShape::Circle,
            rotation: 0.0,
            rotation_speed: 0.0,
            life: 0.5,
            max_life: 0.5,
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// 设置寿命（秒），同时重置剩余寿命
    pub fn with_life(mut self, life: f64) -> Self {
        let life = positive_life(life);
        self.life = life;
        self.max_life = life;
        self
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_shape(mut self, shape: SparkShape) -> Self {
        self.shape = shape;
        self
    }

    /// 随机初始角度 [0, 2π) 与角速度 [-4, 4) rad/s
    pub fn with_random_spin(mut self, rng: &mut FxRng) -> Self {
        self.rotation = rng.angle();
        self.rotation_speed = rng.jitter(8.0);
        self
    }

    /// 剩余寿命（秒）
    pub fn life(&self) -> f64 {
        self.life
    }

    pub fn max_life(&self) -> f64 {
        self.max_life
    }

    /// 当前透明度 `life / max_life`
    pub fn alpha(&self) -> f64 {
        (self.life / self.max_life).max(0.0)
    }
}

impl Simulate for Spark {
    fn update(&mut self, dt: f64) {
        self.pos = self.pos + self.vel * dt;
        self.vel.y += self.gravity * dt;
        self.vel.x *= frame_decay(defaults::SPARK_DRAG, dt);
        self.rotation += self.rotation_speed * dt;
        self.life -= dt;
    }

    fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    fn is_degenerate(&self) -> bool {
        !(self.pos.is_finite() && self.vel.is_finite() && self.life.is_finite())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        let a = self.alpha();
        let s = self.size * (0.3 + 0.7 * a);

        surface.save();
        surface.set_global_alpha(a);
        surface.translate(self.pos);
        surface.rotate(self.rotation);
        surface.set_glow(self.color, s * defaults::SPARK_GLOW);
        match self.shape {
            SparkShape::Star => {
                surface.fill_path(&star_path(Vec2::zero(), s, 5), self.color);
            }
            SparkShape::Spark => {
                let stroke = Stroke::new(self.color, (s * 0.35).max(0.5)).round();
                surface.stroke_path(&[Vec2::new(-s * 1.5, 0.0), Vec2::new(s * 1.5, 0.0)], stroke);
            }
            SparkShape::Diamond => {
                let path = [
                    Vec2::new(0.0, -s),
                    Vec2::new(s * 0.6, 0.0),
                    Vec2::new(0.0, s),
                    Vec2::new(-s * 0.6, 0.0),
                ];
                surface.fill_path(&path, self.color);
            }
            SparkShape::Circle => surface.fill_circle(Vec2::zero(), s, self.color),
        }
        surface.restore();
    }
}
