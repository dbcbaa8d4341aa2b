//! # Text 模块
//!
//! 飘字：减速上升、开场回弹缩放、末段淡出。

use crate::animation::{EasingFunction, Vec2};
use crate::color::Color;
use crate::rng::FxRng;
use crate::surface::DrawSurface;

use super::particle::{Simulate, frame_decay, positive_life};
use super::registry::defaults;

const SHADOW_OFFSET: Vec2 = Vec2::new(2.0, 2.0);
const GLOW_BLUR: f64 = 14.0;

/// 飘字
#[derive(Debug, Clone)]
pub struct TextPopup {
    pub text: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f64,
    pub color: Color,
    scale: f64,
    target_scale: f64,
    remaining: f64,
    duration: f64,
}

impl TextPopup {
    /// 创建飘字
    ///
    /// 暴击飘字上升更快，并从更小的尺寸弹到更大的尺寸。
    pub fn new(
        rng: &mut FxRng,
        pos: Vec2,
        text: impl Into<String>,
        size: f64,
        color: Color,
        duration: f64,
        is_crit: bool,
    ) -> Self {
        let duration = positive_life(duration);
        let (vy, scale, target_scale) = if is_crit {
            (-200.0, 0.3, 1.5)
        } else {
            (-130.0, 0.7, 1.0)
        };
        Self {
            text: text.into(),
            pos,
            vel: Vec2::new(rng.jitter(50.0), vy),
            size,
            color,
            scale,
            target_scale,
            remaining: duration,
            duration,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn target_scale(&self) -> f64 {
        self.target_scale
    }

    /// 剩余时间（秒）
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// 已播放比例
    pub fn progress(&self) -> f64 {
        1.0 - self.remaining / self.duration
    }

    pub fn alpha(&self) -> f64 {
        (self.remaining / self.duration * 2.5).clamp(0.0, 1.0)
    }
}

impl Simulate for TextPopup {
    fn update(&mut self, dt: f64) {
        self.pos = self.pos + self.vel * dt;
        self.vel.y *= frame_decay(defaults::TEXT_RISE_DECAY, dt);
        self.remaining -= dt;

        let t = self.progress();
        if t < defaults::TEXT_POP_PHASE {
            self.scale = self.target_scale * EasingFunction::OutBack.apply(t / defaults::TEXT_POP_PHASE);
        } else if dt > 0.0 {
            self.scale = self.target_scale;
        }
    }

    fn is_dead(&self) -> bool {
        self.remaining <= 0.0
    }

    fn is_degenerate(&self) -> bool {
        !(self.pos.is_finite() && self.vel.is_finite() && self.remaining.is_finite())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        surface.save();
        surface.set_global_alpha(self.alpha());
        surface.translate(self.pos);
        surface.scale(self.scale, self.scale);
        surface.fill_text(&self.text, SHADOW_OFFSET, self.size, Color::SHADOW);
        surface.set_glow(self.color, GLOW_BLUR);
        surface.fill_text(&self.text, Vec2::zero(), self.size, self.color);
        surface.restore();
    }
}
