//! # Firework 模块
//!
//! 烟花：一组共享生命周期的火花，最后一个子粒子消失时整体消失。

use crate::surface::DrawSurface;

use super::particle::Simulate;
use super::spark::Spark;

#[derive(Debug, Clone, Default)]
pub struct Firework {
    parts: Vec<Spark>,
}

impl Firework {
    pub fn new(parts: Vec<Spark>) -> Self {
        Self { parts }
    }

    /// 存活的子粒子
    pub fn parts(&self) -> &[Spark] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Simulate for Firework {
    fn update(&mut self, dt: f64) {
        for part in &mut self.parts {
            part.update(dt);
        }
        self.parts.retain(|p| !p.is_dead() && !p.is_degenerate());
    }

    fn is_dead(&self) -> bool {
        self.parts.is_empty()
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        for part in &self.parts {
            part.draw(surface);
        }
    }
}
