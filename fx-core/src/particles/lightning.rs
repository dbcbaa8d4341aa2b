//! # Lightning 模块
//!
//! 递归中点位移生成的分叉闪电。
//!
//! 形状在创建时一次生成，之后不可变；只有透明度随寿命衰减。
//! 主干折线始终以两个端点为首尾顶点，分支单独保存。

use serde::{Deserialize, Serialize};

use crate::animation::Vec2;
use crate::color::Color;
use crate::rng::FxRng;
use crate::surface::{DrawSurface, Stroke};

use super::particle::{Simulate, positive_life};
use super::registry::defaults;

/// 闪电外层发光半径
const GLOW_BLUR: f64 = 15.0;
/// 白色内芯的透明度系数
const CORE_ALPHA: f64 = 0.6;

/// 生成参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningParams {
    /// 递归深度
    pub depth: u32,
    /// 中点抖动总宽度
    pub jitter: f64,
    /// 深度 ≥ 2 时每个中点产生分支的概率
    pub branch_chance: f64,
    /// 分支终点偏移总宽度
    pub branch_spread: f64,
}

impl Default for LightningParams {
    fn default() -> Self {
        Self {
            depth: defaults::LIGHTNING_DEPTH,
            jitter: defaults::LIGHTNING_JITTER,
            branch_chance: defaults::LIGHTNING_BRANCH_CHANCE,
            branch_spread: defaults::LIGHTNING_BRANCH_SPREAD,
        }
    }
}

impl LightningParams {
    /// 实际使用的递归深度，不超过 [`defaults::LIGHTNING_MAX_DEPTH`]
    pub fn effective_depth(&self) -> u32 {
        self.depth.min(defaults::LIGHTNING_MAX_DEPTH)
    }

    /// 主干线段数（`2^depth`），也是总线段数的下界
    pub fn min_segments(&self) -> usize {
        1usize << self.effective_depth()
    }

    /// 每个可分支的中点都分支时的总线段数
    ///
    /// `S(0) = 1`，`S(1) = 2`，`S(d) = 2·S(d-1) + S(d-2)`。
    pub fn max_segments(&self) -> usize {
        let (mut prev, mut cur) = (1usize, 1usize);
        for d in 1..=self.effective_depth() {
            let next = if d == 1 { 2 } else { 2 * cur + prev };
            prev = cur;
            cur = next;
        }
        cur
    }
}

/// 闪电
#[derive(Debug, Clone)]
pub struct Lightning {
    trunk: Vec<Vec2>,
    branches: Vec<Vec<Vec2>>,
    pub color: Color,
    life: f64,
    max_life: f64,
}

impl Lightning {
    /// 生成一道从 `from` 到 `to` 的闪电
    pub fn generate(
        rng: &mut FxRng,
        from: Vec2,
        to: Vec2,
        params: &LightningParams,
        color: Color,
        life: f64,
    ) -> Self {
        let mut trunk = vec![from];
        let mut branches = Vec::new();
        subdivide(rng, params, from, to, params.effective_depth(), &mut trunk, &mut branches);

        let life = positive_life(life);
        Self {
            trunk,
            branches,
            color,
            life,
            max_life: life,
        }
    }

    /// 主干折线（首尾为两个端点）
    pub fn trunk(&self) -> &[Vec2] {
        &self.trunk
    }

    /// 分支折线
    pub fn branches(&self) -> &[Vec<Vec2>] {
        &self.branches
    }

    /// 主干与分支的总线段数
    pub fn segment_count(&self) -> usize {
        std::iter::once(&self.trunk)
            .chain(self.branches.iter())
            .map(|path| path.len().saturating_sub(1))
            .sum()
    }

    pub fn life(&self) -> f64 {
        self.life
    }

    pub fn alpha(&self) -> f64 {
        (self.life / self.max_life).max(0.0)
    }

    fn paths(&self) -> impl Iterator<Item = &Vec<Vec2>> {
        std::iter::once(&self.trunk).chain(self.branches.iter())
    }
}

/// 把 `a → b` 细分 `depth` 次，顶点追加在 `path` 末尾（`a` 已在其中）
fn subdivide(
    rng: &mut FxRng,
    params: &LightningParams,
    a: Vec2,
    b: Vec2,
    depth: u32,
    path: &mut Vec<Vec2>,
    branches: &mut Vec<Vec<Vec2>>,
) {
    if depth == 0 {
        path.push(b);
        return;
    }

    let mid = a.midpoint(b) + Vec2::new(rng.jitter(params.jitter), rng.jitter(params.jitter));
    subdivide(rng, params, a, mid, depth - 1, path, branches);
    subdivide(rng, params, mid, b, depth - 1, path, branches);

    if depth >= 2 && rng.chance(params.branch_chance) {
        let end = mid
            + Vec2::new(
                rng.jitter(params.branch_spread),
                rng.jitter(params.branch_spread),
            );
        let mut branch = vec![mid];
        subdivide(rng, params, mid, end, depth - 2, &mut branch, branches);
        branches.push(branch);
    }
}

impl Simulate for Lightning {
    fn update(&mut self, dt: f64) {
        self.life -= dt;
    }

    fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    fn is_degenerate(&self) -> bool {
        !self.life.is_finite() || self.paths().flatten().any(|p| !p.is_finite())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        let a = self.alpha();
        surface.save();
        surface.set_global_alpha(a);
        surface.set_glow(self.color, GLOW_BLUR);
        let glow = Stroke::new(self.color, 2.0 + 2.0 * a).round();
        for path in self.paths() {
            surface.stroke_path(path, glow);
        }

        surface.set_global_alpha(a * CORE_ALPHA);
        let core = Stroke::new(Color::WHITE, 1.0).round();
        for path in self.paths() {
            surface.stroke_path(path, core);
        }
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_segment_bounds() {
        let params = LightningParams::default();
        assert_eq!(params.min_segments(), 16);
        assert_eq!(params.max_segments(), 29);

        let shallow = LightningParams {
            depth: 2,
            ..Default::default()
        };
        assert_eq!(shallow.min_segments(), 4);
        assert_eq!(shallow.max_segments(), 5);

        let flat = LightningParams {
            depth: 0,
            ..Default::default()
        };
        assert_eq!(flat.max_segments(), 1);
    }

    #[test]
    fn test_depth_is_capped() {
        let params = LightningParams {
            depth: 1000,
            branch_chance: 0.0,
            ..Default::default()
        };
        assert_eq!(params.effective_depth(), defaults::LIGHTNING_MAX_DEPTH);
        assert_eq!(params.min_segments(), 256);

        let mut rng = FxRng::seeded(5);
        let bolt = Lightning::generate(&mut rng, Vec2::zero(), Vec2::new(0.0, 400.0), &params, Color::AMBER, 0.3);
        assert_eq!(bolt.segment_count(), 256);
        assert_eq!(bolt.trunk().last(), Some(&Vec2::new(0.0, 400.0)));
    }

    #[test]
    fn test_trunk_connects_endpoints() {
        let mut rng = FxRng::seeded(7);
        let from = Vec2::new(10.0, 20.0);
        let to = Vec2::new(300.0, -40.0);
        let bolt = Lightning::generate(&mut rng, from, to, &LightningParams::default(), Color::AMBER, 0.3);

        assert_eq!(bolt.trunk().first(), Some(&from));
        assert_eq!(bolt.trunk().last(), Some(&to));
        assert_eq!(bolt.trunk().len(), 17);
    }

    #[test]
    fn test_branches_always_branch() {
        let params = LightningParams {
            branch_chance: 1.0,
            ..Default::default()
        };
        let mut rng = FxRng::seeded(1);
        let bolt = Lightning::generate(&mut rng, Vec2::zero(), Vec2::new(100.0, 0.0), &params, Color::AMBER, 0.3);
        assert_eq!(bolt.segment_count(), params.max_segments());
        // 每个分支都从主干或上级分支的某个顶点出发
        for branch in bolt.branches() {
            assert!(branch.len() >= 2);
        }
    }

    #[test]
    fn test_never_branch() {
        let params = LightningParams {
            branch_chance: 0.0,
            ..Default::default()
        };
        let mut rng = FxRng::seeded(1);
        let bolt = Lightning::generate(&mut rng, Vec2::zero(), Vec2::new(100.0, 0.0), &params, Color::AMBER, 0.3);
        assert!(bolt.branches().is_empty());
        assert_eq!(bolt.segment_count(), 16);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let params = LightningParams::default();
        let a = Lightning::generate(&mut FxRng::seeded(42), Vec2::zero(), Vec2::new(0.0, 200.0), &params, Color::AMBER, 0.3);
        let b = Lightning::generate(&mut FxRng::seeded(42), Vec2::zero(), Vec2::new(0.0, 200.0), &params, Color::AMBER, 0.3);
        assert_eq!(a.trunk(), b.trunk());
        assert_eq!(a.branches(), b.branches());
    }

    #[test]
    fn test_fades_and_dies() {
        let mut rng = FxRng::seeded(3);
        let mut bolt = Lightning::generate(&mut rng, Vec2::zero(), Vec2::new(50.0, 50.0), &LightningParams::default(), Color::VIOLET, 0.5);
        bolt.update(0.25);
        assert!((bolt.alpha() - 0.5).abs() < 1e-12);

        let mut surface = RecordingSurface::new();
        bolt.draw(&mut surface);
        let paths = 1 + bolt.branches().len();
        assert_eq!(surface.primitive_count(), paths * 2);

        bolt.update(0.25);
        assert!(bolt.is_dead());
    }
}
