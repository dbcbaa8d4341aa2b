//! # Particle Engine
//!
//! 按分类管理粒子池，每帧推进并绘制。
//!
//! 所有 `emit_*` 都只是往对应池追加成员，池满时按 FIFO 淘汰最旧的成员。
//! `step` 只推进状态，`draw` 只读取状态，`render` 是两者加上清屏。

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::animation::Vec2;
use crate::color::{Color, palette};
use crate::rng::FxRng;
use crate::surface::DrawSurface;

use super::lightning::{Lightning, LightningParams};
use super::orb::Orb;
use super::particle::{Particle, Simulate};
use super::pool::Pool;
use super::presets::{self, SparkOptions};
use super::registry::{Budget, DeviceClass, PoolKind, defaults};
use super::shockwave::{Shockwave, ShockwaveTier};
use super::text::TextPopup;
use super::trail::{Trail, TrailPoint};

/// 引擎当前状态的快照
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleStats {
    /// 每个分类的成员数
    pub counts: BTreeMap<PoolKind, usize>,
    /// 当前生效的预算
    pub budget: Budget,
    pub device: DeviceClass,
    /// 轨迹点数量
    pub trail: usize,
}

impl ParticleStats {
    /// 所有池的成员总数（不含轨迹）
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// 粒子引擎
#[derive(Debug)]
pub struct ParticleEngine {
    pools: [Pool<Particle>; 7],
    trail: Trail,
    budget: Budget,
    device: DeviceClass,
    lightning: LightningParams,
    rng: FxRng,
}

impl ParticleEngine {
    /// 使用设备档位的默认预算，随机源取系统熵
    pub fn new(device: DeviceClass) -> Self {
        Self::with_budget(device, Budget::for_device(device), FxRng::from_entropy())
    }

    /// 指定预算与随机源
    pub fn with_budget(device: DeviceClass, budget: Budget, rng: FxRng) -> Self {
        Self {
            pools: PoolKind::ALL.map(|kind| Pool::new(budget.get(kind))),
            trail: Trail::default(),
            budget,
            device,
            lightning: LightningParams::default(),
            rng,
        }
    }

    /// 固定种子（测试与无窗口运行）
    pub fn seeded(device: DeviceClass, seed: u64) -> Self {
        Self::with_budget(device, Budget::for_device(device), FxRng::seeded(seed))
    }

    /// 设置闪电生成参数
    pub fn with_lightning(mut self, params: LightningParams) -> Self {
        self.lightning = params;
        self
    }

    /// 设置轨迹上限（清空已有轨迹）
    pub fn with_trail_capacity(mut self, capacity: usize) -> Self {
        self.trail = Trail::new(capacity);
        self
    }

    // ---------- 发射 ----------

    fn add(&mut self, kind: PoolKind, particle: impl Into<Particle>) {
        let pool = &mut self.pools[kind.index()];
        if let Some(evicted) = pool.push(particle.into()) {
            trace!(kind = %kind, evicted = evicted.kind_name(), "池已满，淘汰最旧成员");
        }
    }

    fn add_all<P: Into<Particle>>(&mut self, kind: PoolKind, particles: Vec<P>) {
        for particle in particles {
            self.add(kind, particle);
        }
    }

    /// 某个分类一次发射最多能留下的成员数
    fn keep(&self, kind: PoolKind) -> usize {
        self.pools[kind.index()].capacity()
    }

    /// 放射状火花
    pub fn emit_sparks(&mut self, origin: Vec2, count: usize, colors: &[Color], options: &SparkOptions) {
        let keep = self.keep(PoolKind::Sparks);
        let sparks = presets::sparks(&mut self.rng, origin, count, colors, options, keep);
        self.add_all(PoolKind::Sparks, sparks);
    }

    /// 按档位发射 1 - 3 个错开的冲击环
    pub fn emit_shockwave(&mut self, origin: Vec2, tier: ShockwaveTier) {
        for recipe in tier.rings() {
            self.add(PoolKind::Shockwaves, Shockwave::from_recipe(origin, recipe));
        }
    }

    /// 按档位名称发射（未知名称按普通档）
    pub fn emit_shockwave_named(&mut self, origin: Vec2, tier: &str) {
        self.emit_shockwave(origin, ShockwaveTier::resolve(tier));
    }

    /// 闪电；`color`/`life` 缺省为琥珀色与 0.3 秒
    pub fn emit_lightning(&mut self, from: Vec2, to: Vec2, color: Option<Color>, life: Option<f64>) {
        let bolt = Lightning::generate(
            &mut self.rng,
            from,
            to,
            &self.lightning,
            color.unwrap_or(Color::AMBER),
            life.unwrap_or(defaults::LIGHTNING_LIFE),
        );
        self.add(PoolKind::Lightnings, bolt);
    }

    /// 放射状速度线
    pub fn emit_speed_lines(&mut self, center: Vec2, count: usize, colors: &[Color]) {
        let keep = self.keep(PoolKind::SpeedLines);
        let lines = presets::speed_lines(&mut self.rng, center, count, colors, keep);
        self.add_all(PoolKind::SpeedLines, lines);
    }

    /// 飘字；`duration` 缺省为 1 秒
    pub fn emit_text(
        &mut self,
        position: Vec2,
        text: &str,
        size: f64,
        color: Color,
        duration: Option<f64>,
        is_crit: bool,
    ) {
        let popup = TextPopup::new(
            &mut self.rng,
            position,
            text,
            size,
            color,
            duration.unwrap_or(defaults::TEXT_DURATION),
            is_crit,
        );
        self.add(PoolKind::Texts, popup);
    }

    /// 余烬
    pub fn emit_ember(&mut self, origin: Vec2, color: Color) {
        let ember = presets::ember(&mut self.rng, origin, color);
        self.add(PoolKind::Embers, ember);
    }

    /// 烟花（计入火花池）
    pub fn emit_firework(&mut self, origin: Vec2, colors: &[Color]) {
        let firework = presets::firework(&mut self.rng, origin, colors);
        self.add(PoolKind::Sparks, firework);
    }

    /// 彩纸
    pub fn emit_confetti(&mut self, origin: Vec2, count: usize, colors: &[Color]) {
        let keep = self.keep(PoolKind::Sparks);
        let sparks = presets::confetti(&mut self.rng, origin, count, colors, keep);
        self.add_all(PoolKind::Sparks, sparks);
    }

    /// 金色爆发
    pub fn emit_golden_burst(&mut self, origin: Vec2, intensity: f64) {
        let keep = self.keep(PoolKind::Sparks);
        let sparks = presets::golden_burst(&mut self.rng, origin, intensity, keep);
        self.add_all(PoolKind::Sparks, sparks);
    }

    /// 地面碎屑
    pub fn emit_ground_impact(&mut self, origin: Vec2, count: usize) {
        let keep = self.keep(PoolKind::Sparks);
        let sparks = presets::ground_impact(&mut self.rng, origin, count, keep);
        self.add_all(PoolKind::Sparks, sparks);
    }

    /// 光环
    pub fn emit_aura_ring(&mut self, origin: Vec2, radius: f64, colors: &[Color], count: usize) {
        let keep = self.keep(PoolKind::Sparks);
        let sparks = presets::aura_ring(&mut self.rng, origin, radius, colors, count, keep);
        self.add_all(PoolKind::Sparks, sparks);
    }

    /// 让环绕光球跟随新的中心，并补足到 `min(target_count, 预算)` 个
    pub fn update_orbs(&mut self, center: Vec2, target_count: usize) {
        let pool = &mut self.pools[PoolKind::Orbs.index()];
        for orb in pool.iter_mut().filter_map(Particle::as_orb_mut) {
            orb.center = center;
        }

        let target = target_count.min(pool.capacity());
        while pool.len() < target {
            let orb = Orb::random(&mut self.rng, center, &palette::ORBS);
            pool.push(orb.into());
        }
    }

    /// 追加指针轨迹点
    pub fn add_trail_point(&mut self, position: Vec2, color: Color) {
        self.trail.push(TrailPoint::new(position, color));
    }

    // ---------- 帧推进 ----------

    /// 推进 `dt` 秒；非有限或负的 `dt` 按 0 处理
    pub fn step(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for kind in PoolKind::ALL {
            self.pools[kind.index()].retain_mut(|p| {
                p.update(dt);
                if p.is_degenerate() {
                    debug!(kind = %kind, particle = p.kind_name(), "粒子状态退化，移除");
                    return false;
                }
                !p.is_dead()
            });
        }
        self.trail.step(dt);

        trace!(total = self.total(), trail = self.trail.len(), "粒子帧推进完成");
    }

    /// 按分类顺序绘制全部成员，最后绘制轨迹
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        for pool in &self.pools {
            for particle in pool.iter() {
                particle.draw(surface);
            }
        }
        self.trail.draw(surface);
    }

    /// 清屏、推进、绘制
    pub fn render(&mut self, dt: f64, surface: &mut dyn DrawSurface) {
        surface.clear();
        self.step(dt);
        self.draw(surface);
    }

    // ---------- 管理与查询 ----------

    /// 清空一个分类
    pub fn clear(&mut self, kind: PoolKind) {
        self.pools[kind.index()].clear();
    }

    /// 清空全部分类与轨迹
    pub fn clear_all(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
        self.trail.clear();
    }

    /// 调整某个分类的预算；缩小时立即淘汰最旧的成员
    pub fn set_budget(&mut self, kind: PoolKind, capacity: usize) {
        self.budget.set(kind, capacity);
        let dropped = self.pools[kind.index()].set_capacity(capacity);
        if dropped > 0 {
            debug!(kind = %kind, dropped, "预算缩小，淘汰成员");
        }
    }

    pub fn pool(&self, kind: PoolKind) -> &Pool<Particle> {
        &self.pools[kind.index()]
    }

    pub fn len(&self, kind: PoolKind) -> usize {
        self.pools[kind.index()].len()
    }

    /// 所有池的成员总数（不含轨迹）
    pub fn total(&self) -> usize {
        self.pools.iter().map(Pool::len).sum()
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn lightning_params(&self) -> &LightningParams {
        &self.lightning
    }

    pub fn stats(&self) -> ParticleStats {
        ParticleStats {
            counts: PoolKind::ALL.into_iter().map(|k| (k, self.len(k))).collect(),
            budget: self.budget,
            device: self.device,
            trail: self.trail.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    fn engine() -> ParticleEngine {
        ParticleEngine::seeded(DeviceClass::Desktop, 1)
    }

    #[test]
    fn test_emits_land_in_their_pools() {
        let mut fx = engine();
        fx.emit_sparks(Vec2::zero(), 10, &[Color::AMBER], &SparkOptions::default());
        fx.emit_shockwave(Vec2::zero(), ShockwaveTier::Ultra);
        fx.emit_lightning(Vec2::zero(), Vec2::new(100.0, 0.0), None, None);
        fx.emit_speed_lines(Vec2::zero(), 6, &[Color::WHITE]);
        fx.emit_text(Vec2::zero(), "+1", 20.0, Color::WHITE, None, false);
        fx.emit_ember(Vec2::zero(), Color::AMBER);
        fx.update_orbs(Vec2::zero(), 4);

        assert_eq!(fx.len(PoolKind::Sparks), 10);
        assert_eq!(fx.len(PoolKind::Shockwaves), 3);
        assert_eq!(fx.len(PoolKind::Lightnings), 1);
        assert_eq!(fx.len(PoolKind::SpeedLines), 6);
        assert_eq!(fx.len(PoolKind::Texts), 1);
        assert_eq!(fx.len(PoolKind::Embers), 1);
        assert_eq!(fx.len(PoolKind::Orbs), 4);
        assert_eq!(fx.total(), 26);
    }

    #[test]
    fn test_firework_is_one_member() {
        let mut fx = engine();
        fx.emit_firework(Vec2::zero(), &palette::ORBS);
        assert_eq!(fx.len(PoolKind::Sparks), 1);
    }

    #[test]
    fn test_orbs_capped_by_budget_and_follow_center() {
        let mut fx = engine();
        fx.update_orbs(Vec2::zero(), 100);
        assert_eq!(fx.len(PoolKind::Orbs), 12);

        let center = Vec2::new(50.0, 80.0);
        fx.update_orbs(center, 3);
        assert_eq!(fx.len(PoolKind::Orbs), 12);
        assert!(
            fx.pool(PoolKind::Orbs)
                .iter()
                .filter_map(Particle::as_orb)
                .all(|o| o.center == center)
        );
    }

    #[test]
    fn test_orbs_survive_long_runs() {
        let mut fx = engine();
        fx.update_orbs(Vec2::zero(), 5);
        for _ in 0..600 {
            fx.step(0.1);
        }
        assert_eq!(fx.len(PoolKind::Orbs), 5);
    }

    #[test]
    fn test_invalid_dt_is_zero() {
        let mut fx = engine();
        fx.emit_sparks(Vec2::zero(), 5, &[Color::AMBER], &SparkOptions::default());
        fx.step(f64::NAN);
        fx.step(-1.0);
        fx.step(f64::INFINITY);
        assert_eq!(fx.len(PoolKind::Sparks), 5);
        let lives: Vec<_> = fx
            .pool(PoolKind::Sparks)
            .iter()
            .filter_map(Particle::as_spark)
            .map(|s| (s.life(), s.max_life()))
            .collect();
        assert!(lives.iter().all(|(life, max)| life == max));
    }

    #[test]
    fn test_render_clears_and_draws() {
        let mut fx = engine();
        let mut surface = RecordingSurface::new();
        fx.emit_shockwave(Vec2::zero(), ShockwaveTier::Normal);
        fx.add_trail_point(Vec2::new(3.0, 4.0), Color::CYAN);

        fx.render(0.016, &mut surface);
        assert_eq!(surface.frames(), 1);
        assert_eq!(surface.primitive_count(), 2);
        assert_eq!(surface.depth(), 0);

        fx.render(0.016, &mut surface);
        assert_eq!(surface.frames(), 2);
        assert_eq!(surface.primitive_count(), 2);
    }

    #[test]
    fn test_delayed_rings_not_drawn_yet() {
        let mut fx = engine();
        let mut surface = RecordingSurface::new();
        fx.emit_shockwave(Vec2::zero(), ShockwaveTier::Super);
        fx.render(0.05, &mut surface);
        assert_eq!(surface.ring_radii().len(), 1);
        fx.render(0.1, &mut surface);
        assert_eq!(surface.ring_radii().len(), 2);
    }

    #[test]
    fn test_clear_and_set_budget() {
        let mut fx = engine();
        fx.emit_sparks(Vec2::zero(), 50, &[Color::AMBER], &SparkOptions::default());
        fx.emit_ember(Vec2::zero(), Color::AMBER);

        fx.set_budget(PoolKind::Sparks, 20);
        assert_eq!(fx.len(PoolKind::Sparks), 20);
        assert_eq!(fx.budget().sparks, 20);

        fx.clear(PoolKind::Sparks);
        assert_eq!(fx.len(PoolKind::Sparks), 0);
        assert_eq!(fx.len(PoolKind::Embers), 1);

        fx.add_trail_point(Vec2::zero(), Color::WHITE);
        fx.clear_all();
        assert_eq!(fx.total(), 0);
        assert!(fx.trail().is_empty());
    }

    #[test]
    fn test_stats_serialization() {
        let mut fx = ParticleEngine::seeded(DeviceClass::Mobile, 3);
        fx.emit_ember(Vec2::zero(), Color::AMBER);
        let stats = fx.stats();
        assert_eq!(stats.total(), 1);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["device"], "mobile");
        assert_eq!(json["counts"]["embers"], 1);
        assert_eq!(json["counts"]["speedLines"], 0);
        assert_eq!(json["budget"]["sparks"], 120);
        assert_eq!(json["trail"], 0);
    }

    #[test]
    fn test_zero_budget_drops_everything() {
        let mut budget = Budget::desktop();
        budget.set(PoolKind::Texts, 0);
        let mut fx = ParticleEngine::with_budget(DeviceClass::Desktop, budget, FxRng::seeded(0));
        fx.emit_text(Vec2::zero(), "miss", 12.0, Color::WHITE, None, false);
        assert_eq!(fx.len(PoolKind::Texts), 0);
    }

    #[test]
    fn test_oversized_emit_keeps_newest_in_order() {
        let mut fx = engine();
        fx.emit_ember(Vec2::zero(), Color::AMBER);
        fx.emit_sparks(Vec2::zero(), 50_000_000, &[Color::CYAN], &SparkOptions::default());
        fx.emit_golden_burst(Vec2::zero(), 1e30);
        fx.emit_speed_lines(Vec2::zero(), 10_000_000, &[Color::WHITE]);

        let sparks = fx.pool(PoolKind::Sparks);
        assert_eq!(sparks.len(), 300);
        let seq = sparks.sequence();
        assert!(seq.windows(2).all(|w| w[0] < w[1]));
        assert!(sparks.iter().filter_map(Particle::as_spark).all(|s| s.color != Color::CYAN));
        assert_eq!(fx.len(PoolKind::SpeedLines), 30);
        assert_eq!(fx.len(PoolKind::Embers), 1);
    }
}
