//! # FX Sim
//!
//! 无窗口模拟器：按固定脚本模拟连续点击，驱动补间与粒子引擎若干帧，
//! 绘制到记录型表面，最后以 JSON 输出统计。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p fx-headless
//! cargo run -p fx-headless -- --frames 600 --seed 42 -v
//! cargo run -p fx-headless -- --config fx.json --mobile --dump last-frame.json
//! ```

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{Level, debug, info};

use fx_core::color::palette;
use fx_core::config::{DeviceSetting, EngineConfig};
use fx_core::{
    AnimationEngine, Color, Keyframe, ParticleEngine, ParticleStats, RecordingSurface,
    RecordingTarget, ShockwaveTier, SparkOptions, TweenConfig, TweenEvent, Vec2,
};

#[derive(Parser)]
#[command(name = "fx-sim")]
#[command(about = "无窗口特效模拟器 - 脚本化点击并输出统计")]
#[command(version)]
struct Cli {
    /// 模拟帧数
    #[arg(short, long, default_value = "300")]
    frames: u32,

    /// 帧率
    #[arg(long, default_value = "60")]
    fps: u32,

    /// 每隔多少帧点击一次
    #[arg(long, default_value = "12")]
    click_every: u32,

    /// 随机种子（覆盖配置文件）
    #[arg(short, long)]
    seed: Option<u64>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 强制移动端预算
    #[arg(long)]
    mobile: bool,

    /// 把最后一帧的绘制指令写入 JSON 文件
    #[arg(long)]
    dump: Option<PathBuf>,

    /// 日志详细程度（-v info，-vv debug，-vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// 运行结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    frames: u32,
    clicks: u32,
    tweens_started: u64,
    tweens_completed: u64,
    tweens_interrupted: u64,
    settle_callbacks: u32,
    peak_particles: usize,
    frames_rendered: u64,
    last_frame_commands: usize,
    hammer_transform: Option<String>,
    particles: ParticleStats,
}

/// 锤子挥动关键帧
fn swing_keyframes() -> Vec<Keyframe> {
    vec![
        Keyframe::new().with("scale", 1.0).with("rotate", 0.0),
        Keyframe::new().with("scale", 0.88).with("rotate", -28.0),
        Keyframe::new().with("scale", 1.03).with("rotate", 6.0),
    ]
}

/// 回弹关键帧
fn settle_keyframes() -> Vec<Keyframe> {
    vec![
        Keyframe::new().with("scale", 1.03).with("rotate", 6.0),
        Keyframe::new().with("scale", 1.0).with("rotate", 0.0),
    ]
}

/// 第 n 次点击的冲击档位
fn tier_for_click(n: u32) -> ShockwaveTier {
    match n {
        n if n % 10 == 0 => ShockwaveTier::Ultra,
        n if n % 5 == 0 => ShockwaveTier::Super,
        n if n % 3 == 0 => ShockwaveTier::Crit,
        _ => ShockwaveTier::Normal,
    }
}

/// 第 `frame` 帧余烬的横坐标，在 [80, 880) 内循环
fn ember_x(frame: u32) -> f64 {
    80.0 + (u64::from(frame) * 37 % 800) as f64
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::default(),
    };
    if cli.mobile {
        config.device = DeviceSetting::Mobile;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate().context("配置无效")?;
    Ok(config)
}

struct Scene {
    tweens: AnimationEngine,
    fx: ParticleEngine,
    hammer: Rc<RecordingTarget>,
    settles: Rc<Cell<u32>>,
    center: Vec2,
    clicks: u32,
}

impl Scene {
    fn new(config: &EngineConfig) -> Self {
        Self {
            tweens: AnimationEngine::new(),
            fx: config.particle_engine(),
            hammer: Rc::new(RecordingTarget::new()),
            settles: Rc::new(Cell::new(0)),
            center: Vec2::new(480.0, 320.0),
            clicks: 0,
        }
    }

    fn click(&mut self) {
        self.clicks += 1;
        let tier = tier_for_click(self.clicks);
        let crit = tier != ShockwaveTier::Normal;
        let origin = self.center + Vec2::new(0.0, 40.0);
        debug!(click = self.clicks, tier = %tier, "模拟点击");

        let handle = self.tweens.handle();
        let hammer = Rc::downgrade(&self.hammer);
        let settles = self.settles.clone();
        self.tweens.play(
            TweenConfig::new(swing_keyframes())
                .with_target(&self.hammer)
                .with_duration(140.0)
                .with_easing("outCubic")
                .with_tag("hammer")
                .on_complete(move || {
                    let Some(hammer) = hammer.upgrade() else {
                        return;
                    };
                    settles.set(settles.get() + 1);
                    handle.play(
                        TweenConfig::new(settle_keyframes())
                            .with_target(&hammer)
                            .with_duration(120.0)
                            .with_easing("outBack")
                            .with_tag("hammer"),
                    );
                }),
        );

        self.fx.emit_shockwave(origin, tier);
        self.fx.emit_sparks(
            origin,
            if crit { 28 } else { 14 },
            &[Color::AMBER, Color::RED, Color::WHITE],
            &SparkOptions::default(),
        );
        self.fx.emit_ground_impact(origin, 8);
        self.fx.emit_text(
            origin - Vec2::new(0.0, 30.0),
            &format!("+{}", u64::from(self.clicks) * 3),
            if crit { 34.0 } else { 24.0 },
            if crit { Color::RED } else { Color::AMBER },
            None,
            crit,
        );

        if crit {
            self.fx.emit_speed_lines(origin, 16, &[Color::WHITE, Color::AMBER]);
        }
        if matches!(tier, ShockwaveTier::Super | ShockwaveTier::Ultra) {
            self.fx.emit_lightning(
                origin - Vec2::new(0.0, 260.0),
                origin,
                Some(Color::VIOLET),
                None,
            );
            self.fx.emit_golden_burst(origin, 1.5);
        }
        if tier == ShockwaveTier::Ultra {
            self.fx.emit_firework(self.center - Vec2::new(0.0, 160.0), &palette::ORBS);
            self.fx.emit_confetti(self.center, 40, &palette::ORBS);
            self.fx.emit_aura_ring(origin, 140.0, &[Color::VIOLET, Color::CYAN], 24);
        }
    }

    fn ambient(&mut self, frame: u32) {
        let t = frame as f64 / 30.0;
        self.fx.update_orbs(self.center, 8);
        self.fx.add_trail_point(
            self.center + Vec2::new(t.cos() * 120.0, t.sin() * 60.0),
            Color::CYAN,
        );
        if frame % 6 == 0 {
            self.fx.emit_ember(Vec2::new(ember_x(frame), 640.0), Color::AMBER);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    info!(device = ?config.device_class(), frames = cli.frames, "开始模拟");

    let mut scene = Scene::new(&config);
    let mut surface = RecordingSurface::new();
    let frame_ms = config.clamp_frame_delta(1000.0 / cli.fps.max(1) as f64);
    let click_every = cli.click_every.max(1);

    let mut started = 0u64;
    let mut completed = 0u64;
    let mut interrupted = 0u64;
    let mut peak = 0;

    for frame in 0..cli.frames {
        if frame % click_every == 0 {
            scene.click();
        }
        scene.ambient(frame);

        for event in scene.tweens.update(frame_ms) {
            match event {
                TweenEvent::Started(_) => started += 1,
                TweenEvent::Completed(_) => completed += 1,
                TweenEvent::Interrupted(_) => interrupted += 1,
            }
        }
        scene.fx.render(frame_ms / 1000.0, &mut surface);
        peak = peak.max(scene.fx.total());
    }

    if let Some(path) = &cli.dump {
        let json = serde_json::to_string_pretty(surface.commands())?;
        fs::write(path, json).with_context(|| format!("写入绘制指令失败: {}", path.display()))?;
        info!(path = %path.display(), "已导出最后一帧绘制指令");
    }

    let summary = Summary {
        frames: cli.frames,
        clicks: scene.clicks,
        tweens_started: started,
        tweens_completed: completed,
        tweens_interrupted: interrupted,
        settle_callbacks: scene.settles.get(),
        peak_particles: peak,
        frames_rendered: surface.frames(),
        last_frame_commands: surface.commands().len(),
        hammer_transform: scene.hammer.state().transform.map(|t| t.to_css()),
        particles: scene.fx.stats(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
