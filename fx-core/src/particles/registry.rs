//! # Particle Registry
//!
//! 粒子分类、设备档位与预算表。
//! 各分类的容量上限和配方常量只在这里定义。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// 粒子池分类
///
/// 声明顺序就是每帧更新与绘制的顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolKind {
    Sparks,
    Shockwaves,
    Lightnings,
    Texts,
    SpeedLines,
    Embers,
    Orbs,
}

impl PoolKind {
    /// 固定迭代顺序
    pub const ALL: [PoolKind; 7] = [
        Self::Sparks,
        Self::Shockwaves,
        Self::Lightnings,
        Self::Texts,
        Self::SpeedLines,
        Self::Embers,
        Self::Orbs,
    ];

    /// 在 [`ALL`](Self::ALL) 中的下标
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sparks => "sparks",
            Self::Shockwaves => "shockwaves",
            Self::Lightnings => "lightnings",
            Self::Texts => "texts",
            Self::SpeedLines => "speedLines",
            Self::Embers => "embers",
            Self::Orbs => "orbs",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 设备档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// 桌面级设备
    #[default]
    Desktop,
    /// 移动/低功耗设备
    Mobile,
}

impl DeviceClass {
    /// 根据 User-Agent 判断（包含 `Mobi` 或 `Android`，大小写不敏感）
    pub fn detect(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ua.contains("mobi") || ua.contains("android") {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

impl FromStr for DeviceClass {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            _ => Err(ParseError::UnknownDeviceClass {
                name: s.to_string(),
            }),
        }
    }
}

/// 各分类的容量上限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub sparks: usize,
    pub shockwaves: usize,
    pub lightnings: usize,
    pub texts: usize,
    pub speed_lines: usize,
    pub embers: usize,
    pub orbs: usize,
}

impl Budget {
    /// 桌面预算
    pub const fn desktop() -> Self {
        Self {
            sparks: 300,
            shockwaves: 20,
            lightnings: 15,
            texts: 50,
            speed_lines: 30,
            embers: 120,
            orbs: 12,
        }
    }

    /// 移动端预算（火花与余烬更少）
    pub const fn mobile() -> Self {
        Self {
            sparks: 120,
            embers: 40,
            ..Self::desktop()
        }
    }

    pub const fn for_device(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Desktop => Self::desktop(),
            DeviceClass::Mobile => Self::mobile(),
        }
    }

    pub fn get(&self, kind: PoolKind) -> usize {
        match kind {
            PoolKind::Sparks => self.sparks,
            PoolKind::Shockwaves => self.shockwaves,
            PoolKind::Lightnings => self.lightnings,
            PoolKind::Texts => self.texts,
            PoolKind::SpeedLines => self.speed_lines,
            PoolKind::Embers => self.embers,
            PoolKind::Orbs => self.orbs,
        }
    }

    pub fn set(&mut self, kind: PoolKind, capacity: usize) {
        let slot = match kind {
            PoolKind::Sparks => &mut self.sparks,
            PoolKind::Shockwaves => &mut self.shockwaves,
            PoolKind::Lightnings => &mut self.lightnings,
            PoolKind::Texts => &mut self.texts,
            PoolKind::SpeedLines => &mut self.speed_lines,
            PoolKind::Embers => &mut self.embers,
            PoolKind::Orbs => &mut self.orbs,
        };
        *slot = capacity;
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::desktop()
    }
}

/// 预算覆盖项（配置文件中只写需要改的分类）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetOverrides {
    pub sparks: Option<usize>,
    pub shockwaves: Option<usize>,
    pub lightnings: Option<usize>,
    pub texts: Option<usize>,
    pub speed_lines: Option<usize>,
    pub embers: Option<usize>,
    pub orbs: Option<usize>,
}

impl BudgetOverrides {
    /// 在基础预算上应用覆盖
    pub fn apply(&self, base: Budget) -> Budget {
        Budget {
            sparks: self.sparks.unwrap_or(base.sparks),
            shockwaves: self.shockwaves.unwrap_or(base.shockwaves),
            lightnings: self.lightnings.unwrap_or(base.lightnings),
            texts: self.texts.unwrap_or(base.texts),
            speed_lines: self.speed_lines.unwrap_or(base.speed_lines),
            embers: self.embers.unwrap_or(base.embers),
            orbs: self.orbs.unwrap_or(base.orbs),
        }
    }
}

/// 配方常量
///
/// 时间单位为秒，距离单位为像素，速度单位为像素/秒。
pub mod defaults {
    /// 指针轨迹点的硬上限（超出时丢弃最旧的点）
    pub const TRAIL_CAPACITY: usize = 150;
    /// 轨迹点大小
    pub const TRAIL_SIZE: f64 = 2.5;
    /// 轨迹点寿命
    pub const TRAIL_LIFE: f64 = 0.25;

    /// 火花默认重力
    pub const SPARK_GRAVITY: f64 = 400.0;
    /// 水平阻力：每 1/60 秒乘以该系数
    pub const SPARK_DRAG: f64 = 0.995;
    /// 火花发光半径系数
    pub const SPARK_GLOW: f64 = 2.5;

    /// 闪电默认寿命
    pub const LIGHTNING_LIFE: f64 = 0.3;
    /// 闪电递归深度
    pub const LIGHTNING_DEPTH: u32 = 4;
    /// 闪电递归深度上限（线段数随深度指数增长）
    pub const LIGHTNING_MAX_DEPTH: u32 = 8;
    /// 中点抖动范围（总宽度）
    pub const LIGHTNING_JITTER: f64 = 50.0;
    /// 每个中点产生分支的概率（深度 ≥ 2 时）
    pub const LIGHTNING_BRANCH_CHANCE: f64 = 0.3;
    /// 分支终点偏移范围（总宽度）
    pub const LIGHTNING_BRANCH_SPREAD: f64 = 80.0;

    /// 速度线内半径
    pub const SPEED_LINE_INNER_RADIUS: f64 = 40.0;

    /// 飘字默认时长
    pub const TEXT_DURATION: f64 = 1.0;
    /// 飘字缩放弹出阶段占寿命的比例
    pub const TEXT_POP_PHASE: f64 = 0.15;
    /// 飘字竖直速度衰减：每 1/60 秒乘以该系数
    pub const TEXT_RISE_DECAY: f64 = 0.97;

    /// 光球椭圆轨道的竖直压缩
    pub const ORB_SQUASH: f64 = 0.55;

    /// 参考帧长（按帧定义的衰减系数以此换算）
    pub const REFERENCE_FPS: f64 = 60.0;
}
