//! # Config 模块
//!
//! 引擎配置（JSON 文件），集中管理设备档位、预算覆盖、帧间隔上限、
//! 随机种子与闪电生成参数。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高，由宿主合并）
//! 2. 配置文件
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::particles::{
    Budget, BudgetOverrides, DeviceClass, LightningParams, ParticleEngine, PoolKind, defaults,
};
use crate::rng::FxRng;

/// 闪电递归深度上限
pub const MAX_LIGHTNING_DEPTH: u32 = defaults::LIGHTNING_MAX_DEPTH;
/// 轨迹上限与单个分类预算的上限
pub const MAX_CAPACITY: usize = 100_000;

/// 设备档位设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSetting {
    Desktop,
    Mobile,
    /// 根据 `user_agent` 判断，缺省为桌面
    #[default]
    Auto,
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 设备档位
    #[serde(default)]
    pub device: DeviceSetting,

    /// `device = auto` 时用于判断的 User-Agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// 在设备预算表之上的覆盖项
    #[serde(default)]
    pub budget: BudgetOverrides,

    /// 轨迹点上限
    #[serde(default = "default_trail_capacity")]
    pub trail_capacity: usize,

    /// 单帧间隔上限（毫秒），供宿主在卡顿后裁剪 `dt`
    #[serde(default = "default_max_frame_delta_ms")]
    pub max_frame_delta_ms: f64,

    /// 随机种子（缺省使用系统熵）
    #[serde(default)]
    pub seed: Option<u64>,

    /// 闪电生成参数
    #[serde(default)]
    pub lightning: LightningParams,
}

fn default_trail_capacity() -> usize {
    defaults::TRAIL_CAPACITY
}

fn default_max_frame_delta_ms() -> f64 {
    500.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device: DeviceSetting::default(),
            user_agent: None,
            budget: BudgetOverrides::default(),
            trail_capacity: default_trail_capacity(),
            max_frame_delta_ms: default_max_frame_delta_ms(),
            seed: None,
            lightning: LightningParams::default(),
        }
    }
}

impl EngineConfig {
    /// 加载配置文件
    ///
    /// 文件不存在或解析失败时返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lightning = &self.lightning;

        if !(0.0..=1.0).contains(&lightning.branch_chance) {
            return Err(ConfigError::ValidationFailed(
                "闪电分支概率必须在 0.0 - 1.0 之间".to_string(),
            ));
        }

        if lightning.depth > MAX_LIGHTNING_DEPTH {
            return Err(ConfigError::ValidationFailed(format!(
                "闪电递归深度不能超过 {}",
                MAX_LIGHTNING_DEPTH
            )));
        }

        for (name, value) in [("jitter", lightning.jitter), ("branch_spread", lightning.branch_spread)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "闪电参数 {} 必须是非负有限数",
                    name
                )));
            }
        }

        if self.trail_capacity == 0 || self.trail_capacity > MAX_CAPACITY {
            return Err(ConfigError::ValidationFailed(format!(
                "轨迹上限必须在 1 - {} 之间",
                MAX_CAPACITY
            )));
        }

        let budget = self.budget();
        if let Some(kind) = PoolKind::ALL.into_iter().find(|&k| budget.get(k) > MAX_CAPACITY) {
            return Err(ConfigError::ValidationFailed(format!(
                "{} 预算不能超过 {}",
                kind, MAX_CAPACITY
            )));
        }

        if !(self.max_frame_delta_ms.is_finite() && self.max_frame_delta_ms > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "帧间隔上限必须是正数".to_string(),
            ));
        }

        Ok(())
    }

    /// 实际生效的设备档位
    pub fn device_class(&self) -> DeviceClass {
        match self.device {
            DeviceSetting::Desktop => DeviceClass::Desktop,
            DeviceSetting::Mobile => DeviceClass::Mobile,
            DeviceSetting::Auto => self
                .user_agent
                .as_deref()
                .map(DeviceClass::detect)
                .unwrap_or_default(),
        }
    }

    /// 设备预算表 + 覆盖项
    pub fn budget(&self) -> Budget {
        self.budget.apply(Budget::for_device(self.device_class()))
    }

    /// 裁剪帧间隔（毫秒）；非有限或负值按 0 处理
    ///
    /// 上限本身无效（非正或非有限）时使用默认的 500 毫秒。
    pub fn clamp_frame_delta(&self, dt_ms: f64) -> f64 {
        let limit = if self.max_frame_delta_ms.is_finite() && self.max_frame_delta_ms > 0.0 {
            self.max_frame_delta_ms
        } else {
            default_max_frame_delta_ms()
        };
        if dt_ms.is_finite() {
            dt_ms.max(0.0).min(limit)
        } else {
            0.0
        }
    }

    /// 按配置构建粒子引擎
    pub fn particle_engine(&self) -> ParticleEngine {
        ParticleEngine::with_budget(
            self.device_class(),
            self.budget(),
            FxRng::from_seed_option(self.seed),
        )
        .with_lightning(self.lightning)
        .with_trail_capacity(self.trail_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Vec2;
    use crate::particles::Particle;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.device, DeviceSetting::Auto);
        assert_eq!(config.trail_capacity, 150);
        assert_eq!(config.max_frame_delta_ms, 500.0);
        assert_eq!(config.lightning.depth, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "device": "mobile", "budget": { "embers": 10 }, "seed": 7 }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.device_class(), DeviceClass::Mobile);
        let budget = config.budget();
        assert_eq!(budget.embers, 10);
        assert_eq!(budget.sparks, 120);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.lightning, LightningParams::default());
    }

    #[test]
    fn test_auto_device_detection() {
        let mut config = EngineConfig::default();
        assert_eq!(config.device_class(), DeviceClass::Desktop);

        config.user_agent = Some("Mozilla/5.0 (Linux; Android 13)".to_string());
        assert_eq!(config.device_class(), DeviceClass::Mobile);

        config.device = DeviceSetting::Desktop;
        assert_eq!(config.device_class(), DeviceClass::Desktop);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.lightning.branch_chance = 1.5;
        assert!(config.validate().is_err());
        config.lightning.branch_chance = 0.3;

        config.lightning.depth = 9;
        assert!(config.validate().is_err());
        config.lightning.depth = 4;

        config.lightning.jitter = f64::NAN;
        assert!(config.validate().is_err());
        config.lightning.jitter = 50.0;

        config.lightning.branch_spread = -1.0;
        assert!(config.validate().is_err());
        config.lightning.branch_spread = 80.0;

        config.trail_capacity = 0;
        assert!(config.validate().is_err());
        config.trail_capacity = 150;

        config.max_frame_delta_ms = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_clamp_frame_delta() {
        let config = EngineConfig::default();
        assert_eq!(config.clamp_frame_delta(16.0), 16.0);
        assert_eq!(config.clamp_frame_delta(3000.0), 500.0);
        assert_eq!(config.clamp_frame_delta(-4.0), 0.0);
        assert_eq!(config.clamp_frame_delta(f64::NAN), 0.0);
    }

    #[test]
    fn test_clamp_frame_delta_with_invalid_limit() {
        let config: EngineConfig = serde_json::from_str(r#"{ "max_frame_delta_ms": -1.0 }"#).unwrap();
        assert!(config.validate().is_err());
        assert_eq!(config.clamp_frame_delta(16.0), 16.0);

        for limit in [0.0, f64::NAN, f64::INFINITY] {
            let config = EngineConfig {
                max_frame_delta_ms: limit,
                ..Default::default()
            };
            assert_eq!(config.clamp_frame_delta(16.0), 16.0);
            assert_eq!(config.clamp_frame_delta(3000.0), 500.0);
            assert_eq!(config.clamp_frame_delta(-4.0), 0.0);
        }
    }

    #[test]
    fn test_oversized_capacities_rejected() {
        let json = r#"{ "trail_capacity": 18446744073709551615 }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
        let fx = config.particle_engine();
        assert_eq!(fx.trail().capacity(), usize::MAX);

        let config = EngineConfig {
            budget: BudgetOverrides {
                sparks: Some(MAX_CAPACITY + 1),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unvalidated_lightning_depth_is_capped() {
        let config = EngineConfig {
            seed: Some(3),
            lightning: LightningParams {
                depth: 64,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut fx = config.particle_engine();
        fx.emit_lightning(Vec2::zero(), Vec2::new(0.0, 100.0), None, None);
        let bolt = fx
            .pool(PoolKind::Lightnings)
            .iter()
            .find_map(Particle::as_lightning)
            .unwrap();
        assert_eq!(bolt.trunk().len(), (1 << MAX_LIGHTNING_DEPTH) + 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fx.json");

        let config = EngineConfig {
            device: DeviceSetting::Mobile,
            seed: Some(99),
            trail_capacity: 40,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let missing = EngineConfig::load(dir.path().join("missing.json"));
        assert_eq!(missing, EngineConfig::default());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(EngineConfig::load(&broken), EngineConfig::default());
    }

    #[test]
    fn test_particle_engine_from_config() {
        let config = EngineConfig {
            device: DeviceSetting::Mobile,
            seed: Some(1),
            trail_capacity: 3,
            budget: BudgetOverrides {
                orbs: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };
        let fx = config.particle_engine();
        assert_eq!(fx.device(), DeviceClass::Mobile);
        assert_eq!(fx.budget().orbs, 2);
        assert_eq!(fx.trail().capacity(), 3);
    }
}
