//! # Rng 模块
//!
//! 可注入的随机源。闪电形状、粒子抖动等所有随机量都从这里取，
//! 测试中用固定种子即可得到可复现的结果。

use std::f64::consts::TAU;
use std::fmt;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// 特效随机源
pub struct FxRng {
    inner: Box<dyn RngCore>,
}

impl FxRng {
    /// 使用任意 `RngCore` 实现
    pub fn new(rng: impl RngCore + 'static) -> Self {
        Self {
            inner: Box::new(rng),
        }
    }

    /// 固定种子（可复现）
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// 系统熵初始化
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_os_rng())
    }

    /// 有种子用种子，否则使用系统熵
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// [0, 1) 均匀分布
    pub fn unit(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    /// `base + [0, var)`
    pub fn spread(&mut self, base: f64, var: f64) -> f64 {
        base + self.unit() * var
    }

    /// 以 0 为中心、总宽度为 `width` 的抖动：`[-width/2, width/2)`
    pub fn jitter(&mut self, width: f64) -> f64 {
        (self.unit() - 0.5) * width
    }

    /// 以概率 `p` 返回 true
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// 随机角度 [0, 2π)
    pub fn angle(&mut self) -> f64 {
        self.unit() * TAU
    }

    /// 从切片中随机取一个元素
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = ((self.unit() * items.len() as f64) as usize).min(items.len() - 1);
        items.get(index)
    }
}

impl fmt::Debug for FxRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FxRng").finish_non_exhaustive()
    }
}
