//! # Error 模块
//!
//! 定义 fx-core 中使用的错误类型。
//!
//! 引擎的播放/发射/更新/渲染接口全部不可失败，错误只出现在两处：
//! 配置文件读写，以及名称/颜色的严格解析（宽松查找会降级为默认值）。

use thiserror::Error;

/// 解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 未知的缓动函数名
    #[error("未知的缓动函数: '{name}'")]
    UnknownEasing { name: String },

    /// 未知的冲击波等级
    #[error("未知的冲击波等级: '{name}'")]
    UnknownShockwaveTier { name: String },

    /// 未知的设备类型
    #[error("未知的设备类型: '{name}'")]
    UnknownDeviceClass { name: String },

    /// 无效的颜色字符串
    #[error("无效的颜色: '{value}'（期望 #rgb / #rrggbb / #rrggbbaa）")]
    InvalidColor { value: String },
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
