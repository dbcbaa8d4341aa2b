//! # Color 模块
//!
//! RGBA 颜色，支持 CSS 风格的十六进制写法，以及各特效预设使用的调色板。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// RGBA 颜色（每通道 8 位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    /// 文字阴影（50% 黑）
    pub const SHADOW: Color = Color::rgba(0x00, 0x00, 0x00, 0x80);

    pub const AMBER: Color = Color::rgb(0xf5, 0x9e, 0x0b);
    pub const RED: Color = Color::rgb(0xef, 0x44, 0x44);
    pub const PINK: Color = Color::rgb(0xec, 0x48, 0x99);
    pub const VIOLET: Color = Color::rgb(0x8b, 0x5c, 0xf6);
    pub const CYAN: Color = Color::rgb(0x06, 0xb6, 0xd4);
    pub const EMERALD: Color = Color::rgb(0x10, 0xb9, 0x81);

    /// 创建不透明颜色
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// 创建带透明度的颜色
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 从十六进制字符串解析（`#rgb`、`#rrggbb`、`#rrggbbaa`，`#` 可省略）
    pub fn from_hex(value: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidColor {
            value: value.to_string(),
        };
        let hex = value.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let digit = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                Ok(Self::rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            6 | 8 => {
                let r = channel(&hex[0..2])?;
                let g = channel(&hex[2..4])?;
                let b = channel(&hex[4..6])?;
                let a = if hex.len() == 8 {
                    channel(&hex[6..8])?
                } else {
                    0xff
                };
                Ok(Self::rgba(r, g, b, a))
            }
            _ => Err(invalid()),
        }
    }

    /// 透明度（0.0 - 1.0）
    pub fn alpha(&self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// 各特效预设使用的调色板
pub mod palette {
    use super::Color;

    /// 金色爆发
    pub const GOLDEN: [Color; 5] = [
        Color::rgb(0xff, 0xd7, 0x00),
        Color::rgb(0xff, 0xed, 0x4a),
        Color::AMBER,
        Color::rgb(0xfb, 0xbf, 0x24),
        Color::WHITE,
    ];

    /// 地面碎屑
    pub const DEBRIS: [Color; 4] = [
        Color::rgb(0x88, 0x88, 0x88),
        Color::rgb(0xaa, 0xaa, 0xaa),
        Color::rgb(0x66, 0x66, 0x66),
        Color::rgba(0xf5, 0x9e, 0x0b, 0x33),
    ];

    /// 环绕光球
    pub const ORBS: [Color; 6] = [
        Color::AMBER,
        Color::VIOLET,
        Color::CYAN,
        Color::RED,
        Color::EMERALD,
        Color::PINK,
    ];
}
