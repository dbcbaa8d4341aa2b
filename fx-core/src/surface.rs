//! # Surface 模块
//!
//! 二维即时模式绘制接口，以及记录型实现。
//!
//! ## 设计原则
//!
//! - **与后端无关**：Canvas2D、egui painter、wgpu 批处理都可以实现 [`DrawSurface`]
//! - **状态栈**：`save`/`restore` 保存变换、全局透明度与发光设置
//! - 粒子绘制只读取模拟状态，不修改它

use serde::{Deserialize, Serialize};

use crate::animation::Vec2;
use crate::color::Color;

/// 线端样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// 描边样式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub cap: LineCap,
}

impl Stroke {
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            cap: LineCap::Butt,
        }
    }

    pub fn round(mut self) -> Self {
        self.cap = LineCap::Round;
        self
    }
}

/// 二维绘制表面
pub trait DrawSurface {
    /// 清空整个表面
    fn clear(&mut self);

    /// 压入当前状态（变换、全局透明度、发光）
    fn save(&mut self);
    /// 弹出状态
    fn restore(&mut self);

    /// 设置全局透明度（0.0 - 1.0）
    fn set_global_alpha(&mut self, alpha: f64);
    /// 设置发光：颜色与模糊半径（0 表示关闭）
    fn set_glow(&mut self, color: Color, blur: f64);

    fn translate(&mut self, offset: Vec2);
    /// 旋转（弧度）
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, sx: f64, sy: f64);

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f64, stroke: Stroke);
    /// 填充闭合路径
    fn fill_path(&mut self, points: &[Vec2], color: Color);
    /// 描边开放折线
    fn stroke_path(&mut self, points: &[Vec2], stroke: Stroke);
    /// 居中绘制文字
    fn fill_text(&mut self, text: &str, position: Vec2, size: f64, color: Color);
}

/// 记录下来的绘制指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear,
    Save,
    Restore,
    GlobalAlpha { alpha: f64 },
    Glow { color: Color, blur: f64 },
    Translate { offset: Vec2 },
    Rotate { radians: f64 },
    Scale { sx: f64, sy: f64 },
    FillCircle { center: Vec2, radius: f64, color: Color },
    StrokeCircle { center: Vec2, radius: f64, stroke: Stroke },
    FillPath { points: Vec<Vec2>, color: Color },
    StrokePath { points: Vec<Vec2>, stroke: Stroke },
    FillText { text: String, position: Vec2, size: f64, color: Color },
}

impl DrawCommand {
    /// 是否是实际产生像素的指令
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::FillCircle { .. }
                | Self::StrokeCircle { .. }
                | Self::FillPath { .. }
                | Self::StrokePath { .. }
                | Self::FillText { .. }
        )
    }
}

/// 记录型表面
///
/// 把每次调用记录成 [`DrawCommand`]，用于无窗口运行与测试。
/// `clear` 会丢弃之前的全部记录，对应"每帧从空白开始"。
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    depth: usize,
    frames: u64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// 自上次 `clear` 以来的指令
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// 取走指令
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// 图元指令数量
    pub fn primitive_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_primitive()).count()
    }

    /// `clear` 被调用的次数
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// 当前 `save` 嵌套深度（正常帧结束后应为 0）
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 所有描边圆的半径（按绘制顺序）
    pub fn ring_radii(&self) -> Vec<f64> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeCircle { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.depth = 0;
        self.frames += 1;
    }

    fn save(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.commands.push(DrawCommand::Restore);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.commands.push(DrawCommand::GlobalAlpha { alpha });
    }

    fn set_glow(&mut self, color: Color, blur: f64) {
        self.commands.push(DrawCommand::Glow { color, blur });
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate { offset });
    }

    fn rotate(&mut self, radians: f64) {
        self.commands.push(DrawCommand::Rotate { radians });
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.commands.push(DrawCommand::Scale { sx, sy });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f64, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            stroke,
        });
    }

    fn fill_path(&mut self, points: &[Vec2], color: Color) {
        self.commands.push(DrawCommand::FillPath {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_path(&mut self, points: &[Vec2], stroke: Stroke) {
        self.commands.push(DrawCommand::StrokePath {
            points: points.to_vec(),
            stroke,
        });
    }

    fn fill_text(&mut self, text: &str, position: Vec2, size: f64, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            position,
            size,
            color,
        });
    }
}
