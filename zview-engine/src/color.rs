use serde::{Deserialize, Serialize};
use zview_core::drawing::{Drawing, Entity};

/// 24 位 RGB 颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    #[inline]
    pub fn from_rgb(rgb: u32) -> Self {
        Self(rgb & 0xFF_FFFF)
    }

    #[inline]
    pub fn rgb(self) -> u32 {
        self.0
    }

    /// 归一化到 0..=1 的 RGB 分量，供渲染端直接使用。
    pub fn normalized(self) -> [f32; 3] {
        let red = ((self.0 >> 16) & 0xFF) as f32 / 255.0;
        let green = ((self.0 >> 8) & 0xFF) as f32 / 255.0;
        let blue = (self.0 & 0xFF) as f32 / 255.0;
        [red, green, blue]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// 解析图元显示颜色：实体颜色 → 图层颜色 → 黑色。
///
/// 实体颜色为 0 时视为未设置并回退到图层颜色；纯白统一改为黑色，
/// 保证默认线条在浅色背景上可见。
pub fn resolve_color(entity: &Entity, drawing: &Drawing) -> Color {
    let raw = match entity.color {
        Some(color) if color != 0 => Some(color),
        _ => entity
            .layer
            .as_deref()
            .and_then(|name| drawing.layer(name))
            .and_then(|layer| layer.color),
    };
    match raw.map(Color::from_rgb) {
        Some(Color::WHITE) | None => Color::BLACK,
        Some(color) => color,
    }
}
