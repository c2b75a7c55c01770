use embedded_graphics::prelude::Size;
use serde::{Deserialize, Serialize};

use crate::ui::layout::Scale;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    /// Framebuffer width in pixels
    #[serde(default = "DisplayConfig::default_width")]
    pub width: u32,
    /// Framebuffer height in pixels
    #[serde(default = "DisplayConfig::default_height")]
    pub height: u32,
    /// Multiplier applied to every layout constant
    #[serde(default = "DisplayConfig::default_scale")]
    pub scale: f64,
    /// Time budget for one composited frame
    #[serde(default = "DisplayConfig::default_frame_budget_ms")]
    pub frame_budget_ms: u64,
}

impl DisplayConfig {
    fn default_width() -> u32 {
        640
    }

    fn default_height() -> u32 {
        480
    }

    fn default_scale() -> f64 {
        1.0
    }

    fn default_frame_budget_ms() -> u64 {
        16
    }

    pub fn scale(&self) -> Scale {
        Scale::new(self.scale)
    }

    pub fn screen_size(&self) -> Size {
        Size::new(self.width.max(1), self.height.max(1))
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            scale: Self::default_scale(),
            frame_budget_ms: Self::default_frame_budget_ms(),
        }
    }
}
