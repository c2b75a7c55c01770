use embedded_graphics::pixelcolor::Rgb888;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ui::resources::{HIDDEN_ITEM_ALPHA, Palette, Theme};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ThemeConfig {
    /// Directory holding the theme PNGs; placeholders are drawn when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default = "ThemeConfig::default_list_color")]
    pub list_color: String,
    #[serde(default = "ThemeConfig::default_grid_color")]
    pub grid_color: String,
    #[serde(default = "ThemeConfig::default_background")]
    pub background: String,
    #[serde(default = "ThemeConfig::default_highlight")]
    pub highlight: String,
    /// Opacity of disabled rows (0-255)
    #[serde(default = "ThemeConfig::default_hidden_item_alpha")]
    pub hidden_item_alpha: u8,
}

impl ThemeConfig {
    fn default_list_color() -> String {
        "#FFFFFF".to_string()
    }

    fn default_grid_color() -> String {
        "#8C8C8C".to_string()
    }

    fn default_background() -> String {
        "#141414".to_string()
    }

    fn default_highlight() -> String {
        "#3C78DC".to_string()
    }

    fn default_hidden_item_alpha() -> u8 {
        HIDDEN_ITEM_ALPHA
    }

    /// Parse a hex color string like "#FF5500"
    pub fn parse_hex(hex: &str) -> Option<Rgb888> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb888::new(r, g, b))
    }

    fn color_or(value: &str, fallback: &str) -> Rgb888 {
        Self::parse_hex(value)
            .or_else(|| Self::parse_hex(fallback))
            .unwrap_or(Rgb888::new(255, 255, 255))
    }

    pub fn palette(&self) -> Palette {
        Palette {
            theme: Theme {
                list_color: Self::color_or(&self.list_color, &Self::default_list_color()),
                grid_color: Self::color_or(&self.grid_color, &Self::default_grid_color()),
            },
            background: Self::color_or(&self.background, &Self::default_background()),
            highlight: Self::color_or(&self.highlight, &Self::default_highlight()),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            path: None,
            list_color: Self::default_list_color(),
            grid_color: Self::default_grid_color(),
            background: Self::default_background(),
            highlight: Self::default_highlight(),
            hidden_item_alpha: Self::default_hidden_item_alpha(),
        }
    }
}
