use serde::{Deserialize, Serialize};

use crate::ui::layout::{RenderParams, Scale, px};
use crate::ui::list::ListVariant;
use crate::ui::surface::Surface;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ListConfig {
    #[serde(default = "ListConfig::default_show_dividers")]
    pub show_dividers: bool,
    /// Spread the visible rows over the whole list area
    #[serde(default)]
    pub stretch_y: bool,
    #[serde(default = "ListConfig::default_preview_bg")]
    pub preview_bg: bool,
    /// Upscale previews narrower than the pane
    #[serde(default)]
    pub preview_stretch: bool,
    #[serde(default = "ListConfig::default_preview_width")]
    pub preview_width: u32,
    #[serde(default)]
    pub preview_smoothing: bool,
    /// Use 60px rows instead of 90px rows
    #[serde(default)]
    pub small_rows: bool,
    /// Override the number of rows in the scroll window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_rows: Option<usize>,
}

impl ListConfig {
    fn default_show_dividers() -> bool {
        true
    }

    fn default_preview_bg() -> bool {
        true
    }

    fn default_preview_width() -> u32 {
        px::PREVIEW_WIDTH
    }

    pub fn variant(&self) -> ListVariant {
        if self.small_rows {
            ListVariant::Small
        } else {
            ListVariant::Large
        }
    }

    /// The standard list screen parameters with this section's overrides
    pub fn render_params<'a>(&self, background: Option<&'a Surface>, scale: Scale) -> RenderParams<'a> {
        RenderParams {
            show_dividers: self.show_dividers,
            stretch_y: self.stretch_y,
            preview_bg: self.preview_bg,
            preview_stretch: self.preview_stretch,
            preview_width: self.preview_width.max(1),
            preview_smoothing: self.preview_smoothing,
            ..RenderParams::standard(background, scale)
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            show_dividers: Self::default_show_dividers(),
            stretch_y: false,
            preview_bg: Self::default_preview_bg(),
            preview_stretch: false,
            preview_width: Self::default_preview_width(),
            preview_smoothing: false,
            small_rows: false,
            visible_rows: None,
        }
    }
}
