//! Layout math for list screens.
//!
//! Every literal below is a pixel value on the 640x480 reference screen and
//! is multiplied by the display [`Scale`] before use.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::ui::list::ListVariant;
use crate::ui::surface::Surface;

/// Reference-screen pixel constants
pub mod px {
    pub const SCREEN_WIDTH: f64 = 640.0;
    pub const HEADER_HEIGHT: f64 = 60.0;
    pub const LIST_BOTTOM: f64 = 420.0;
    pub const LIST_AREA_HEIGHT: f64 = 360.0;
    pub const STRETCH_MARGIN: f64 = 10.0;
    pub const STRETCH_TOP_INSET: f64 = 4.0;

    pub const ROW_HEIGHT_SMALL: f64 = 60.0;
    pub const ROW_HEIGHT_LARGE: f64 = 90.0;
    pub const ROW_BG_HEIGHT_SMALL: f64 = 56.0;
    pub const ROW_BG_HEIGHT_LARGE: f64 = 90.0;
    pub const DIVIDER_HEIGHT: f64 = 4.0;
    pub const DIVIDER_PADDING: f64 = 4.0;
    pub const LABEL_Y_SMALL: f64 = 27.0;
    pub const LABEL_Y_LARGE: f64 = 37.0;
    pub const DESCRIPTION_Y: f64 = 62.0;

    pub const PADDING_LEFT: f64 = 20.0;
    pub const PADDING_RIGHT: f64 = 20.0;
    pub const ICON_GAP: f64 = 17.0;
    pub const TOGGLE_RIGHT: f64 = 620.0;
    pub const MULTIVALUE_WIDTH: f64 = 226.0;
    pub const LABEL_CROP_MARGIN: f64 = 30.0;

    pub const PREVIEW_WIDTH: u32 = 250;
    pub const PREVIEW_CENTER_Y: f64 = 240.0;
}

/// Display scale multiplier applied to every layout constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Scale {
    /// Non-finite or non-positive factors fall back to 1.0
    pub fn new(factor: f64) -> Self {
        if factor.is_finite() && factor > 0.0 {
            Self(factor)
        } else {
            Self(1.0)
        }
    }

    #[inline]
    pub fn factor(self) -> f64 {
        self.0
    }

    /// Scale a reference pixel value, truncating toward zero
    #[inline]
    pub fn px(self, value: f64) -> i32 {
        (value * self.0) as i32
    }
}

/// Per-call compositor configuration
#[derive(Debug, Clone, Copy)]
pub struct RenderParams<'a> {
    /// Blitted from `dim` into `pos` before anything else
    pub background: Option<&'a Surface>,
    pub dim: Rectangle,
    pub pos: Point,
    pub show_dividers: bool,
    /// Divide the available height evenly between the visible rows
    pub stretch_y: bool,
    pub preview_bg: bool,
    /// Upscale previews narrower than the pane
    pub preview_stretch: bool,
    /// Pane width in reference pixels
    pub preview_width: u32,
    pub preview_smoothing: bool,
}

impl<'a> RenderParams<'a> {
    /// The preset ordinary list screens use
    pub fn standard(background: Option<&'a Surface>, scale: Scale) -> Self {
        let header = scale.px(px::HEADER_HEIGHT);
        Self {
            background,
            dim: Rectangle::new(
                Point::new(0, header),
                Size::new(
                    scale.px(px::SCREEN_WIDTH) as u32,
                    scale.px(px::LIST_AREA_HEIGHT) as u32,
                ),
            ),
            pos: Point::new(0, header),
            show_dividers: true,
            stretch_y: false,
            preview_bg: true,
            preview_stretch: false,
            preview_width: px::PREVIEW_WIDTH,
            preview_smoothing: false,
        }
    }

    /// Preview pane width in screen pixels, never below 1
    pub fn preview_width_px(&self, scale: Scale) -> u32 {
        scale.px(self.preview_width as f64).max(1) as u32
    }
}

/// Vertical placement of the rows for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowGeometry {
    pub item_height: i32,
    /// Gap between a divider and the row background in small lists
    pub item_padding: i32,
    /// Label center offset from the row background top
    pub label_y: i32,
    /// Crop applied to the row background asset
    pub bg_size: Size,
    pub divider_size: Size,
    /// Top of the first visible row
    pub menu_pos_y: i32,
    stretch: bool,
}

/// Row positions are clamped to `-ROW_Y_LIMIT..=ROW_Y_LIMIT`, leaving
/// headroom for the offsets the compositor adds within a row.
const ROW_Y_LIMIT: i32 = i32::MAX / 2;

impl RowGeometry {
    pub fn compute(
        params: &RenderParams<'_>,
        variant: ListVariant,
        scroll_height: usize,
        scale: Scale,
    ) -> Self {
        let small = variant == ListVariant::Small;
        let rows = i32::try_from(scroll_height.max(1)).unwrap_or(i32::MAX);

        let list_height = if params.stretch_y {
            params.dim.size.height as i32 - scale.px(px::STRETCH_MARGIN)
        } else {
            scale.px(px::LIST_BOTTOM)
        };
        let item_padding = if small && params.show_dividers {
            scale.px(px::DIVIDER_PADDING)
        } else {
            0
        };
        let item_height = if params.stretch_y {
            list_height / rows
        } else if small {
            scale.px(px::ROW_HEIGHT_SMALL)
        } else {
            scale.px(px::ROW_HEIGHT_LARGE)
        };
        let menu_pos_y = if params.stretch_y {
            let leftover = list_height.saturating_sub(rows.saturating_mul(item_height));
            params.pos.y + scale.px(px::STRETCH_TOP_INSET) + leftover / 2
        } else {
            scale
                .px(px::LIST_BOTTOM)
                .saturating_sub(rows.saturating_mul(item_height))
        };
        let menu_pos_y = menu_pos_y.clamp(-ROW_Y_LIMIT, ROW_Y_LIMIT);
        let bg_height = if small {
            scale.px(px::ROW_BG_HEIGHT_SMALL)
        } else {
            scale.px(px::ROW_BG_HEIGHT_LARGE)
        };

        Self {
            item_height,
            item_padding,
            label_y: scale.px(if small { px::LABEL_Y_SMALL } else { px::LABEL_Y_LARGE }),
            bg_size: Size::new(params.dim.size.width, bg_height.max(0) as u32),
            divider_size: Size::new(
                params.dim.size.width,
                scale.px(px::DIVIDER_HEIGHT).max(0) as u32,
            ),
            menu_pos_y,
            stretch: params.stretch_y,
        }
    }

    /// Divider position of the row in window slot `slot`
    pub fn row_top(&self, slot: usize) -> i32 {
        let slot = i32::try_from(slot).unwrap_or(i32::MAX);
        let mut y = self
            .menu_pos_y
            .saturating_add(slot.saturating_mul(self.item_height));
        if self.stretch {
            y = y.saturating_add((self.item_height - self.bg_size.height as i32) / 2);
        }
        y.clamp(-ROW_Y_LIMIT, ROW_Y_LIMIT)
    }

    /// Top of the row background in window slot `slot`
    pub fn bg_top(&self, slot: usize) -> i32 {
        self.row_top(slot).saturating_add(self.item_padding)
    }
}
