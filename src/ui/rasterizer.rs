//! Text rasterization: turns a string into a freshly allocated [`Surface`].
//!
//! This is the expensive call the glyph cache exists to avoid. The bundled
//! implementation draws ProFont bitmap glyphs through `embedded-graphics`.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::ui::layout::Scale;
use crate::ui::surface::Surface;

/// Which font a piece of text is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    /// Primary row labels, multivalue values and the sticky note
    List,
    /// Smaller secondary line under a large row's label
    Hint,
}

/// Font rasterizer collaborator.
///
/// Returns `None` when nothing can be rendered (empty text, missing font);
/// callers must skip the draw rather than fall back to stale pixels.
pub trait FontRasterizer {
    fn render_text(&mut self, role: FontRole, text: &str, color: Rgb888) -> Option<Surface>;
}

impl<T: FontRasterizer + ?Sized> FontRasterizer for &mut T {
    fn render_text(&mut self, role: FontRole, text: &str, color: Rgb888) -> Option<Surface> {
        (**self).render_text(role, text, color)
    }
}

/// Nominal pixel heights at scale 1.0
const LIST_FONT_PX: f64 = 24.0;
const HINT_FONT_PX: f64 = 16.0;

/// Available ProFont sizes, smallest first
const PROFONT_SIZES: [&MonoFont<'static>; 7] = [
    &profont::PROFONT_7_POINT,
    &profont::PROFONT_9_POINT,
    &profont::PROFONT_10_POINT,
    &profont::PROFONT_12_POINT,
    &profont::PROFONT_14_POINT,
    &profont::PROFONT_18_POINT,
    &profont::PROFONT_24_POINT,
];

/// Largest ProFont whose glyph cell fits in `target_px`, or the smallest one.
fn pick_font(target_px: u32) -> &'static MonoFont<'static> {
    PROFONT_SIZES
        .iter()
        .rev()
        .find(|font| font.character_size.height <= target_px)
        .copied()
        .unwrap_or(PROFONT_SIZES[0])
}

/// Bitmap-font rasterizer sized for the display scale
pub struct ProFontRasterizer {
    list: &'static MonoFont<'static>,
    hint: &'static MonoFont<'static>,
    rendered: u64,
}

impl ProFontRasterizer {
    pub fn for_scale(scale: Scale) -> Self {
        Self {
            list: pick_font(scale.px(LIST_FONT_PX).max(1) as u32 + 6),
            hint: pick_font(scale.px(HINT_FONT_PX).max(1) as u32 + 4),
            rendered: 0,
        }
    }

    /// Number of surfaces produced so far
    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    fn font(&self, role: FontRole) -> &'static MonoFont<'static> {
        match role {
            FontRole::List => self.list,
            FontRole::Hint => self.hint,
        }
    }
}

impl FontRasterizer for ProFontRasterizer {
    fn render_text(&mut self, role: FontRole, text: &str, color: Rgb888) -> Option<Surface> {
        let style = MonoTextStyle::new(self.font(role), color);
        let text = Text::with_baseline(text, Point::zero(), style, Baseline::Top);

        let bbox = text.bounding_box();
        if bbox.size.width == 0 || bbox.size.height == 0 {
            return None;
        }

        let mut surface = Surface::new(bbox.size.width, bbox.size.height);
        text.translate(-bbox.top_left).draw(&mut surface).ok()?;

        self.rendered += 1;
        Some(surface)
    }
}
