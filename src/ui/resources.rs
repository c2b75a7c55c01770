//! Theme assets the compositor reads every frame but never owns.
//!
//! [`ThemeResources`] loads PNGs from a theme directory and draws placeholder
//! art with `embedded-graphics` for anything the theme does not ship, so a
//! bare install still renders a usable list.

use std::cell::OnceCell;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, RoundedRectangle, Triangle,
};
use log::{debug, info};

use crate::ui::layout::Scale;
use crate::ui::surface::Surface;

/// Opacity used for disabled rows
pub const HIDDEN_ITEM_ALPHA: u8 = 60;

/// Theme assets looked up by the compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    ListBgSmall,
    ListBgLarge,
    HorizontalDivider,
    ToggleOn,
    ToggleOff,
    LeftArrow,
    RightArrow,
    PreviewBg,
}

impl AssetId {
    pub const ALL: [AssetId; 8] = [
        AssetId::ListBgSmall,
        AssetId::ListBgLarge,
        AssetId::HorizontalDivider,
        AssetId::ToggleOn,
        AssetId::ToggleOff,
        AssetId::LeftArrow,
        AssetId::RightArrow,
        AssetId::PreviewBg,
    ];

    /// File name inside a theme directory
    pub fn file_name(self) -> &'static str {
        match self {
            AssetId::ListBgSmall => "bg-list-s.png",
            AssetId::ListBgLarge => "bg-list-l.png",
            AssetId::HorizontalDivider => "horizontal-divider.png",
            AssetId::ToggleOn => "toggle-on.png",
            AssetId::ToggleOff => "toggle-off.png",
            AssetId::LeftArrow => "icon-left-arrow-24.png",
            AssetId::RightArrow => "icon-right-arrow-24.png",
            AssetId::PreviewBg => "preview-bg.png",
        }
    }

    /// Whether the disabled overlay is derived from this asset
    pub fn feeds_overlay(self) -> bool {
        matches!(
            self,
            AssetId::ToggleOn | AssetId::ToggleOff | AssetId::LeftArrow | AssetId::RightArrow
        )
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Text colors read from the active theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub list_color: Rgb888,
    pub grid_color: Rgb888,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            list_color: Rgb888::WHITE,
            grid_color: Rgb888::new(140, 140, 140),
        }
    }
}

/// Faded toggle and arrow glyphs for disabled rows
#[derive(Debug, Clone)]
pub struct DisabledOverlay {
    pub toggle_on: Surface,
    pub toggle_off: Surface,
    pub arrow_left: Surface,
    pub arrow_right: Surface,
}

impl DisabledOverlay {
    /// Fade each source asset to `alpha`
    pub fn from_assets<R: Resources + ?Sized>(resources: &R, alpha: u8) -> Self {
        Self {
            toggle_on: resources.surface(AssetId::ToggleOn).with_opacity(alpha),
            toggle_off: resources.surface(AssetId::ToggleOff).with_opacity(alpha),
            arrow_left: resources.surface(AssetId::LeftArrow).with_opacity(alpha),
            arrow_right: resources.surface(AssetId::RightArrow).with_opacity(alpha),
        }
    }
}

/// Resource and theme lookup used by the compositor
pub trait Resources {
    fn surface(&self, id: AssetId) -> &Surface;

    /// Full-screen background, if the theme has one
    fn background(&self) -> Option<&Surface>;

    fn theme(&self) -> &Theme;

    /// Make the disabled overlay available. Loads at most once.
    fn load_disabled_overlay(&self);

    /// The overlay, once [`Resources::load_disabled_overlay`] has run
    fn disabled_overlay(&self) -> Option<&DisabledOverlay>;

    fn hidden_item_alpha(&self) -> u8 {
        HIDDEN_ITEM_ALPHA
    }
}

/// Colors used when a theme file is missing
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub theme: Theme,
    pub background: Rgb888,
    pub highlight: Rgb888,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            background: Rgb888::new(20, 20, 20),
            highlight: Rgb888::new(60, 120, 220),
        }
    }
}

/// Theme assets for one theme. Drop it (or call
/// [`ThemeResources::reset_disabled_overlay`]) on a theme switch.
#[derive(Debug)]
pub struct ThemeResources {
    assets: Vec<Surface>,
    background: Option<Surface>,
    theme: Theme,
    hidden_alpha: u8,
    overlay: OnceCell<DisabledOverlay>,
}

impl ThemeResources {
    /// Placeholder art for every asset
    pub fn placeholder(palette: &Palette, screen: Size, scale: Scale, hidden_alpha: u8) -> Self {
        Self {
            assets: AssetId::ALL
                .iter()
                .map(|id| placeholder_asset(*id, palette, scale))
                .collect(),
            background: Some(placeholder_background(palette, screen, scale)),
            theme: palette.theme,
            hidden_alpha,
            overlay: OnceCell::new(),
        }
    }

    /// Load assets from `dir`, falling back to placeholders per missing file.
    ///
    /// A file that exists but cannot be decoded is an error.
    pub fn load(
        dir: Option<&Path>,
        palette: &Palette,
        screen: Size,
        scale: Scale,
        hidden_alpha: u8,
    ) -> color_eyre::Result<Self> {
        let mut resources = Self::placeholder(palette, screen, scale, hidden_alpha);
        let Some(dir) = dir else {
            info!("No theme directory configured, using placeholder assets");
            return Ok(resources);
        };

        let mut loaded = 0;
        for id in AssetId::ALL {
            if let Some(surface) = load_png(&dir.join(id.file_name()))? {
                resources.set_surface(id, surface);
                loaded += 1;
            }
        }
        if let Some(background) = load_png(&dir.join("background.png"))? {
            resources.background = Some(background);
            loaded += 1;
        }

        info!(
            "Loaded {} theme assets from {} ({} placeholders)",
            loaded,
            dir.display(),
            AssetId::ALL.len() + 1 - loaded
        );
        Ok(resources)
    }

    /// Replace one asset. Replacing a toggle or arrow drops the overlay.
    pub fn set_surface(&mut self, id: AssetId, surface: Surface) {
        self.assets[id.index()] = surface;
        if id.feeds_overlay() {
            self.reset_disabled_overlay();
        }
    }

    pub fn set_background(&mut self, background: Option<Surface>) {
        self.background = background;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Forget the disabled overlay; the next disabled row reloads it
    pub fn reset_disabled_overlay(&mut self) {
        if self.overlay.take().is_some() {
            debug!("Disabled overlay dropped");
        }
    }

    pub fn is_overlay_loaded(&self) -> bool {
        self.overlay.get().is_some()
    }
}

impl Resources for ThemeResources {
    fn surface(&self, id: AssetId) -> &Surface {
        &self.assets[id.index()]
    }

    fn background(&self) -> Option<&Surface> {
        self.background.as_ref()
    }

    fn theme(&self) -> &Theme {
        &self.theme
    }

    fn load_disabled_overlay(&self) {
        self.overlay.get_or_init(|| {
            debug!("Loading disabled overlay (alpha {})", self.hidden_alpha);
            DisabledOverlay::from_assets(self, self.hidden_alpha)
        });
    }

    fn disabled_overlay(&self) -> Option<&DisabledOverlay> {
        self.overlay.get()
    }

    fn hidden_item_alpha(&self) -> u8 {
        self.hidden_alpha
    }
}

/// Decode `path` if it exists
fn load_png(path: &Path) -> color_eyre::Result<Option<Surface>> {
    if !path.is_file() {
        return Ok(None);
    }
    let image = image::open(path)
        .wrap_err_with(|| format!("Failed to decode theme asset {}", path.display()))?;
    Ok(Some(Surface::from_image(image.into_rgba8())))
}

fn placeholder_background(palette: &Palette, screen: Size, scale: Scale) -> Surface {
    let mut background = Surface::filled(screen.width, screen.height, palette.background, 255);
    // Title bar band
    Rectangle::new(
        Point::zero(),
        Size::new(screen.width, scale.px(60.0).max(0) as u32),
    )
    .into_styled(PrimitiveStyle::with_fill(darken(palette.background)))
    .draw(&mut background)
    .ok();
    background
}

fn placeholder_asset(id: AssetId, palette: &Palette, scale: Scale) -> Surface {
    let px = |v: f64| scale.px(v).max(1) as u32;
    let accent = palette.highlight;
    let muted = palette.theme.grid_color;

    match id {
        AssetId::ListBgSmall => Surface::filled(px(640.0), px(56.0), accent, 96),
        AssetId::ListBgLarge => Surface::filled(px(640.0), px(90.0), accent, 96),
        AssetId::HorizontalDivider => {
            let mut divider = Surface::new(px(640.0), px(4.0));
            Rectangle::new(
                Point::new(px(20.0) as i32, 0),
                Size::new(px(600.0), px(1.0)),
            )
            .into_styled(PrimitiveStyle::with_fill(muted))
            .draw(&mut divider)
            .ok();
            divider
        }
        AssetId::ToggleOn | AssetId::ToggleOff => {
            let on = id == AssetId::ToggleOn;
            let (width, height) = (px(56.0), px(32.0));
            let mut toggle = Surface::new(width, height);
            let track = PrimitiveStyleBuilder::new()
                .stroke_color(if on { accent } else { muted })
                .stroke_width(px(2.0))
                .fill_color(if on { accent } else { darken(palette.background) })
                .build();
            RoundedRectangle::with_equal_corners(
                Rectangle::new(Point::zero(), Size::new(width, height)),
                Size::new(height / 2, height / 2),
            )
            .into_styled(track)
            .draw(&mut toggle)
            .ok();

            let knob = height.saturating_sub(px(8.0)).max(1);
            let knob_x = if on {
                width.saturating_sub(knob + px(4.0))
            } else {
                px(4.0)
            };
            RoundedRectangle::with_equal_corners(
                Rectangle::new(
                    Point::new(knob_x as i32, px(4.0) as i32),
                    Size::new(knob, knob),
                ),
                Size::new(knob / 2, knob / 2),
            )
            .into_styled(PrimitiveStyle::with_fill(palette.theme.list_color))
            .draw(&mut toggle)
            .ok();
            toggle
        }
        AssetId::LeftArrow | AssetId::RightArrow => {
            let size = px(24.0) as i32;
            let mut arrow = Surface::new(size as u32, size as u32);
            let (tip, base) = if id == AssetId::LeftArrow {
                (4, size - 6)
            } else {
                (size - 5, 5)
            };
            Triangle::new(
                Point::new(tip, size / 2),
                Point::new(base, 4),
                Point::new(base, size - 5),
            )
            .into_styled(PrimitiveStyle::with_fill(palette.theme.list_color))
            .draw(&mut arrow)
            .ok();
            arrow
        }
        AssetId::PreviewBg => Surface::filled(px(270.0), px(360.0), darken(palette.background), 200),
    }
}

fn darken(color: Rgb888) -> Rgb888 {
    Rgb888::new(color.r() / 2, color.g() / 2, color.b() / 2)
}
