//! List compositor
//!
//! Draws one frame of a scrollable list: background, dividers, the active
//! row highlight, per-kind widgets, labels through the [`GlyphCache`], and
//! the active item's preview pane.
//!
//! The compositor keeps no list state between frames. Everything it needs
//! comes from the [`ListState`], the [`RenderParams`] and the cache, so a
//! frame is a function of those inputs plus the clock value it advances.
//!
//! Failures never abort a frame: a label the rasterizer cannot produce is
//! skipped, a preview that cannot be decoded is left out.

use std::borrow::Cow;
use std::ops::Range;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::trace;

use crate::ui::glyph_cache::GlyphCache;
use crate::ui::layout::{RenderParams, RowGeometry, Scale, px};
use crate::ui::list::{ItemKind, ListItem, ListState, ListVariant};
use crate::ui::preview::{self, PreviewSource};
use crate::ui::rasterizer::{FontRasterizer, FontRole};
use crate::ui::resources::{AssetId, Resources};
use crate::ui::surface::Surface;

/// Widget drawn on the right side of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Widget {
    #[default]
    None,
    Toggle {
        on: bool,
        /// Drawn with the disabled overlay glyph
        faded: bool,
        pos: Point,
    },
    MultiValue {
        left: Point,
        right: Point,
        /// `None` when the value text could not be rendered
        value: Option<Point>,
    },
}

/// What was drawn for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub index: usize,
    /// Divider position of the row
    pub top: i32,
    pub active: bool,
    pub shown_disabled: bool,
    pub icon: Option<Point>,
    pub widget: Widget,
    /// Right limit handed to the label
    pub label_end: i32,
    pub label: Option<Point>,
    pub description: Option<Point>,
}

/// Where the preview pane image landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewReport {
    pub index: usize,
    pub pos: Point,
    pub size: Size,
    /// A transient scaled copy was drawn instead of the cached original
    pub scaled: bool,
}

/// Summary of the last composited frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub frame: u32,
    pub visible: Range<usize>,
    pub rows: Vec<RowReport>,
    /// Sticky note label position
    pub sticky: Option<Point>,
    pub preview: Option<PreviewReport>,
    /// A visible row needed the disabled overlay
    pub overlay_requested: bool,
}

impl FrameReport {
    fn reset(&mut self, frame: u32) {
        self.frame = frame;
        self.visible = 0..0;
        self.rows.clear();
        self.sticky = None;
        self.preview = None;
        self.overlay_requested = false;
    }

    pub fn row(&self, index: usize) -> Option<&RowReport> {
        self.rows.iter().find(|row| row.index == index)
    }
}

/// Draws list frames through a glyph cache owned for the process lifetime
pub struct ListCompositor<F: FontRasterizer> {
    cache: GlyphCache,
    fonts: F,
    scale: Scale,
    report: FrameReport,
}

impl<F: FontRasterizer> ListCompositor<F> {
    pub fn new(fonts: F, scale: Scale) -> Self {
        Self {
            cache: GlyphCache::new(),
            fonts,
            scale,
            report: FrameReport::default(),
        }
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    pub fn fonts(&self) -> &F {
        &self.fonts
    }

    pub fn last_frame(&self) -> &FrameReport {
        &self.report
    }

    /// Draw `list` with the standard list screen parameters
    pub fn render_list<R, P>(
        &mut self,
        screen: &mut Surface,
        list: &mut ListState,
        res: &R,
        previews: &mut P,
    ) -> &FrameReport
    where
        R: Resources + ?Sized,
        P: PreviewSource + ?Sized,
    {
        let params = RenderParams::standard(res.background(), self.scale);
        self.render_list_custom(screen, list, res, previews, &params)
    }

    /// Draw one frame of `list`. Advances the frame clock exactly once.
    pub fn render_list_custom<R, P>(
        &mut self,
        screen: &mut Surface,
        list: &mut ListState,
        res: &R,
        previews: &mut P,
        params: &RenderParams<'_>,
    ) -> &FrameReport
    where
        R: Resources + ?Sized,
        P: PreviewSource + ?Sized,
    {
        let scale = self.scale;
        let frame = self.cache.advance_frame();
        let mut report = std::mem::take(&mut self.report);
        report.reset(frame);

        if let Some(background) = params.background {
            background.blit(Some(params.dim), screen, params.pos);
        }

        let visible = list.visible_range();
        report.visible = visible.clone();

        let geometry = RowGeometry::compute(params, list.variant, list.scroll_height, scale);
        let small = list.variant == ListVariant::Small;
        let theme = *res.theme();
        let hidden_alpha = res.hidden_item_alpha();
        let divider = res.surface(AssetId::HorizontalDivider);
        let divider_crop = Rectangle::new(Point::zero(), geometry.divider_size);
        let screen_width = scale.px(px::SCREEN_WIDTH);

        if list.items()[visible.clone()].iter().any(ListItem::shown_disabled) {
            res.load_disabled_overlay();
            report.overlay_requested = true;
        }
        let overlay = res.disabled_overlay();

        if list.has_sticky
            && let Some(active) = list.active_item()
        {
            let header = Point::new(0, scale.px(px::HEADER_HEIGHT));
            if params.show_dividers {
                divider.blit(Some(divider_crop), screen, header);
            }
            report.sticky = self.draw_label(
                screen,
                FontRole::List,
                &active.sticky_note,
                theme.list_color,
                Point::new(scale.px(px::PADDING_LEFT), header.y + geometry.label_y),
                screen_width,
                Some(hidden_alpha),
            );
        }

        let active_pos = list.active_pos();
        let mut active_preview = None;

        for (slot, index) in visible.clone().enumerate() {
            let top = geometry.row_top(slot);
            if params.show_dividers {
                divider.blit(Some(divider_crop), screen, Point::new(0, top));
            }
            let bg_top = top + geometry.item_padding;
            let active = index == active_pos;

            let item = &mut list.items_mut()[index];
            if active {
                let highlight = res.surface(if small {
                    AssetId::ListBgSmall
                } else {
                    AssetId::ListBgLarge
                });
                highlight.blit(
                    Some(Rectangle::new(Point::zero(), geometry.bg_size)),
                    screen,
                    Point::new(0, bg_top),
                );
                if preview::resolve(item, previews).is_some() {
                    active_preview = Some(index);
                }
            }
            let item: &ListItem = item;

            let shown_disabled = item.shown_disabled();
            let fade = shown_disabled.then_some(hidden_alpha);
            let faded_overlay = if shown_disabled { overlay } else { None };
            // Without an overlay, fade the regular glyphs at blit time instead
            let widget_alpha = match (shown_disabled, faded_overlay) {
                (true, None) => hidden_alpha,
                _ => u8::MAX,
            };

            let center_y = bg_top + geometry.bg_size.height as i32 / 2;
            let mut offset_x = scale.px(px::PADDING_LEFT);
            let mut label_end = screen_width;
            let mut row = RowReport {
                index,
                top,
                active,
                shown_disabled,
                icon: None,
                widget: Widget::None,
                label_end,
                label: None,
                description: None,
            };

            if let Some(icon) = item.icon.as_deref()
                && icon.width() > 1
            {
                let pos = Point::new(offset_x, center_y - icon.height() as i32 / 2);
                icon.blit(None, screen, pos);
                row.icon = Some(pos);
                offset_x += icon.width() as i32 + scale.px(px::ICON_GAP);
            }

            match item.kind {
                ItemKind::Toggle => {
                    let on = item.is_on();
                    let toggle = match faded_overlay {
                        Some(overlay) if on => &overlay.toggle_on,
                        Some(overlay) => &overlay.toggle_off,
                        None if on => res.surface(AssetId::ToggleOn),
                        None => res.surface(AssetId::ToggleOff),
                    };
                    let pos = Point::new(
                        scale.px(px::TOGGLE_RIGHT) - toggle.width() as i32,
                        center_y - toggle.height() as i32 / 2,
                    );
                    label_end = pos.x;
                    toggle.blit_alpha(None, screen, pos, widget_alpha);
                    row.widget = Widget::Toggle {
                        on,
                        faded: faded_overlay.is_some(),
                        pos,
                    };
                }
                ItemKind::MultiValue => {
                    let (arrow_left, arrow_right) = match faded_overlay {
                        Some(overlay) => (&overlay.arrow_left, &overlay.arrow_right),
                        None => (
                            res.surface(AssetId::LeftArrow),
                            res.surface(AssetId::RightArrow),
                        ),
                    };
                    let value_width = scale.px(px::MULTIVALUE_WIDTH);
                    let right = Point::new(
                        screen_width - scale.px(px::PADDING_RIGHT) - arrow_right.width() as i32,
                        center_y - arrow_right.height() as i32 / 2,
                    );
                    let left = Point::new(
                        right.x - value_width - arrow_left.width() as i32,
                        center_y - arrow_left.height() as i32 / 2,
                    );
                    arrow_left.blit_alpha(None, screen, left, widget_alpha);
                    arrow_right.blit_alpha(None, screen, right, widget_alpha);
                    label_end = left.x;

                    let value_text = item.value_label();
                    let value = self
                        .cache
                        .get_or_render(&mut self.fonts, FontRole::List, &value_text, theme.list_color)
                        .map(|surface| {
                            let label_width = (surface.width() as i32).min(value_width);
                            let pos = Point::new(
                                right.x - value_width / 2 - label_width / 2,
                                center_y - surface.height() as i32 / 2,
                            );
                            let crop = Rectangle::new(
                                Point::zero(),
                                Size::new(value_width.max(0) as u32, surface.height()),
                            );
                            surface.blit_alpha(Some(crop), screen, pos, fade.unwrap_or(u8::MAX));
                            pos
                        });
                    row.widget = Widget::MultiValue { left, right, value };
                }
                ItemKind::Label => {}
            }

            row.label_end = label_end;
            row.label = self.draw_label(
                screen,
                FontRole::List,
                &item.label,
                theme.list_color,
                Point::new(offset_x, bg_top + geometry.label_y),
                label_end,
                fade,
            );

            if !small && !item.description.is_empty() {
                row.description = self.draw_label(
                    screen,
                    FontRole::Hint,
                    &item.description,
                    theme.grid_color,
                    Point::new(offset_x, bg_top + scale.px(px::DESCRIPTION_Y)),
                    label_end,
                    fade,
                );
            }

            report.rows.push(row);
        }

        if let Some(index) = active_preview
            && let Some(asset) = list.items()[index].preview.ready()
        {
            let pane_width = params.preview_width_px(scale);
            let mut preview_x = screen_width;
            if params.preview_bg {
                let pane_bg = res.surface(AssetId::PreviewBg);
                pane_bg.blit(
                    None,
                    screen,
                    Point::new(
                        screen_width - pane_bg.width() as i32,
                        scale.px(px::HEADER_HEIGHT),
                    ),
                );
                preview_x -= pane_bg.width() as i32;
            } else {
                preview_x -= pane_width as i32;
            }

            let fitted = preview::fit_to_pane(
                asset,
                pane_width,
                params.preview_stretch,
                params.preview_smoothing,
            );
            let pos = Point::new(
                preview_x + (pane_width as i32 - fitted.width() as i32) / 2,
                scale.px(px::PREVIEW_CENTER_Y) - fitted.height() as i32 / 2,
            );
            fitted.blit(None, screen, pos);
            report.preview = Some(PreviewReport {
                index,
                pos,
                size: fitted.size(),
                scaled: matches!(fitted, Cow::Owned(_)),
            });
        }

        trace!(
            "Frame {}: rows {:?}, {} live glyphs",
            frame,
            report.visible,
            self.cache.live_entries()
        );

        self.report = report;
        &self.report
    }

    /// Release every cached glyph surface
    pub fn shutdown(&mut self) -> usize {
        self.cache.log_stats();
        self.cache.clear()
    }

    /// Draw a cached label vertically centered on `anchor.y`, cropped so it
    /// ends before `label_end`. Returns where it was drawn.
    #[allow(clippy::too_many_arguments)]
    fn draw_label(
        &mut self,
        screen: &mut Surface,
        role: FontRole,
        text: &str,
        color: Rgb888,
        anchor: Point,
        label_end: i32,
        fade: Option<u8>,
    ) -> Option<Point> {
        let surface = self.cache.get_or_render(&mut self.fonts, role, text, color)?;
        let pos = Point::new(anchor.x, anchor.y - surface.height() as i32 / 2);
        let crop_width = (label_end - self.scale.px(px::LABEL_CROP_MARGIN)).max(0) as u32;
        surface.blit_alpha(
            Some(Rectangle::new(Point::zero(), Size::new(crop_width, surface.height()))),
            screen,
            pos,
            fade.unwrap_or(u8::MAX),
        );
        Some(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::list::PreviewSlot;
    use crate::ui::resources::{HIDDEN_ITEM_ALPHA, Palette, ThemeResources};
    use std::cell::Cell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    /// 8x16 pixels per byte, counts calls, can refuse specific strings
    #[derive(Default)]
    struct BlockFonts {
        calls: usize,
        refuse: Vec<String>,
    }

    impl FontRasterizer for BlockFonts {
        fn render_text(&mut self, role: FontRole, text: &str, color: Rgb888) -> Option<Surface> {
            self.calls += 1;
            if text.is_empty() || self.refuse.iter().any(|r| r == text) {
                return None;
            }
            let height = match role {
                FontRole::List => 16,
                FontRole::Hint => 12,
            };
            Some(Surface::filled(8 * text.len() as u32, height, color, 255))
        }
    }

    /// Every path "exists"; decodes to a fixed size and counts per path
    #[derive(Default)]
    struct CountingPreviews {
        decodes: Vec<PathBuf>,
        size: (u32, u32),
    }

    impl CountingPreviews {
        fn sized(width: u32, height: u32) -> Self {
            Self {
                decodes: Vec::new(),
                size: (width, height),
            }
        }

        fn count(&self, path: &str) -> usize {
            self.decodes.iter().filter(|p| *p == Path::new(path)).count()
        }
    }

    impl PreviewSource for CountingPreviews {
        fn exists(&self, _path: &Path) -> bool {
            true
        }

        fn decode(&mut self, path: &Path) -> Option<Surface> {
            self.decodes.push(path.to_path_buf());
            Some(Surface::filled(self.size.0, self.size.1, Rgb888::GREEN, 255))
        }
    }

    fn resources() -> ThemeResources {
        ThemeResources::placeholder(
            &Palette::default(),
            Size::new(640, 480),
            Scale::new(1.0),
            HIDDEN_ITEM_ALPHA,
        )
    }

    fn compositor() -> ListCompositor<BlockFonts> {
        ListCompositor::new(BlockFonts::default(), Scale::new(1.0))
    }

    fn screen() -> Surface {
        Surface::new(640, 480)
    }

    fn labels(count: usize) -> Vec<ListItem> {
        (0..count).map(|i| ListItem::label(format!("Row {}", i))).collect()
    }

    #[test]
    fn test_window_draws_exactly_the_visible_items() {
        let mut list = ListState::new(labels(10), ListVariant::Small).with_visible_rows(8);
        list.scroll_pos = 5;
        let res = resources();
        let mut comp = compositor();
        let mut previews = CountingPreviews::default();

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut previews);

        let drawn: Vec<usize> = report.rows.iter().map(|row| row.index).collect();
        assert_eq!(drawn, vec![5, 6, 7, 8, 9]);
        assert_eq!(report.visible, 5..10);
    }

    #[test]
    fn test_scroll_past_end_draws_nothing() {
        let mut list = ListState::new(labels(3), ListVariant::Large);
        list.scroll_pos = 7;
        let res = resources();
        let mut comp = compositor();

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());
        assert!(report.rows.is_empty());

        let mut empty = ListState::new(Vec::new(), ListVariant::Large).with_sticky(true);
        let report = comp.render_list(&mut screen(), &mut empty, &res, &mut CountingPreviews::default());
        assert!(report.rows.is_empty());
        assert!(report.sticky.is_none());
    }

    #[test]
    fn test_each_call_advances_the_clock_once() {
        let mut list = ListState::new(labels(4), ListVariant::Large);
        let res = resources();
        let mut comp = compositor();
        let mut previews = CountingPreviews::default();

        for expected in 1..=5 {
            let report = comp.render_list(&mut screen(), &mut list, &res, &mut previews);
            assert_eq!(report.frame, expected);
        }
        assert_eq!(comp.cache().frame(), 5);
    }

    #[test]
    fn test_labels_are_rasterized_once_across_frames() {
        let mut list = ListState::new(labels(4), ListVariant::Large);
        let res = resources();
        let mut comp = compositor();
        let mut previews = CountingPreviews::default();
        let mut frame = screen();

        comp.render_list(&mut frame, &mut list, &res, &mut previews);
        let after_first = comp.fonts().calls;
        for _ in 0..30 {
            comp.render_list(&mut frame, &mut list, &res, &mut previews);
        }

        assert_eq!(after_first, 4);
        assert_eq!(comp.fonts().calls, after_first);
        assert_eq!(comp.cache().stats().hits, 4 * 30);
    }

    #[test]
    fn test_toggle_glyph_follows_value_and_keeps_label_in_place() {
        let items = vec![ListItem::toggle("Wi-Fi", true), ListItem::label("About")];
        let mut list = ListState::new(items, ListVariant::Small);
        let res = resources();
        let toggle_width = res.surface(AssetId::ToggleOn).width() as i32;
        let mut comp = compositor();
        let mut previews = CountingPreviews::default();

        let first = comp
            .render_list(&mut screen(), &mut list, &res, &mut previews)
            .row(0)
            .cloned()
            .unwrap();
        let Widget::Toggle { on, faded, pos } = first.widget else {
            panic!("expected a toggle, got {:?}", first.widget);
        };
        assert!(on && !faded);
        assert_eq!(pos.x, 620 - toggle_width);
        assert_eq!(first.label_end, pos.x);

        list.items_mut()[0].value = 0;
        let second = comp
            .render_list(&mut screen(), &mut list, &res, &mut previews)
            .row(0)
            .cloned()
            .unwrap();
        assert!(matches!(second.widget, Widget::Toggle { on: false, .. }));
        assert_eq!(second.label, first.label);
        assert_eq!(second.label_end, first.label_end);
    }

    #[test]
    fn test_toggle_respects_display_scale() {
        let scale = Scale::new(1.5);
        let res = ThemeResources::placeholder(&Palette::default(), Size::new(960, 720), scale, HIDDEN_ITEM_ALPHA);
        let toggle_width = res.surface(AssetId::ToggleOn).width() as i32;
        let mut list = ListState::new(vec![ListItem::toggle("Sound", true)], ListVariant::Small);
        let mut comp = ListCompositor::new(BlockFonts::default(), scale);

        let report = comp.render_list(&mut Surface::new(960, 720), &mut list, &res, &mut CountingPreviews::default());
        let Widget::Toggle { pos, .. } = report.rows[0].widget else {
            panic!("expected a toggle");
        };
        assert_eq!(pos.x, scale.px(620.0) - toggle_width);
    }

    #[test]
    fn test_multivalue_layout() {
        let item = ListItem::multivalue("Speed", vec!["Slow".into(), "Fast".into()], 1);
        let mut list = ListState::new(vec![item], ListVariant::Small);
        let res = resources();
        let arrow = res.surface(AssetId::RightArrow).width() as i32;
        let mut comp = compositor();

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());
        let row = &report.rows[0];
        let Widget::MultiValue { left, right, value } = row.widget else {
            panic!("expected a multivalue widget");
        };

        assert_eq!(right.x, 640 - 20 - arrow);
        assert_eq!(left.x, right.x - 226 - arrow);
        assert_eq!(row.label_end, left.x);
        // "Fast" is 32px wide in the stub font, centered in the 226px box
        assert_eq!(value.unwrap().x, right.x - 113 - 16);
        assert!(comp.cache().contains(FontRole::List, "Fast", res.theme().list_color));
    }

    #[test]
    fn test_failed_value_label_still_draws_row_label() {
        let item = ListItem::multivalue("Speed", vec!["???".into()], 0);
        let mut list = ListState::new(vec![item], ListVariant::Small);
        let res = resources();
        let mut comp = ListCompositor::new(
            BlockFonts {
                refuse: vec!["???".into()],
                ..Default::default()
            },
            Scale::new(1.0),
        );

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());
        let row = &report.rows[0];
        assert!(matches!(row.widget, Widget::MultiValue { value: None, .. }));
        assert!(row.label.is_some());
    }

    #[test]
    fn test_icon_shifts_the_label() {
        let icon = Rc::new(Surface::filled(24, 24, Rgb888::WHITE, 255));
        let items = vec![
            ListItem::label("Games").with_icon(Rc::clone(&icon)),
            ListItem::label("Tiny").with_icon(Rc::new(Surface::new(1, 1))),
        ];
        let mut list = ListState::new(items, ListVariant::Small);
        let res = resources();
        let mut comp = compositor();

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());

        assert_eq!(report.rows[0].icon.unwrap().x, 20);
        assert_eq!(report.rows[0].label.unwrap().x, 20 + 24 + 17);
        // Icons narrower than 2px are ignored
        assert!(report.rows[1].icon.is_none());
        assert_eq!(report.rows[1].label.unwrap().x, 20);
        // The compositor only borrows the icon
        assert_eq!(Rc::strong_count(&icon), 2);
    }

    #[test]
    fn test_labels_center_on_row_geometry() {
        let mut list = ListState::new(labels(2), ListVariant::Small);
        let res = resources();
        let mut comp = compositor();

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());

        // Small rows: menu starts at 420 - 6 * 60 = 60, 4px divider padding,
        // label centered 27px below the background top
        assert_eq!(report.rows[0].top, 60);
        assert_eq!(report.rows[0].label.unwrap(), Point::new(20, 64 + 27 - 8));
        assert_eq!(report.rows[1].label.unwrap(), Point::new(20, 124 + 27 - 8));
    }

    #[test]
    fn test_descriptions_only_on_large_rows() {
        let item = || ListItem::label("Retroarch").with_description("Multi-system emulator");
        let res = resources();
        let mut comp = compositor();

        let mut large = ListState::new(vec![item()], ListVariant::Large);
        let report = comp.render_list(&mut screen(), &mut large, &res, &mut CountingPreviews::default());
        // 420 - 4 * 90 = 60, description centered 62px below the top
        assert_eq!(report.rows[0].description.unwrap(), Point::new(20, 60 + 62 - 6));
        assert!(comp.cache().contains(FontRole::Hint, "Multi-system emulator", res.theme().grid_color));

        let mut small = ListState::new(vec![item()], ListVariant::Small);
        let report = comp.render_list(&mut screen(), &mut small, &res, &mut CountingPreviews::default());
        assert!(report.rows[0].description.is_none());
    }

    #[test]
    fn test_disabled_rows_load_overlay_once_and_fade() {
        let items = vec![
            ListItem::toggle("Locked", true).disabled(false),
            ListItem::toggle("Shown", true).disabled(true),
        ];
        let mut list = ListState::new(items, ListVariant::Small);
        let res = resources();
        let mut comp = compositor();

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());
        assert!(report.overlay_requested);
        assert!(res.is_overlay_loaded());
        assert!(report.rows[0].shown_disabled);
        assert!(matches!(report.rows[0].widget, Widget::Toggle { faded: true, .. }));
        assert!(!report.rows[1].shown_disabled);
        assert!(matches!(report.rows[1].widget, Widget::Toggle { faded: false, .. }));
    }

    #[test]
    fn test_opaque_override_does_not_request_overlay() {
        let items = vec![ListItem::label("Shown").disabled(true), ListItem::label("Plain")];
        let mut list = ListState::new(items, ListVariant::Small);
        let res = resources();
        let mut comp = compositor();

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());
        assert!(!report.overlay_requested);
        assert!(!res.is_overlay_loaded());
    }

    #[test]
    fn test_hidden_disabled_item_outside_window_is_ignored() {
        let mut items = labels(10);
        items[9] = ListItem::label("Hidden").disabled(false);
        let mut list = ListState::new(items, ListVariant::Large);
        let res = resources();
        let mut comp = compositor();

        comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());
        assert!(!res.is_overlay_loaded());
    }

    #[test]
    fn test_disabled_fade_never_touches_cached_surface() {
        let items = vec![ListItem::label("Faded").disabled(false), ListItem::label("Faded")];
        let mut list = ListState::new(items, ListVariant::Small);
        let res = resources();
        let mut comp = compositor();
        let mut frame = screen();

        comp.render_list(&mut frame, &mut list, &res, &mut CountingPreviews::default());

        // Both rows share one cached surface, which stays fully opaque
        assert_eq!(comp.fonts().calls, 1);
        let color = res.theme().list_color;
        let mut fonts = BlockFonts::default();
        let cached = comp
            .cache
            .get_or_render(&mut fonts, FontRole::List, "Faded", color)
            .unwrap();
        assert_eq!(fonts.calls, 0);
        assert!(cached.image().pixels().all(|p| p.0[3] == 255));

        // The faded row is dimmer on screen than the opaque one
        let faded = comp.last_frame().rows[0].label.unwrap();
        let opaque = comp.last_frame().rows[1].label.unwrap();
        let faded_px = frame.pixel(faded.x + 1, faded.y + 1).unwrap();
        let opaque_px = frame.pixel(opaque.x + 1, opaque.y + 1).unwrap();
        assert!(faded_px[0] < opaque_px[0]);
    }

    #[test]
    fn test_failed_label_skips_only_that_label() {
        let items = vec![ListItem::toggle("", true)];
        let mut list = ListState::new(items, ListVariant::Small);
        let res = resources();
        let mut comp = compositor();

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());
        assert!(report.rows[0].label.is_none());
        assert!(matches!(report.rows[0].widget, Widget::Toggle { on: true, .. }));
    }

    #[test]
    fn test_sticky_row_uses_active_items_note() {
        let items = vec![
            ListItem::label("One").with_sticky_note("First note"),
            ListItem::label("Two").with_sticky_note("Second note"),
        ];
        let mut list = ListState::new(items, ListVariant::Small).with_sticky(true);
        list.select(1);
        let res = resources();
        let mut comp = compositor();

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());
        assert_eq!(report.sticky.unwrap(), Point::new(20, 60 + 27 - 8));
        assert!(comp.cache().contains(FontRole::List, "Second note", res.theme().list_color));
    }

    #[test]
    fn test_preview_decodes_once_while_active() {
        let items = vec![
            ListItem::label("Mario").with_preview("/previews/mario.png"),
            ListItem::label("Zelda").with_preview("/previews/zelda.png"),
        ];
        let mut list = ListState::new(items, ListVariant::Large);
        let res = resources();
        let mut comp = compositor();
        let mut previews = CountingPreviews::sized(200, 150);
        let mut frame = screen();

        for _ in 0..20 {
            let report = comp.render_list(&mut frame, &mut list, &res, &mut previews);
            assert_eq!(report.preview.unwrap().index, 0);
        }
        assert_eq!(previews.count("/previews/mario.png"), 1);
        assert_eq!(previews.count("/previews/zelda.png"), 0);

        list.select(1);
        comp.render_list(&mut frame, &mut list, &res, &mut previews);
        list.select(0);
        for _ in 0..5 {
            comp.render_list(&mut frame, &mut list, &res, &mut previews);
        }

        assert_eq!(previews.count("/previews/mario.png"), 1);
        assert_eq!(previews.count("/previews/zelda.png"), 1);
        // Both stay cached on their items
        assert!(list.items()[0].preview.ready().is_some());
        assert!(list.items()[1].preview.ready().is_some());
    }

    #[test]
    fn test_inactive_items_never_decode() {
        let items = vec![
            ListItem::label("A"),
            ListItem::label("B").with_preview("/previews/b.png"),
        ];
        let mut list = ListState::new(items, ListVariant::Large);
        let res = resources();
        let mut comp = compositor();
        let mut previews = CountingPreviews::sized(10, 10);

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut previews);
        assert!(report.preview.is_none());
        assert!(previews.decodes.is_empty());
        assert!(list.items()[1].preview.is_empty());
    }

    #[test]
    fn test_wide_preview_is_scaled_into_the_pane() {
        let items = vec![ListItem::label("Box art").with_preview("/previews/wide.png")];
        let mut list = ListState::new(items, ListVariant::Large);
        let res = resources();
        let pane_bg_width = res.surface(AssetId::PreviewBg).width() as i32;
        let mut comp = compositor();
        let mut previews = CountingPreviews::sized(500, 300);

        let report = comp.render_list(&mut screen(), &mut list, &res, &mut previews);
        let preview = report.preview.unwrap();

        assert!(preview.scaled);
        assert_eq!(preview.size, Size::new(250, 150));
        assert_eq!(preview.pos, Point::new(640 - pane_bg_width, 240 - 75));
        // The cached original keeps its decode resolution
        let cached = list.items()[0].preview.ready().unwrap();
        assert_eq!((cached.width(), cached.height()), (500, 300));
    }

    #[test]
    fn test_preview_without_pane_background_anchors_on_width() {
        let items = vec![ListItem::label("Small art").with_preview("/previews/small.png")];
        let mut list = ListState::new(items, ListVariant::Large);
        let res = resources();
        let mut comp = compositor();
        let mut previews = CountingPreviews::sized(100, 80);

        let mut params = RenderParams::standard(res.background(), Scale::new(1.0));
        params.preview_bg = false;

        let report = comp.render_list_custom(&mut screen(), &mut list, &res, &mut previews, &params);
        let preview = report.preview.unwrap();
        assert!(!preview.scaled);
        assert_eq!(preview.pos, Point::new(640 - 250 + (250 - 100) / 2, 240 - 40));

        params.preview_stretch = true;
        params.preview_smoothing = true;
        let report = comp.render_list_custom(&mut screen(), &mut list, &res, &mut previews, &params);
        let preview = report.preview.unwrap();
        assert!(preview.scaled);
        assert_eq!(preview.size, Size::new(250, 200));
        assert_eq!(previews.decodes.len(), 1);
    }

    #[test]
    fn test_failed_preview_retries_on_next_activation() {
        /// Missing files, then broken ones; counts each kind of attempt
        #[derive(Default)]
        struct Flaky {
            checks: Cell<usize>,
            decodes: usize,
            present: bool,
        }
        impl PreviewSource for Flaky {
            fn exists(&self, _path: &Path) -> bool {
                self.checks.set(self.checks.get() + 1);
                self.present
            }
            fn decode(&mut self, _path: &Path) -> Option<Surface> {
                self.decodes += 1;
                None
            }
        }

        let items = vec![
            ListItem::label("Gone").with_preview("/previews/gone.png"),
            ListItem::label("Other"),
        ];
        let mut list = ListState::new(items, ListVariant::Large);
        let res = resources();
        let mut comp = compositor();
        let mut source = Flaky::default();

        for _ in 0..4 {
            let report = comp.render_list(&mut screen(), &mut list, &res, &mut source);
            assert!(report.preview.is_none());
        }
        assert_eq!(source.checks.get(), 1);
        assert!(matches!(list.items()[0].preview, PreviewSlot::Failed));

        // Away and back: exactly one more lookup, then quiet again
        list.select(1);
        comp.render_list(&mut screen(), &mut list, &res, &mut source);
        assert!(list.items()[0].preview.is_empty());
        list.select(0);
        for _ in 0..4 {
            comp.render_list(&mut screen(), &mut list, &res, &mut source);
        }
        assert_eq!(source.checks.get(), 2);
        assert_eq!(source.decodes, 0);
        assert!(matches!(list.items()[0].preview, PreviewSlot::Failed));

        // The file shows up but will not decode: one decode per activation
        source.present = true;
        list.select(1);
        list.select(0);
        for _ in 0..4 {
            comp.render_list(&mut screen(), &mut list, &res, &mut source);
        }
        assert_eq!(source.checks.get(), 3);
        assert_eq!(source.decodes, 1);
        assert!(matches!(list.items()[0].preview, PreviewSlot::Failed));
    }

    #[test]
    fn test_background_is_blitted_into_the_list_area() {
        let mut list = ListState::new(Vec::new(), ListVariant::Large);
        let res = resources();
        let backdrop = Surface::filled(640, 480, Rgb888::RED, 255);
        let mut params = RenderParams::standard(Some(&backdrop), Scale::new(1.0));
        params.show_dividers = false;
        let mut comp = compositor();
        let mut frame = screen();

        comp.render_list_custom(&mut frame, &mut list, &res, &mut CountingPreviews::default(), &params);

        assert_eq!(frame.pixel(10, 100), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(10, 10), Some([0, 0, 0, 0]));
        assert_eq!(frame.pixel(10, 430), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_stretch_mode_spreads_rows() {
        let mut list = ListState::new(labels(5), ListVariant::Large).with_visible_rows(5);
        let res = resources();
        let mut params = RenderParams::standard(res.background(), Scale::new(1.0));
        params.stretch_y = true;
        let mut comp = compositor();

        let report = comp.render_list_custom(&mut screen(), &mut list, &res, &mut CountingPreviews::default(), &params);

        // 350 / 5 = 70px per row
        let tops: Vec<i32> = report.rows.iter().map(|row| row.top).collect();
        assert_eq!(tops.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>(), vec![70; 4]);
    }

    #[test]
    fn test_oversized_window_still_draws_every_item() {
        let res = resources();
        let mut comp = compositor();

        for stretch_y in [false, true] {
            for rows in [40_000_000, usize::MAX] {
                let mut list = ListState::new(labels(3), ListVariant::Large).with_visible_rows(rows);
                let mut params = RenderParams::standard(res.background(), Scale::new(1.0));
                params.stretch_y = stretch_y;

                let report = comp.render_list_custom(
                    &mut screen(),
                    &mut list,
                    &res,
                    &mut CountingPreviews::default(),
                    &params,
                );

                let drawn: Vec<usize> = report.rows.iter().map(|row| row.index).collect();
                assert_eq!(drawn, vec![0, 1, 2]);
                assert_eq!(report.visible, 0..3);
            }
        }
    }

    #[test]
    fn test_shutdown_releases_glyphs() {
        let mut list = ListState::new(labels(3), ListVariant::Large);
        let res = resources();
        let mut comp = compositor();

        comp.render_list(&mut screen(), &mut list, &res, &mut CountingPreviews::default());
        assert_eq!(comp.shutdown(), 3);
        assert_eq!(comp.cache().live_entries(), 0);
    }
}
