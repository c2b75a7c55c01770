//! List model consumed by the compositor: items, their lazily loaded preview
//! images, and the scroll window / selection state.

use std::borrow::Cow;
use std::ops::Range;
use std::path::PathBuf;
use std::rc::Rc;

use crate::ui::surface::Surface;

/// Row widget kind. The set is closed, so the compositor branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemKind {
    #[default]
    Label,
    /// On when `value == 1`
    Toggle,
    /// `value` indexes `value_labels`
    MultiValue,
}

/// Row height variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListVariant {
    Small,
    #[default]
    Large,
}

impl ListVariant {
    /// Rows that fit the standard list area
    pub fn default_visible_rows(self) -> usize {
        match self {
            ListVariant::Small => 6,
            ListVariant::Large => 4,
        }
    }
}

/// Item-owned cache of a decoded preview image
#[derive(Debug, Default)]
pub enum PreviewSlot {
    /// Not attempted since the item was last activated
    #[default]
    Empty,
    Ready(Surface),
    /// The last attempt found no file or could not decode it
    Failed,
}

impl PreviewSlot {
    pub fn ready(&self) -> Option<&Surface> {
        match self {
            PreviewSlot::Ready(surface) => Some(surface),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PreviewSlot::Empty)
    }
}

/// A single row
#[derive(Debug, Default)]
pub struct ListItem {
    pub label: String,
    pub description: String,
    pub kind: ItemKind,
    pub value: usize,
    /// Display strings for multivalue items
    pub value_labels: Vec<String>,
    /// Shared, read-only icon; the compositor never drops the asset itself
    pub icon: Option<Rc<Surface>>,
    pub preview_path: Option<PathBuf>,
    /// Filled on first activation, torn down only with the item
    pub preview: PreviewSlot,
    pub disabled: bool,
    /// Draw a disabled item at full opacity anyway
    pub show_opaque: bool,
    /// Shown in the sticky row while this item is active
    pub sticky_note: String,
}

impl ListItem {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn toggle(label: impl Into<String>, on: bool) -> Self {
        Self {
            label: label.into(),
            kind: ItemKind::Toggle,
            value: usize::from(on),
            ..Default::default()
        }
    }

    pub fn multivalue(label: impl Into<String>, values: Vec<String>, value: usize) -> Self {
        Self {
            label: label.into(),
            kind: ItemKind::MultiValue,
            value,
            value_labels: values,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: Rc<Surface>) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_preview(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview_path = Some(path.into());
        self
    }

    pub fn with_sticky_note(mut self, note: impl Into<String>) -> Self {
        self.sticky_note = note.into();
        self
    }

    pub fn disabled(mut self, show_opaque: bool) -> Self {
        self.disabled = true;
        self.show_opaque = show_opaque;
        self
    }

    /// Disabled and not overridden to draw opaque
    #[inline]
    pub fn shown_disabled(&self) -> bool {
        self.disabled && !self.show_opaque
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.value == 1
    }

    /// Text drawn in a multivalue item's value box
    pub fn value_label(&self) -> Cow<'_, str> {
        match self.value_labels.get(self.value) {
            Some(label) => Cow::Borrowed(label.as_str()),
            None => Cow::Owned(self.value.to_string()),
        }
    }
}

/// Items plus scroll window and selection
#[derive(Debug)]
pub struct ListState {
    items: Vec<ListItem>,
    /// First item in the window
    pub scroll_pos: usize,
    /// Window height in rows
    pub scroll_height: usize,
    active_pos: usize,
    pub variant: ListVariant,
    /// Pin a sticky row above the window
    pub has_sticky: bool,
}

impl ListState {
    pub fn new(items: Vec<ListItem>, variant: ListVariant) -> Self {
        Self {
            items,
            scroll_pos: 0,
            scroll_height: variant.default_visible_rows(),
            active_pos: 0,
            variant,
            has_sticky: false,
        }
    }

    pub fn with_visible_rows(mut self, rows: usize) -> Self {
        self.scroll_height = rows.max(1);
        self
    }

    pub fn with_sticky(mut self, sticky: bool) -> Self {
        self.has_sticky = sticky;
        self
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [ListItem] {
        &mut self.items
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn active_pos(&self) -> usize {
        self.active_pos
    }

    pub fn active_item(&self) -> Option<&ListItem> {
        self.items.get(self.active_pos)
    }

    /// Item indices inside the scroll window, clipped to the item count
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.scroll_pos.min(self.items.len());
        let end = self
            .scroll_pos
            .saturating_add(self.scroll_height)
            .min(self.items.len());
        start..end
    }

    /// Move the selection, scrolling just enough to keep it visible.
    ///
    /// A failed preview attempt on the previously active item is forgotten
    /// so its next activation tries again.
    pub fn select(&mut self, index: usize) {
        if self.items.is_empty() {
            return;
        }
        let index = index.min(self.items.len() - 1);
        if index != self.active_pos
            && let Some(previous) = self.items.get_mut(self.active_pos)
            && matches!(previous.preview, PreviewSlot::Failed)
        {
            previous.preview = PreviewSlot::Empty;
        }
        self.active_pos = index;

        let rows = self.scroll_height.max(1);
        if index < self.scroll_pos {
            self.scroll_pos = index;
        } else if index >= self.scroll_pos.saturating_add(rows) {
            self.scroll_pos = index + 1 - rows;
        }
    }

    /// Select the next item, wrapping to the top
    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let next = if self.active_pos + 1 >= self.items.len() {
            0
        } else {
            self.active_pos + 1
        };
        self.select(next);
    }

    /// Select the previous item, wrapping to the bottom
    pub fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let prev = if self.active_pos == 0 {
            self.items.len() - 1
        } else {
            self.active_pos - 1
        };
        self.select(prev);
    }
}
