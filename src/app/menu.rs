//! Menu documents: the TOML description of a list screen.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use color_eyre::eyre::WrapErr;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::app::config::ListConfig;
use crate::ui::list::{ItemKind, ListItem, ListState, ListVariant};
use crate::ui::surface::Surface;

/// Used when no menu document is given
const DEMO_MENU: &str = r#"
sticky = true

[[items]]
label = "Games"
description = "Browse installed systems"
sticky_note = "Press A to open"

[[items]]
label = "Wi-Fi"
description = "Wireless networking"
kind = "toggle"
value = 1
sticky_note = "Toggle with A"

[[items]]
label = "Bluetooth"
description = "Not available on this device"
kind = "toggle"
disabled = true
sticky_note = "Unavailable"

[[items]]
label = "Screen brightness"
kind = "multivalue"
values = ["Low", "Medium", "High", "Maximum"]
value = 2
sticky_note = "Left/right to change"

[[items]]
label = "Sleep after"
kind = "multivalue"
values = ["Never", "1 minute", "5 minutes", "15 minutes"]
value = 1

[[items]]
label = "Developer options"
description = "Locked by the administrator"
disabled = true
show_opaque = true

[[items]]
label = "About"
description = "Version and storage information"
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSize {
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Label,
    Toggle,
    Multivalue,
}

impl From<EntryKind> for ItemKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Label => ItemKind::Label,
            EntryKind::Toggle => ItemKind::Toggle,
            EntryKind::Multivalue => ItemKind::MultiValue,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuEntry {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: EntryKind,
    #[serde(default)]
    pub value: usize,
    /// Labels for multivalue entries
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub icon: Option<PathBuf>,
    #[serde(default)]
    pub preview: Option<PathBuf>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub show_opaque: bool,
    #[serde(default)]
    pub sticky_note: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuDocument {
    #[serde(default)]
    pub sticky: bool,
    /// Row height, overriding `[list] small_rows`
    #[serde(default)]
    pub rows: Option<RowSize>,
    #[serde(default)]
    pub visible_rows: Option<usize>,
    #[serde(default)]
    pub items: Vec<MenuEntry>,
    /// Directory relative paths resolve against
    #[serde(skip)]
    base_dir: PathBuf,
}

impl MenuDocument {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read menu {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let document = Self::parse(&contents, base_dir)
            .wrap_err_with(|| format!("Failed to parse menu {}", path.display()))?;
        info!(
            "Loaded menu {} with {} items",
            path.display(),
            document.items.len()
        );
        Ok(document)
    }

    pub fn parse(contents: &str, base_dir: PathBuf) -> color_eyre::Result<Self> {
        let mut document: MenuDocument = toml::from_str(contents)?;
        document.base_dir = base_dir;
        Ok(document)
    }

    pub fn demo() -> Self {
        toml::from_str(DEMO_MENU).unwrap_or_default()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Build the list model. Icons are decoded here, once per distinct path.
    pub fn into_list_state(self, list: &ListConfig) -> ListState {
        let variant = match self.rows {
            Some(RowSize::Small) => ListVariant::Small,
            Some(RowSize::Large) => ListVariant::Large,
            None => list.variant(),
        };
        let visible_rows = self
            .visible_rows
            .or(list.visible_rows)
            .unwrap_or_else(|| variant.default_visible_rows());

        let mut icons: HashMap<PathBuf, Option<Rc<Surface>>> = HashMap::new();
        let items = self
            .items
            .iter()
            .map(|entry| {
                let icon = entry.icon.as_deref().and_then(|path| {
                    let path = self.resolve(path);
                    icons.entry(path).or_insert_with_key(|path| load_icon(path)).clone()
                });
                ListItem {
                    label: entry.label.clone(),
                    description: entry.description.clone(),
                    kind: entry.kind.into(),
                    value: entry.value,
                    value_labels: entry.values.clone(),
                    icon,
                    preview_path: entry.preview.as_deref().map(|path| self.resolve(path)),
                    disabled: entry.disabled,
                    show_opaque: entry.show_opaque,
                    sticky_note: entry.sticky_note.clone(),
                    ..Default::default()
                }
            })
            .collect();

        debug!(
            "Menu list: {:?} rows, {} visible, sticky {}",
            variant, visible_rows, self.sticky
        );

        ListState::new(items, variant)
            .with_visible_rows(visible_rows)
            .with_sticky(self.sticky)
    }
}

fn load_icon(path: &Path) -> Option<Rc<Surface>> {
    match image::open(path) {
        Ok(image) => Some(Rc::new(Surface::from_image(image.into_rgba8()))),
        Err(e) => {
            warn!("Failed to load icon {}: {}", path.display(), e);
            None
        }
    }
}
