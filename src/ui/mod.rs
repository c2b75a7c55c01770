pub mod compositor;
pub mod glyph_cache;
pub mod layout;
pub mod list;
pub mod preview;
pub mod rasterizer;
pub mod resources;
pub mod surface;

pub use compositor::{FrameReport, ListCompositor, RowReport, Widget};
pub use glyph_cache::GlyphCache;
pub use layout::{RenderParams, Scale};
pub use list::{ItemKind, ListItem, ListState, ListVariant, PreviewSlot};
pub use preview::{FsPreviewSource, PreviewSource};
pub use rasterizer::{FontRasterizer, FontRole, ProFontRasterizer};
pub use resources::{AssetId, Resources, Theme, ThemeResources};
pub use surface::Surface;
