//! Lazy preview images for the active row.
//!
//! A decoded preview lives in its item's [`PreviewSlot`] at decode
//! resolution for as long as the item does. Drawing it at a different size
//! goes through a transient scaled copy that is dropped right after the blit.

use std::borrow::Cow;
use std::path::Path;

use log::{debug, warn};

use crate::ui::list::{ListItem, PreviewSlot};
use crate::ui::surface::Surface;

/// Filesystem check and image decoder collaborator
pub trait PreviewSource {
    fn exists(&self, path: &Path) -> bool;

    /// Decode `path`, or `None` if it is not a readable image
    fn decode(&mut self, path: &Path) -> Option<Surface>;
}

/// Decodes previews from disk with the `image` crate
#[derive(Debug, Default)]
pub struct FsPreviewSource {
    decoded: u64,
    failed: u64,
}

impl FsPreviewSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get decode statistics (decoded, failed)
    pub fn stats(&self) -> (u64, u64) {
        (self.decoded, self.failed)
    }
}

impl PreviewSource for FsPreviewSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn decode(&mut self, path: &Path) -> Option<Surface> {
        match image::open(path) {
            Ok(image) => {
                self.decoded += 1;
                let surface = Surface::from_image(image.into_rgba8());
                debug!(
                    "Decoded preview {} ({}x{})",
                    path.display(),
                    surface.width(),
                    surface.height()
                );
                Some(surface)
            }
            Err(e) => {
                self.failed += 1;
                warn!("Failed to decode preview {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Fill `item`'s preview slot if it has not been attempted yet.
///
/// Items without a preview path stay `Empty`. A missing file or a decode
/// failure marks the slot `Failed` until the item is activated again.
pub fn resolve<'a, P>(item: &'a mut ListItem, source: &mut P) -> Option<&'a Surface>
where
    P: PreviewSource + ?Sized,
{
    if item.preview.is_empty() {
        let path = item
            .preview_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())?;

        item.preview = if !source.exists(path) {
            debug!("Preview {} does not exist", path.display());
            PreviewSlot::Failed
        } else {
            match source.decode(path) {
                Some(surface) => PreviewSlot::Ready(surface),
                None => PreviewSlot::Failed,
            }
        };
    }
    item.preview.ready()
}

/// The preview as it should be drawn in a pane `pane_width` pixels wide.
///
/// Borrows the cached original when no scaling is needed, otherwise returns
/// a new scaled copy owned by the caller.
pub fn fit_to_pane(
    asset: &Surface,
    pane_width: u32,
    stretch: bool,
    smoothing: bool,
) -> Cow<'_, Surface> {
    let pane_width = pane_width.max(1);
    let width = asset.width().max(1);

    if width > pane_width || (stretch && width < pane_width) {
        let factor = pane_width as f64 / width as f64;
        Cow::Owned(asset.scaled(factor, factor, smoothing))
    } else {
        Cow::Borrowed(asset)
    }
}
