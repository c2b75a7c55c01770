//! List compositor for launcher menus.
//!
//! `ui` holds the render core: surfaces, the glyph surface cache, lazy item
//! previews and the per-frame list compositor. `app` holds the host side:
//! configuration, logging, menu documents and the headless frame loop that
//! the binary drives.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod app;
pub mod ui;
