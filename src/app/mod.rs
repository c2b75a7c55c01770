pub mod cli;
pub mod config;
pub mod host;
pub mod logging;
pub mod menu;

pub use config::Config;
pub use host::{FrameStats, Host};
pub use menu::MenuDocument;
