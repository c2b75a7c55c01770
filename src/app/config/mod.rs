pub mod config;
pub mod display;
pub mod host;
pub mod list;
pub mod logging;
pub mod theme;

pub use config::Config;
pub use display::DisplayConfig;
pub use host::HostConfig;
pub use list::ListConfig;
pub use logging::LoggingConfig;
pub use theme::ThemeConfig;
