use crate::app::config::LoggingConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "menu-compositor";

/// Start the file logger described by `config`.
///
/// The returned handle must stay alive for as long as records should be
/// written.
pub fn init_logger(config: &LoggingConfig) -> Result<LoggerHandle, FlexiLoggerError> {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug.max(config.level_filter())
    } else {
        config.level_filter()
    };

    let mut logger = Logger::try_with_str(level.as_str().to_lowercase())?
        .log_to_file(
            FileSpec::default()
                .directory(log_directory(config))
                .basename(APP_DIR)
                .suppress_timestamp(),
        )
        .format_for_files(log_format)
        .use_utc();

    if config.append_to_file {
        logger = logger.append();
    }

    if config.rotate_logs {
        logger = logger.rotate(
            Criterion::Size(config.rotation_size_mb.max(1) * 1024 * 1024),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(config.keep_log_files as usize),
        );
    }

    if config.log_to_console {
        logger = logger.duplicate_to_stdout(flexi_logger::Duplicate::All);
    }

    let handle = logger.start()?;
    log::info!("Logger initialized with level: {}", level);
    log::info!("Log file location: {}", log_file_path(config).display());

    Ok(handle)
}

/// Platform data directory, or the configured override
pub fn log_directory(config: &LoggingConfig) -> PathBuf {
    if let Some(path) = &config.custom_log_path {
        return path.clone();
    }
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs")
}

pub fn log_file_path(config: &LoggingConfig) -> PathBuf {
    log_directory(config).join(format!("{}.log", APP_DIR))
}

/// `timestamp [LEVEL] [file:line] message`
fn log_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} [{}] [{}:{}] {}",
        now.now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.args()
    )
}

pub fn ensure_log_directory(config: &LoggingConfig) -> color_eyre::Result<()> {
    let log_dir = log_directory(config);
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)?;
    }
    Ok(())
}

pub fn log_startup_info(config: &LoggingConfig) {
    log::info!("=== menu-compositor starting ===");
    log::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    log::info!("OS: {}", std::env::consts::OS);
    log::info!("Architecture: {}", std::env::consts::ARCH);
    log::info!("Log file: {}", log_file_path(config).display());
}

pub fn log_shutdown_info() {
    log::info!("=== menu-compositor shutting down ===");
}

pub fn log_config_loading(config_path: &Path, created: bool) {
    if created {
        log::info!("Created default config file at: {}", config_path.display());
    } else {
        log::info!("Loaded config file from: {}", config_path.display());
    }
}
