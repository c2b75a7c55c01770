use clap::Parser;
use menu_compositor::app::cli::Args;
use menu_compositor::app::{Config, Host, MenuDocument, logging};
use menu_compositor::ui::{FsPreviewSource, ListCompositor, ProFontRasterizer, ThemeResources};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    if let Some(path) = &args.generate_config {
        let config_path = if path.is_dir() {
            path.join("config.toml")
        } else {
            path.clone()
        };
        Config::generate_default(config_path)?;
        return Ok(());
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };
    let config_existed = config_path.exists();

    let (mut config, config_warnings) = Config::load(Some(config_path.clone()))?;
    if let Some(scale) = args.scale {
        config.display.scale = scale;
    }
    if let Some(frames) = args.frames {
        config.host.frames = frames;
    }

    // Kept alive until exit so buffered records are flushed
    let _logger = if config.logging.enabled {
        logging::ensure_log_directory(&config.logging)?;
        let handle = logging::init_logger(&config.logging)?;
        logging::log_startup_info(&config.logging);
        logging::log_config_loading(&config_path, !config_existed);
        Some(handle)
    } else {
        None
    };
    for warning in &config_warnings {
        log::warn!("{}", warning);
    }

    let scale = config.display.scale();
    let resources = ThemeResources::load(
        config.theme.path.as_deref(),
        &config.theme.palette(),
        config.display.screen_size(),
        scale,
        config.theme.hidden_item_alpha,
    )?;

    let document = match &args.menu {
        Some(path) => MenuDocument::load(path)?,
        None => {
            log::info!("No menu given, rendering the demo menu");
            MenuDocument::demo()
        }
    };
    let list = document.into_list_state(&config.list);

    let compositor = ListCompositor::new(ProFontRasterizer::for_scale(scale), scale);
    let mut host = Host::new(compositor, resources, FsPreviewSource::new(), list, &config);

    let stats = host.run(config.host.frames);
    let (decoded, failed) = host.previews().stats();
    log::info!("Previews decoded: {}, failed: {}", decoded, failed);

    let result = match &args.output {
        Some(path) => host.save_frame(path),
        None => Ok(()),
    };

    host.shutdown();
    println!(
        "Rendered {} frames, avg {:?}, {} over budget",
        stats.frames,
        stats.average(),
        stats.over_budget
    );

    if config.logging.enabled {
        logging::log_shutdown_info();
    }
    result
}
