use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "menu-compositor")]
#[command(version)]
#[command(about = "Headless list compositor for launcher menus", long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Menu document to render (a demo menu is used when omitted)
    #[arg(short, long)]
    pub menu: Option<PathBuf>,

    /// Number of frames to render (overrides config)
    #[arg(short, long)]
    pub frames: Option<u32>,

    /// Display scale multiplier (overrides config)
    #[arg(short, long, value_parser = parse_scale)]
    pub scale: Option<f64>,

    /// Write the last frame to this PNG file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a default config file to the given path and exit
    #[arg(long)]
    pub generate_config: Option<PathBuf>,
}

/// Positive, finite scale factor
fn parse_scale(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(scale) if scale.is_finite() && scale > 0.0 => Ok(scale),
        _ => Err(format!("Invalid scale '{}': expected a positive number", s)),
    }
}
