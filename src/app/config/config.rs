use crate::app::config::display::DisplayConfig;
use crate::app::config::host::HostConfig;
use crate::app::config::list::ListConfig;
use crate::app::config::logging::LoggingConfig;
use crate::app::config::theme::ThemeConfig;
use color_eyre::eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Known keys per section, used for unknown-option warnings
const KNOWN_FIELDS: &[(&str, &[&str])] = &[
    ("display", &["width", "height", "scale", "frame_budget_ms"]),
    (
        "theme",
        &[
            "path",
            "list_color",
            "grid_color",
            "background",
            "highlight",
            "hidden_item_alpha",
        ],
    ),
    (
        "list",
        &[
            "show_dividers",
            "stretch_y",
            "preview_bg",
            "preview_stretch",
            "preview_width",
            "preview_smoothing",
            "small_rows",
            "visible_rows",
        ],
    ),
    ("host", &["frames", "select_every"]),
    (
        "logging",
        &[
            "enabled",
            "level",
            "log_to_console",
            "append_to_file",
            "rotate_logs",
            "rotation_size_mb",
            "keep_log_files",
            "custom_log_path",
        ],
    ),
];

/// Edit distance between two strings, single-row dynamic programming
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }

    row[b.len()]
}

/// Closest candidate within half the longer string's length (at least 3 edits)
fn find_similar<'a>(unknown: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let unknown_lower = unknown.to_lowercase();

    candidates
        .iter()
        .map(|&candidate| {
            let distance = levenshtein_distance(&unknown_lower, &candidate.to_lowercase());
            (candidate, distance)
        })
        .filter(|(candidate, distance)| {
            *distance <= (unknown.len().max(candidate.len()) / 2).max(3)
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

fn unknown_section_warning(key: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("Unknown config section: [{}] (did you mean: [{}]?)", key, s),
        None => format!("Unknown config section: [{}]", key),
    }
}

fn unknown_key_warning(section: &str, key: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!(
            "Unknown option in [{}]: {} (did you mean: {}?)",
            section, key, s
        ),
        None => format!("Unknown option in [{}]: {}", section, key),
    }
}

impl Config {
    /// `config.toml` under the platform config directory
    pub fn default_config_path() -> color_eyre::Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| eyre!("Could not determine config directory"))?;
        Ok(config_dir.join("menu-compositor").join("config.toml"))
    }

    /// Load the config, writing a default file first if none exists.
    ///
    /// Returns the config plus warnings to be logged once logging is up.
    pub fn load(config_path: Option<PathBuf>) -> color_eyre::Result<(Self, Vec<String>)> {
        let config_path = match config_path {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            let config = Config::default();
            config.write_to(&config_path)?;
            eprintln!("Created default config file at: {}", config_path.display());
            return Ok((config, Vec::new()));
        }

        let contents = std::fs::read_to_string(&config_path)
            .wrap_err_with(|| format!("Failed to read config {}", config_path.display()))?;
        Ok(Self::parse(&contents))
    }

    /// Parse config text, falling back to defaults if it does not deserialize
    pub fn parse(contents: &str) -> (Self, Vec<String>) {
        let mut warnings = Self::check_unknown_fields(contents);

        let config = toml::from_str(contents).unwrap_or_else(|e| {
            warnings.push(format!("Failed to parse config file, using defaults: {}", e));
            Config::default()
        });
        (config, warnings)
    }

    fn check_unknown_fields(contents: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        // Syntax errors are reported by the main parse
        let Ok(table) = toml::from_str::<toml::Table>(contents) else {
            return warnings;
        };

        let sections: Vec<&str> = KNOWN_FIELDS.iter().map(|(name, _)| *name).collect();

        for (key, value) in &table {
            let Some((section, fields)) = KNOWN_FIELDS.iter().find(|(name, _)| name == key) else {
                let suggestion = find_similar(key, &sections);
                warnings.push(unknown_section_warning(key, suggestion));
                continue;
            };

            if let toml::Value::Table(entries) = value {
                for field in entries.keys() {
                    if !fields.contains(&field.as_str()) {
                        let suggestion = find_similar(field, fields);
                        warnings.push(unknown_key_warning(section, field, suggestion));
                    }
                }
            }
        }

        warnings
    }

    fn write_to(&self, path: &Path) -> color_eyre::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)
            .wrap_err_with(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Generate a default config file at `path`; refuses to overwrite
    pub fn generate_default(path: PathBuf) -> color_eyre::Result<()> {
        if path.exists() {
            return Err(eyre!("Config file already exists at: {}", path.display()));
        }

        Config::default().write_to(&path)?;
        println!("Generated default config at: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("menu-compositor-config-{}-{}", name, std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("scale", "scale"), 0);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let (config, warnings) = Config::parse("");
        assert!(warnings.is_empty());
        assert_eq!(config.display.width, 640);
        assert_eq!(config.display.frame_budget_ms, 16);
        assert_eq!(config.theme.hidden_item_alpha, 60);
        assert_eq!(config.list.preview_width, 250);
        assert!(config.list.show_dividers && config.list.preview_bg);
        assert_eq!(config.host.frames, 600);
        assert_eq!(config.host.select_every, 30);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let (config, warnings) = Config::parse(
            r#"
            [display]
            scale = 1.5

            [list]
            small_rows = true
            visible_rows = 5
            "#,
        );
        assert!(warnings.is_empty());
        assert_eq!(config.display.scale().factor(), 1.5);
        assert_eq!(config.display.height, 480);
        assert_eq!(config.list.visible_rows, Some(5));
        assert_eq!(config.list.variant(), crate::ui::list::ListVariant::Small);
    }

    #[test]
    fn test_unknown_keys_warn_with_suggestions() {
        let (_, warnings) = Config::parse(
            r#"
            [displya]
            width = 1

            [list]
            show_divider = false
            banana = 3
            "#,
        );
        assert_eq!(warnings.len(), 3);
        assert!(warnings.contains(&"Unknown config section: [displya] (did you mean: [display]?)".to_string()));
        assert!(warnings.contains(&"Unknown option in [list]: show_divider (did you mean: show_dividers?)".to_string()));
        assert!(warnings.iter().any(|w| w.starts_with("Unknown option in [list]: banana")));
    }

    #[test]
    fn test_bad_types_fall_back_to_defaults() {
        let (config, warnings) = Config::parse("[display]\nwidth = \"wide\"\n");
        assert_eq!(config.display.width, 640);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_list_section_builds_render_params() {
        let list = ListConfig {
            show_dividers: false,
            preview_width: 0,
            ..Default::default()
        };
        let params = list.render_params(None, crate::ui::layout::Scale::new(1.0));
        assert!(!params.show_dividers);
        assert_eq!(params.preview_width, 1);
        assert_eq!(params.pos.y, 60);
    }

    #[test]
    fn test_load_creates_default_file() {
        let path = temp_path("load");
        std::fs::remove_file(&path).ok();

        let (config, warnings) = Config::load(Some(path.clone())).unwrap();
        assert!(warnings.is_empty());
        assert!(path.exists());
        assert_eq!(config.display.width, 640);

        // Round trip through the written file
        let (reloaded, warnings) = Config::load(Some(path.clone())).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(reloaded.theme.list_color, "#FFFFFF");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_generate_default_refuses_overwrite() {
        let path = temp_path("generate");
        std::fs::remove_file(&path).ok();

        Config::generate_default(path.clone()).unwrap();
        assert!(Config::generate_default(path.clone()).is_err());

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
