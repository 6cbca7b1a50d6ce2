use anyhow::{Context, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::path::PathBuf;

use crate::theme::{apply_overrides, Theme, ThemeOverrides};

#[derive(Debug, Clone)]
pub struct DiffselConfig {
    pub theme: Theme,
    pub unified: Option<bool>,
    pub ignore_whitespace: Option<bool>,
    pub context_lines: Option<usize>,
    pub tab_size: Option<usize>,
    /// Quiet period before a selection change is resolved.
    pub debounce_ms: Option<u64>,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    /// Why the config file was ignored, reported once logging is up.
    pub load_error: Option<String>,
}

impl Default for DiffselConfig {
    fn default() -> Self {
        Self {
            theme: Theme::from_name("one-dark"),
            unified: None,
            ignore_whitespace: None,
            context_lines: None,
            tab_size: None,
            debounce_ms: None,
            log_level: LevelFilter::Info,
            log_file: None,
            load_error: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    colors: Option<ThemeOverrides>,
    #[serde(default)]
    unified: Option<bool>,
    #[serde(default)]
    ignore_whitespace: Option<bool>,
    #[serde(default)]
    context_lines: Option<usize>,
    #[serde(default)]
    tab_size: Option<usize>,
    #[serde(default)]
    debounce_ms: Option<u64>,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    log_file: Option<PathBuf>,
}

fn config_path() -> PathBuf {
    let mut path = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("diffsel");
    path.push("config.toml");
    path
}

/// Default log destination; the terminal itself belongs to the UI.
pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("diffsel.log")
}

/// Parse the contents of a config file.
pub fn parse_config(contents: &str) -> Result<DiffselConfig> {
    let file: ConfigFile = toml::from_str(contents).context("Invalid config file")?;

    let theme_name = file.theme.as_deref().unwrap_or("one-dark");
    let mut theme = Theme::from_name(theme_name);
    if let Some(ref overrides) = file.colors {
        apply_overrides(&mut theme, overrides);
    }

    let log_level = match file.log_level.as_deref() {
        Some(level) => level
            .parse::<LevelFilter>()
            .ok()
            .with_context(|| format!("Unknown log level: {level}"))?,
        None => LevelFilter::Info,
    };

    Ok(DiffselConfig {
        theme,
        unified: file.unified,
        ignore_whitespace: file.ignore_whitespace,
        context_lines: file.context_lines,
        tab_size: file.tab_size.filter(|&w| w > 0),
        debounce_ms: file.debounce_ms,
        log_level,
        log_file: file.log_file,
        load_error: None,
    })
}

/// Load config from `~/.config/diffsel/config.toml`, falling back to
/// defaults when it is missing or invalid.
pub fn load_config() -> DiffselConfig {
    let path = config_path();
    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return DiffselConfig::default(),
    };
    parse_config(&contents).unwrap_or_else(|e| DiffselConfig {
        load_error: Some(format!("{}: {e:#}", path.display())),
        ..DiffselConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.theme.name, "one-dark");
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.unified, None);
        assert_eq!(config.debounce_ms, None);
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r##"
            theme = "dracula"
            unified = true
            context_lines = 5
            tab_size = 2
            debounce_ms = 25
            log_level = "debug"
            log_file = "/tmp/x.log"

            [colors]
            selection_bg = "#102030"
            "##,
        )
        .unwrap();
        assert_eq!(config.theme.name, "dracula");
        assert_eq!(config.theme.selection_bg, Color::Rgb(16, 32, 48));
        assert_eq!(config.unified, Some(true));
        assert_eq!(config.context_lines, Some(5));
        assert_eq!(config.tab_size, Some(2));
        assert_eq!(config.debounce_ms, Some(25));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/x.log")));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(parse_config("log_level = \"loud\"").is_err());
        assert!(parse_config("unified = \"yes\"").is_err());
        assert!(parse_config("agents = []").is_err());
    }

    #[test]
    fn test_zero_tab_size_is_ignored() {
        assert_eq!(parse_config("tab_size = 0").unwrap().tab_size, None);
    }
}
