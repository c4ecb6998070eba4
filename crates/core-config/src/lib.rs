//! Adapter-owned configuration: §4.F's `left-margin`, `right-margin`,
//! `disable-hyphenation`, and `disable-color` keys, plus the context used
//! to clamp margins to the current screen width.
//!
//! Programmatic `parse_config_parameter` calls always win over whatever a
//! config file set at startup load time — the file only seeds initial
//! values.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid margin value: {0}")]
    InvalidMargin(String),
    #[error("invalid boolean value: {0}")]
    InvalidBool(String),
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct MarginSection {
    #[serde(default)]
    left: u16,
    #[serde(default)]
    right: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    margin: MarginSection,
    #[serde(default)]
    disable_hyphenation: bool,
    #[serde(default)]
    disable_color: bool,
}

/// The four adapter-owned configuration keys from §4.F, after merging
/// config-file defaults with any `parse_config_parameter` overrides and
/// clamping margins to the current screen width.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub left_margin: u16,
    pub right_margin: u16,
    pub disable_hyphenation: bool,
    pub disable_color: bool,
}

/// Screen geometry the margins must fit inside.
#[derive(Debug, Clone, Copy)]
pub struct ConfigContext {
    pub xsize: u16,
}

impl ConfigContext {
    pub fn new(xsize: u16) -> Self {
        Self { xsize }
    }
}

impl Config {
    pub const KEYS: [&'static str; 4] = [
        "left-margin",
        "right-margin",
        "disable-hyphenation",
        "disable-color",
    ];

    /// Clamp `left_margin + right_margin` to less than `xsize`; forced to
    /// zero on both sides when they would consume all usable width (the
    /// §8 boundary behaviour "zero-width content column (margins too
    /// wide) ⇒ both margins forced to 0").
    pub fn apply_context(&mut self, ctx: ConfigContext) {
        if self.left_margin as u32 + self.right_margin as u32 >= ctx.xsize as u32 {
            tracing::info!(
                target: "config",
                xsize = ctx.xsize,
                left = self.left_margin,
                right = self.right_margin,
                "margins_forced_to_zero"
            );
            self.left_margin = 0;
            self.right_margin = 0;
        }
    }

    /// `parse_config_parameter(key, value)` from §6: returns `Ok(())` for
    /// a recognised, well-formed adapter key; `Err` otherwise, at which
    /// point the caller forwards the key to the backend.
    pub fn parse_config_parameter(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "left-margin" => {
                self.left_margin = parse_margin(value)?;
                Ok(())
            }
            "right-margin" => {
                self.right_margin = parse_margin(value)?;
                Ok(())
            }
            "disable-hyphenation" => {
                self.disable_hyphenation = parse_bool_key(value)?;
                Ok(())
            }
            "disable-color" => {
                self.disable_color = parse_bool_key(value)?;
                Ok(())
            }
            "enable-color" => {
                self.disable_color = !parse_bool_key(value)?;
                Ok(())
            }
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    pub fn get_config_value(&self, key: &str) -> Option<String> {
        match key {
            "left-margin" => Some(self.left_margin.to_string()),
            "right-margin" => Some(self.right_margin.to_string()),
            "disable-hyphenation" => Some(self.disable_hyphenation.to_string()),
            "disable-color" => Some(self.disable_color.to_string()),
            _ => None,
        }
    }

    pub fn get_config_option_names() -> &'static [&'static str] {
        &Self::KEYS
    }

    fn from_file(file: ConfigFile) -> Self {
        Self {
            left_margin: file.margin.left,
            right_margin: file.margin.right,
            disable_hyphenation: file.disable_hyphenation,
            disable_color: file.disable_color,
        }
    }
}

fn parse_margin(value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidMargin(value.to_string()))
}

/// Accepts an empty value as `true` (a bare boolean flag), plus the
/// literal strings `"true"`/`"false"`.
fn parse_bool_key(value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ConfigError::InvalidBool(other.to_string())),
    }
}

/// Expand a single `$(HOME)` occurrence, as the config layer is required
/// to do for values it passes through (§6).
pub fn substitute_home(value: &str) -> String {
    match dirs::home_dir() {
        Some(home) => value.replace("$(HOME)", &home.to_string_lossy()),
        None => value.to_string(),
    }
}

/// Locate the config file: a `zscreen.toml` in the current directory
/// takes precedence over the platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("zscreen.toml");
    if local.is_file() {
        return local;
    }
    dirs::config_dir()
        .map(|d| d.join("zscreen").join("zscreen.toml"))
        .unwrap_or(local)
}

/// Load configuration from `path`, or from `discover()` if `None`.
/// Falls back to defaults (logged at `warn`) rather than failing the
/// whole adapter over an unparseable or missing config file.
pub fn load_from(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(discover);
    match load_file(&path) {
        Ok(file) => Config::from_file(file),
        Err(e) => {
            tracing::warn!(target: "config", path = %path.display(), error = %e, "config_load_failed_using_defaults");
            Config::default()
        }
    }
}

fn load_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.is_file() {
        return Ok(ConfigFile::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margins_clamp_to_zero_when_too_wide() {
        let mut cfg = Config {
            left_margin: 40,
            right_margin: 40,
            ..Default::default()
        };
        cfg.apply_context(ConfigContext::new(60));
        assert_eq!(cfg.left_margin, 0);
        assert_eq!(cfg.right_margin, 0);
    }

    #[test]
    fn margins_preserved_when_they_fit() {
        let mut cfg = Config {
            left_margin: 2,
            right_margin: 2,
            ..Default::default()
        };
        cfg.apply_context(ConfigContext::new(80));
        assert_eq!(cfg.left_margin, 2);
        assert_eq!(cfg.right_margin, 2);
    }

    #[test]
    fn parses_bare_boolean_flag_as_true() {
        let mut cfg = Config::default();
        cfg.parse_config_parameter("disable-hyphenation", "").unwrap();
        assert!(cfg.disable_hyphenation);
    }

    #[test]
    fn unknown_key_is_forwarded() {
        let mut cfg = Config::default();
        let err = cfg
            .parse_config_parameter("some-backend-key", "x")
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load_from(Some(PathBuf::from("/nonexistent/zscreen.toml")));
        assert_eq!(cfg.left_margin, 0);
    }

    #[test]
    fn loads_margins_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zscreen.toml");
        std::fs::write(&path, "disable_color = true\n[margin]\nleft = 2\nright = 3\n").unwrap();
        let cfg = load_from(Some(path));
        assert_eq!(cfg.left_margin, 2);
        assert_eq!(cfg.right_margin, 3);
        assert!(cfg.disable_color);
    }

    #[test]
    fn home_substitution_replaces_token() {
        if let Some(home) = dirs::home_dir() {
            let expanded = substitute_home("$(HOME)/saves");
            assert!(expanded.starts_with(&home.to_string_lossy().to_string()));
        }
    }
}
