//! Configuration module.
//!
//! Handles loading, validating, and merging an `imprint.toml` file. Stock
//! defaults are overridden by whatever keys the user file sets; everything
//! else keeps its default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [canvas]
//! background = "white"      # Fill for new canvases (name or #hex)
//! format = "png"            # Output format when none can be inferred
//!
//! [text]
//! # font = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
//! size = 32.0               # Glyph height in pixels
//! color = "black"           # Fill colour
//! # stroke_color = "white"  # Outline colour
//! stroke_width = 0          # Outline thickness in pixels (0 = none, max 64)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Color, Drawer, MAX_STROKE_WIDTH, is_writable_format};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `imprint.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImprintConfig {
    /// Defaults for freshly created canvases and exports.
    pub canvas: CanvasConfig,
    /// Default text style.
    pub text: TextConfig,
}

impl ImprintConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_color("canvas.background", &self.canvas.background)?;
        if !is_writable_format(&self.canvas.format) {
            return Err(ConfigError::Validation(format!(
                "canvas.format '{}' is not a writable image format",
                self.canvas.format
            )));
        }
        if !(self.text.size > 0.0 && self.text.size.is_finite()) {
            return Err(ConfigError::Validation(
                "text.size must be a positive number".into(),
            ));
        }
        parse_color("text.color", &self.text.color)?;
        if let Some(stroke) = &self.text.stroke_color {
            parse_color("text.stroke_color", stroke)?;
        }
        check_stroke_width(self.text.stroke_width)?;
        Ok(())
    }
}

fn check_stroke_width(width: u32) -> Result<(), ConfigError> {
    if width > MAX_STROKE_WIDTH {
        return Err(ConfigError::Validation(format!(
            "text.stroke_width {width} exceeds the maximum of {MAX_STROKE_WIDTH}"
        )));
    }
    Ok(())
}

fn parse_color(key: &str, value: &str) -> Result<Color, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{key} '{value}' is not a color")))
}

/// Canvas defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Fill colour for new canvases.
    pub background: String,
    /// Output format used when neither a flag nor a file extension decides.
    pub format: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background: crate::imaging::DEFAULT_BACKGROUND.to_string(),
            format: "png".to_string(),
        }
    }
}

/// Default text style.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Font file. Required before any text can be drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    /// Glyph height in pixels.
    pub size: f32,
    /// Fill colour.
    pub color: String,
    /// Outline colour; no outline when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Outline thickness in pixels.
    pub stroke_width: u32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font: None,
            size: 32.0,
            color: "black".to_string(),
            stroke_color: None,
            stroke_width: 0,
        }
    }
}

impl TextConfig {
    /// Build a [`Drawer`] from this section.
    ///
    /// Fails when no font is configured or a colour does not parse.
    pub fn drawer(&self) -> Result<Drawer, ConfigError> {
        let font = self.font.as_ref().ok_or_else(|| {
            ConfigError::Validation("text.font is not set; pass --font or add it to the config".into())
        })?;
        check_stroke_width(self.stroke_width)?;
        let mut drawer =
            Drawer::new(font, self.size).with_fill(parse_color("text.color", &self.color)?);
        if let Some(stroke) = &self.stroke_color {
            drawer = drawer.with_stroke(
                parse_color("text.stroke_color", stroke)?,
                self.stroke_width,
            );
        }
        Ok(drawer)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ImprintConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ImprintConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ImprintConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<ImprintConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `imprint.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Imprint Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Canvas
# ---------------------------------------------------------------------------
[canvas]
# Fill colour for `imprint create`. CSS names (white, black, navy, ...) or
# hex (#rgb, #rgba, #rrggbb, #rrggbbaa).
background = "white"

# Output format when neither --format nor the output file extension decides.
# One of: png, jpeg, gif, webp, tiff, avif.
format = "png"

# ---------------------------------------------------------------------------
# Text
# ---------------------------------------------------------------------------
[text]
# TrueType/OpenType font used by `imprint text`. Required for text; there is
# no built-in font.
# font = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"

# Glyph height in pixels.
size = 32.0

# Fill colour.
color = "black"

# Outline colour and thickness. No outline unless stroke_color is set and
# stroke_width is above zero. stroke_width is at most 64.
# stroke_color = "white"
stroke_width = 0
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ImprintConfig::default();
        assert_eq!(config.canvas.background, "white");
        assert_eq!(config.canvas.format, "png");
        assert_eq!(config.text.size, 32.0);
        assert_eq!(config.text.color, "black");
        assert_eq!(config.text.font, None);
        assert_eq!(config.text.stroke_width, 0);
    }

    #[test]
    fn default_config_is_valid() {
        ImprintConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[text]
color = "#fafafa"
"##;
        let config: ImprintConfig = toml::from_str(toml).unwrap();
        // Overridden value
        assert_eq!(config.text.color, "#fafafa");
        // Default values preserved
        assert_eq!(config.text.size, 32.0);
        assert_eq!(config.canvas.background, "white");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("imprint.toml")).unwrap();

        assert_eq!(config.canvas.background, "white");
        assert_eq!(config.canvas.format, "png");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("imprint.toml");

        fs::write(
            &config_path,
            r##"
[canvas]
background = "#123456"
format = "jpeg"

[text]
font = "/fonts/Inter.ttf"
stroke_color = "white"
stroke_width = 2
"##,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.canvas.background, "#123456");
        assert_eq!(config.canvas.format, "jpeg");
        assert_eq!(config.text.font, Some(PathBuf::from("/fonts/Inter.ttf")));
        assert_eq!(config.text.stroke_width, 2);
        // Unspecified values should be defaults
        assert_eq!(config.text.color, "black");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("imprint.toml");

        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = load_config(&config_path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let toml = r##"
[canvas]
backgroud = "white"
"##;
        let result: Result<ImprintConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result = resolve_config(Some(toml::from_str("[watermark]\nopacity = 0.5").unwrap()));
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    #[test]
    fn bad_background_rejected() {
        let mut config = ImprintConfig::default();
        config.canvas.background = "#zzz".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("canvas.background")
        ));
    }

    #[test]
    fn bad_format_rejected() {
        let mut config = ImprintConfig::default();
        config.canvas.format = "xcf".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("canvas.format")
        ));
    }

    #[test]
    fn non_positive_text_size_rejected() {
        let mut config = ImprintConfig::default();
        config.text.size = 0.0;
        assert!(config.validate().is_err());
        config.text.size = -4.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_stroke_color_rejected() {
        let mut config = ImprintConfig::default();
        config.text.stroke_color = Some("glitter".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("text.stroke_color")
        ));
    }

    #[test]
    fn oversized_stroke_width_rejected() {
        let mut config = ImprintConfig::default();
        config.text.stroke_width = MAX_STROKE_WIDTH;
        config.validate().unwrap();

        config.text.stroke_width = MAX_STROKE_WIDTH + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("text.stroke_width")
        ));
    }

    // =========================================================================
    // drawer tests
    // =========================================================================

    #[test]
    fn drawer_requires_font() {
        let result = TextConfig::default().drawer();
        assert!(matches!(result, Err(ConfigError::Validation(msg)) if msg.contains("text.font")));
    }

    #[test]
    fn drawer_from_config() {
        let text = TextConfig {
            font: Some(PathBuf::from("/fonts/a.ttf")),
            size: 18.0,
            color: "#ff0000".to_string(),
            stroke_color: Some("black".to_string()),
            stroke_width: 3,
        };
        let drawer = text.drawer().unwrap();
        assert_eq!(drawer.font, PathBuf::from("/fonts/a.ttf"));
        assert_eq!(drawer.size, 18.0);
        assert_eq!(drawer.fill, Color([255, 0, 0, 255]));
        assert_eq!(drawer.stroke_width(), 3);
    }

    #[test]
    fn drawer_rejects_oversized_stroke() {
        let text = TextConfig {
            font: Some(PathBuf::from("/fonts/a.ttf")),
            stroke_color: Some("white".to_string()),
            stroke_width: u32::MAX / 2 + 1,
            ..TextConfig::default()
        };
        assert!(matches!(
            text.drawer(),
            Err(ConfigError::Validation(msg)) if msg.contains("text.stroke_width")
        ));
    }

    #[test]
    fn drawer_without_stroke_color_has_no_stroke() {
        let text = TextConfig {
            font: Some(PathBuf::from("/fonts/a.ttf")),
            stroke_width: 5,
            ..TextConfig::default()
        };
        assert_eq!(text.drawer().unwrap().stroke, None);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[text]
size = 32.0
color = "black"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[text]
color = "red"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["text"]["size"].as_float(), Some(32.0));
        assert_eq!(merged["text"]["color"].as_str(), Some("red"));
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: ImprintConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = ImprintConfig::default();
        assert_eq!(config.canvas.background, defaults.canvas.background);
        assert_eq!(config.canvas.format, defaults.canvas.format);
        assert_eq!(config.text.size, defaults.text.size);
        assert_eq!(config.text.color, defaults.text.color);
        assert_eq!(config.text.stroke_width, defaults.text.stroke_width);
        config.validate().unwrap();
    }
}
