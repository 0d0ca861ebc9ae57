//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root next to the JSON documents; every key is optional and
//! overrides the stock default.
//!
//! ## Configuration Options
//!
//! ```toml
//! [site]
//! url = "https://example.com"   # Canonical URL, used for SEO tags and sitemap
//! title = "Jane Doe"            # <title>; defaults to the profile name when empty
//! description = ""              # Meta description; defaults to the profile bio
//! keywords = []
//! locale = "en_US"
//! og_image = "/og-image.jpg"
//! twitter_handle = ""           # e.g. "@janedoe"
//! theme_color = "#0f172a"
//! default_theme = "dark"        # "light" or "dark"
//! # google_verification = "..."
//!
//! [typewriter]
//! titles = ["Software Engineer"]
//! type_delay_ms = 100
//! delete_delay_ms = 50
//! pause_ms = 2000
//!
//! [contact]
//! endpoint = "/api/contact"
//!
//! [colors.light]               # and [colors.dark]
//! background = "#f8fafc"
//! ...
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! relay_url = "https://api.web3forms.com/submit"
//! access_key_env = "WEB3FORMS_ACCESS_KEY"
//! relay_timeout_secs = 10
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::typewriter::{Delays, TypewriterError};
use crate::ui::Theme;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// SEO metadata and page-level settings.
    pub site: SiteMeta,
    /// Rotating hero title.
    pub typewriter: TypewriterConfig,
    /// Contact form wiring.
    pub contact: ContactConfig,
    /// Color schemes for light and dark themes.
    pub colors: ColorConfig,
    /// Relay server settings (`folio serve`).
    pub server: ServerConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.site.url.starts_with("https://") || self.site.url.starts_with("http://")) {
            return Err(ConfigError::Validation(
                "site.url must be an absolute http(s) URL".into(),
            ));
        }
        if !self.contact.endpoint.starts_with('/') {
            return Err(ConfigError::Validation(
                "contact.endpoint must be a path starting with '/'".into(),
            ));
        }
        match Delays::from(&self.typewriter).check() {
            Ok(()) if self.typewriter.titles.is_empty() => {
                return Err(ConfigError::Validation(
                    TypewriterError::NoTitles.to_string(),
                ));
            }
            Ok(()) => {}
            Err(e) => return Err(ConfigError::Validation(format!("typewriter: {e}"))),
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            )));
        }
        if self.server.relay_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "server.relay_timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// SEO metadata and page-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    /// Canonical site URL; also the Open Graph URL and sitemap location.
    pub url: String,
    /// Document title. Empty means "use the profile name".
    pub title: String,
    /// Meta description. Empty means "use the profile bio".
    pub description: String,
    pub keywords: Vec<String>,
    /// Open Graph locale.
    pub locale: String,
    /// Share image path or URL (1200×630).
    pub og_image: String,
    /// Twitter `creator` handle, including the `@`.
    pub twitter_handle: String,
    /// Browser chrome color (`<meta name="theme-color">`).
    pub theme_color: String,
    /// Theme used when the visitor has no stored or system preference.
    pub default_theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_verification: Option<String>,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            url: "https://example.com".to_string(),
            title: String::new(),
            description: String::new(),
            keywords: Vec::new(),
            locale: "en_US".to_string(),
            og_image: "/og-image.jpg".to_string(),
            twitter_handle: String::new(),
            theme_color: "#0f172a".to_string(),
            default_theme: Theme::Dark,
            google_verification: None,
        }
    }
}

/// Rotating hero title settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypewriterConfig {
    /// Titles in display order; the cycle wraps after the last one.
    pub titles: Vec<String>,
    pub type_delay_ms: u64,
    pub delete_delay_ms: u64,
    /// Pause once a title is fully typed.
    pub pause_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            titles: vec!["Software Engineer".to_string()],
            type_delay_ms: 100,
            delete_delay_ms: 50,
            pause_ms: 2000,
        }
    }
}

/// Contact form wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    /// Path the form posts to. `folio serve` mounts the relay here.
    pub endpoint: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: "/api/contact".to_string(),
        }
    }
}

/// Relay server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
    /// Email-delivery provider endpoint (Web3Forms-compatible).
    pub relay_url: String,
    /// Name of the environment variable holding the provider access key.
    /// The key itself never goes in `config.toml`.
    pub access_key_env: String,
    /// Timeout for the outbound provider request.
    pub relay_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            relay_url: "https://api.web3forms.com/submit".to_string(),
            access_key_env: "WEB3FORMS_ACCESS_KEY".to_string(),
            relay_timeout_secs: 10,
        }
    }
}

/// Color configuration for light and dark themes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Card and input background.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Secondary text (periods, captions, labels).
    pub text_muted: String,
    pub border: String,
    /// Accent for the active nav item and links.
    pub accent: String,
    pub success: String,
    pub error: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#f8fafc".to_string(),
            surface: "#ffffff".to_string(),
            text: "#0f172a".to_string(),
            text_muted: "#475569".to_string(),
            border: "#e2e8f0".to_string(),
            accent: "#2563eb".to_string(),
            success: "#15803d".to_string(),
            error: "#b91c1c".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#020617".to_string(),
            surface: "#1e293b".to_string(),
            text: "#f1f5f9".to_string(),
            text_muted: "#94a3b8".to_string(),
            border: "#334155".to_string(),
            accent: "#60a5fa".to_string(),
            success: "#86efac".to_string(),
            error: "#fca5a5".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_dark()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    // SiteConfig holds only strings, integers, arrays and tables.
    toml::Value::try_from(SiteConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Site metadata (SEO, social cards)
# ---------------------------------------------------------------------------
[site]
# Canonical URL of the deployed site. Used for canonical/Open Graph tags,
# robots.txt and sitemap.xml.
url = "https://example.com"

# Document title. Empty = the profile name.
title = ""

# Meta description. Empty = the profile description.
description = ""

keywords = []

# Open Graph locale.
locale = "en_US"

# Social share image (1200x630), path or absolute URL.
og_image = "/og-image.jpg"

# Twitter handle for the card's creator tag, e.g. "@janedoe".
twitter_handle = ""

# Browser chrome color.
theme_color = "#0f172a"

# Theme when the visitor has no saved choice and no system preference:
# "light" or "dark".
default_theme = "dark"

# Search console verification token.
# google_verification = ""

# ---------------------------------------------------------------------------
# Rotating hero title
# ---------------------------------------------------------------------------
[typewriter]
titles = ["Software Engineer"]

# Milliseconds per typed character, per deleted character, and the pause
# once a title is complete. Must satisfy delete < type < pause.
type_delay_ms = 100
delete_delay_ms = 50
pause_ms = 2000

# ---------------------------------------------------------------------------
# Contact form
# ---------------------------------------------------------------------------
[contact]
# Path the form posts to. `folio serve` mounts the relay here.
endpoint = "/api/contact"

# ---------------------------------------------------------------------------
# Colors - Light theme
# ---------------------------------------------------------------------------
[colors.light]
background = "#f8fafc"
surface = "#ffffff"
text = "#0f172a"
text_muted = "#475569"
border = "#e2e8f0"
accent = "#2563eb"
success = "#15803d"
error = "#b91c1c"

# ---------------------------------------------------------------------------
# Colors - Dark theme
# ---------------------------------------------------------------------------
[colors.dark]
background = "#020617"
surface = "#1e293b"
text = "#f1f5f9"
text_muted = "#94a3b8"
border = "#334155"
accent = "#60a5fa"
success = "#86efac"
error = "#fca5a5"

# ---------------------------------------------------------------------------
# Relay server (folio serve)
# ---------------------------------------------------------------------------
[server]
bind = "127.0.0.1:3000"

# Email-delivery provider (Web3Forms-compatible API).
relay_url = "https://api.web3forms.com/submit"

# Environment variable holding the provider access key.
access_key_env = "WEB3FORMS_ACCESS_KEY"

# Timeout for the outbound provider request, in seconds.
relay_timeout_secs = 10
"##
}

fn color_vars(scheme: &ColorScheme, indent: &str) -> String {
    [
        ("bg", &scheme.background),
        ("surface", &scheme.surface),
        ("text", &scheme.text),
        ("text-muted", &scheme.text_muted),
        ("border", &scheme.border),
        ("accent", &scheme.accent),
        ("success", &scheme.success),
        ("error", &scheme.error),
    ]
    .iter()
    .map(|(name, value)| format!("{indent}--color-{name}: {value};"))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Generate CSS custom properties for both themes.
///
/// The theme is chosen by the `data-theme` attribute on `<html>`, which the
/// page script sets from the stored choice or the system preference.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root,\n:root[data-theme=\"light\"] {{\n{light}\n}}\n\n:root[data-theme=\"dark\"] {{\n{dark}\n}}",
        light = color_vars(&colors.light, "    "),
        dark = color_vars(&colors.dark, "    "),
    )
}
