//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.cvai/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ProviderKind;
use crate::inference::providers::{gemini, openrouter};
use crate::render::TemplateKind;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CvaiConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gemini: ProviderConfig,
    #[serde(default)]
    pub openrouter: ProviderConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub default_template: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ExportConfig {
    pub output_dir: Option<String>,
    pub font_dir: Option<String>,
    pub font_family: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-3-flash-preview";
pub const DEFAULT_FONT_DIR: &str = "fonts";
pub const DEFAULT_FONT_FAMILY: &str = "NotoSans";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: ProviderKind,
    pub model_name: String,
    pub max_output_tokens: u32,
    pub request_timeout: Duration,
    pub template: TemplateKind,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub output_dir: PathBuf,
    pub font_dir: PathBuf,
    pub font_family: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.cvai/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".cvai").join("config.toml"))
}

/// Load config from `~/.cvai/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CvaiConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CvaiConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CvaiConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<CvaiConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(CvaiConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: CvaiConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", redacted(&config));
    Ok(config)
}

/// Debug view of the config with API keys masked.
fn redacted(config: &CvaiConfig) -> String {
    let mask = |key: &Option<String>| key.as_ref().map(|_| "***");
    format!(
        "general={:?}, gemini.api_key={:?}, openrouter.api_key={:?}, export={:?}",
        config.general,
        mask(&config.gemini.api_key),
        mask(&config.openrouter.api_key),
        config.export
    )
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# cvai Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# default_provider = "gemini"        # "gemini" or "open-router"
# default_model = "gemini-3-flash-preview"
# max_output_tokens = 4000
# request_timeout_secs = 120
# default_template = "arabic"        # "arabic", "english" or "plain"

# [gemini]
# api_key = "..."                    # Or set GEMINI_API_KEY (or API_KEY)
# base_url = "https://generativelanguage.googleapis.com/v1beta"

# [openrouter]
# api_key = "sk-or-..."              # Or set OPENROUTER_API_KEY
# base_url = "https://openrouter.ai/api/v1"

# [export]
# output_dir = "."
# font_dir = "fonts"                 # Must hold <family>-Regular.ttf, -Bold.ttf, -Italic.ttf, -BoldItalic.ttf
# font_family = "NotoSans"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Looks up an environment variable, treating empty values as unset.
fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_provider(value: &str) -> Option<ProviderKind> {
    let parsed = ProviderKind::from_str(value, true).ok();
    if parsed.is_none() {
        warn!("Unknown provider '{}', falling back to default", value);
    }
    parsed
}

fn parse_template(value: &str) -> Option<TemplateKind> {
    let parsed = TemplateKind::from_str(value, true).ok();
    if parsed.is_none() {
        warn!("Unknown template '{}', falling back to default", value);
    }
    parsed
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_provider` and `cli_model` are from CLI flags (None = not specified).
pub fn resolve(config: &CvaiConfig, cli_provider: Option<ProviderKind>, cli_model: Option<&str>) -> ResolvedConfig {
    // Provider: CLI → env → config → default
    let provider = cli_provider
        .or_else(|| env("CVAI_PROVIDER").as_deref().and_then(parse_provider))
        .or_else(|| config.general.default_provider.as_deref().and_then(parse_provider))
        .unwrap_or_default();

    // Model: CLI → env → config → provider default
    let model_name = cli_model
        .map(|s| s.to_string())
        .or_else(|| env("CVAI_MODEL"))
        .or_else(|| config.general.default_model.clone())
        .unwrap_or_else(|| match provider {
            ProviderKind::Gemini => DEFAULT_GEMINI_MODEL.to_string(),
            ProviderKind::OpenRouter => DEFAULT_OPENROUTER_MODEL.to_string(),
        });

    // Gemini API key: env → config
    let gemini_api_key = env("GEMINI_API_KEY")
        .or_else(|| env("API_KEY"))
        .or_else(|| config.gemini.api_key.clone());

    let gemini_base_url = env("GEMINI_BASE_URL")
        .or_else(|| config.gemini.base_url.clone())
        .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string());

    // OpenRouter API key: env → config
    let openrouter_api_key = env("OPENROUTER_API_KEY").or_else(|| config.openrouter.api_key.clone());

    let openrouter_base_url = env("OPENROUTER_BASE_URL")
        .or_else(|| config.openrouter.base_url.clone())
        .unwrap_or_else(|| openrouter::DEFAULT_BASE_URL.to_string());

    let template = config
        .general
        .default_template
        .as_deref()
        .and_then(parse_template)
        .unwrap_or_default();

    ResolvedConfig {
        provider,
        model_name,
        max_output_tokens: config
            .general
            .max_output_tokens
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
        request_timeout: Duration::from_secs(
            config
                .general
                .request_timeout_secs
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        template,
        gemini_api_key,
        gemini_base_url,
        openrouter_api_key,
        openrouter_base_url,
        output_dir: PathBuf::from(config.export.output_dir.as_deref().unwrap_or(".")),
        font_dir: PathBuf::from(config.export.font_dir.as_deref().unwrap_or(DEFAULT_FONT_DIR)),
        font_family: config
            .export
            .font_family
            .clone()
            .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
    }
}
