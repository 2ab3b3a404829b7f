//! Application configuration for marksync.
//!
//! User config lives at `~/.marksync/marksync.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! Secrets never live in the file: it only names the environment variables
//! that hold them. Everything is resolved once at process start and handed to
//! the extractor and spreadsheet client constructors.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MarksyncError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "marksync.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".marksync";

// ---------------------------------------------------------------------------
// Config structs (matching marksync.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model-assisted extraction settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Spreadsheet service settings.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Where raw documents come from.
    #[serde(default)]
    pub source: SourceConfig,
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for field extraction.
    #[serde(default = "default_model")]
    pub model: String,

    /// Chat-completions endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Ceiling for one extraction call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Only this many leading characters of a document are sent.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_prompt_chars: default_max_prompt_chars(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "anthropic/claude-3.5-sonnet".into()
}
fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_prompt_chars() -> usize {
    3000
}

/// `[sheets]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Name of the env var holding the service-account key file path.
    #[serde(default = "default_credentials_env")]
    pub credentials_env: String,

    /// Key file looked up in the working directory when the env var is unset.
    #[serde(default = "default_credentials_file")]
    pub default_credentials_file: String,

    /// Sheets API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Ceiling for each remote sheet call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub write_timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            credentials_env: default_credentials_env(),
            default_credentials_file: default_credentials_file(),
            api_base: default_api_base(),
            write_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_credentials_env() -> String {
    "GOOGLE_APPLICATION_CREDENTIALS".into()
}
fn default_credentials_file() -> String {
    "service-account.json".into()
}
fn default_api_base() -> String {
    "https://sheets.googleapis.com".into()
}

/// Which source adapter feeds the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Fixed five-sample demo set.
    #[default]
    Demo,
    /// Every `.html`/`.htm`/`.txt` file in a directory.
    Files,
}

/// `[source]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Document directory for [`SourceKind::Files`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.marksync/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MarksyncError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.marksync/marksync.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MarksyncError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| MarksyncError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MarksyncError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| MarksyncError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MarksyncError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

// ---------------------------------------------------------------------------
// Secret resolution
// ---------------------------------------------------------------------------

/// Read the extraction API key, if any.
///
/// A missing or empty key is not an error: it routes every document to the
/// fallback extractor.
pub fn resolve_api_key(config: &OpenRouterConfig) -> Option<String> {
    std::env::var(&config.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Locate the service-account key file.
///
/// The env var named by `credentials_env` wins; otherwise the default file
/// name is looked up relative to the working directory.
pub fn resolve_credentials_path(config: &SheetsConfig) -> Result<PathBuf> {
    let from_env = std::env::var(&config.credentials_env).ok();
    credentials_path_from(
        &config.credentials_env,
        from_env.as_deref(),
        Path::new(&config.default_credentials_file),
    )
}

fn credentials_path_from(
    var_name: &str,
    from_env: Option<&str>,
    default_file: &Path,
) -> Result<PathBuf> {
    match from_env.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => {
            let path = PathBuf::from(value);
            if !path.exists() {
                return Err(MarksyncError::config(format!(
                    "Service account file not found at: {}",
                    path.display()
                )));
            }
            Ok(path)
        }
        None if default_file.exists() => Ok(default_file.to_path_buf()),
        None => Err(MarksyncError::config(format!(
            "{var_name} environment variable not set and no {} found",
            default_file.display()
        ))),
    }
}
