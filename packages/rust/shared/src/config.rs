//! Application configuration for wortschatz.
//!
//! User config lives at `~/.wortschatz/wortschatz.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WortschatzError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wortschatz.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wortschatz";

// ---------------------------------------------------------------------------
// Config structs (matching wortschatz.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Translation service settings.
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Dictionary scraping settings.
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding the per-level record store files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory holding the per-level base lemma files.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            base_dir: default_base_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "app/german".into()
}
fn default_base_dir() -> String {
    "app/german_base".into()
}

/// `[translation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Translation endpoint URL.
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,

    /// Source language code.
    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    /// Target language code.
    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    /// Retry attempts per remote call before falling back.
    #[serde(default = "default_translate_retries")]
    pub max_retries: u32,

    /// Delay in ms after a failed attempt.
    #[serde(default = "default_translate_retry_delay")]
    pub retry_delay_ms: u64,

    /// Delay in ms after every successful call (rate-limit cost model).
    #[serde(default = "default_translate_rate_limit")]
    pub rate_limit_ms: u64,

    /// Per-attempt request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Cumulative character ceiling per batched request.
    #[serde(default = "default_batch_chars")]
    pub batch_chars: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translate_endpoint(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            max_retries: default_translate_retries(),
            retry_delay_ms: default_translate_retry_delay(),
            rate_limit_ms: default_translate_rate_limit(),
            request_timeout_secs: default_request_timeout(),
            batch_chars: default_batch_chars(),
        }
    }
}

fn default_translate_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".into()
}
fn default_source_lang() -> String {
    "de".into()
}
fn default_target_lang() -> String {
    "en".into()
}
fn default_translate_retries() -> u32 {
    3
}
fn default_translate_retry_delay() -> u64 {
    2000
}
fn default_translate_rate_limit() -> u64 {
    300
}
fn default_request_timeout() -> u64 {
    10
}
fn default_batch_chars() -> usize {
    4500
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Dictionary base URL; the lemma is appended as a path segment.
    #[serde(default = "default_dwds_base_url")]
    pub base_url: String,

    /// Retry attempts per page fetch before giving up on the word.
    #[serde(default = "default_scrape_retries")]
    pub max_retries: u32,

    /// Delay in ms after a failed attempt.
    #[serde(default = "default_scrape_retry_delay")]
    pub retry_delay_ms: u64,

    /// Delay in ms after every fetched page.
    #[serde(default = "default_scrape_rate_limit")]
    pub rate_limit_ms: u64,

    /// Per-attempt request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Worker count for bulk extraction shards.
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Pages fetched per round during composition re-extraction.
    #[serde(default = "default_recompose_batch_size")]
    pub recompose_batch_size: usize,

    /// Concurrent fetches within one re-extraction round.
    #[serde(default = "default_recompose_workers")]
    pub recompose_workers: u32,

    /// Example sentences kept per word.
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,

    /// Compound words kept per word.
    #[serde(default = "default_max_related")]
    pub max_compounds: usize,

    /// Related words kept per word.
    #[serde(default = "default_max_related")]
    pub max_synonyms: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: default_dwds_base_url(),
            max_retries: default_scrape_retries(),
            retry_delay_ms: default_scrape_retry_delay(),
            rate_limit_ms: default_scrape_rate_limit(),
            request_timeout_secs: default_request_timeout(),
            workers: default_workers(),
            recompose_batch_size: default_recompose_batch_size(),
            recompose_workers: default_recompose_workers(),
            max_examples: default_max_examples(),
            max_compounds: default_max_related(),
            max_synonyms: default_max_related(),
        }
    }
}

fn default_dwds_base_url() -> String {
    "https://www.dwds.de/wb".into()
}
fn default_scrape_retries() -> u32 {
    3
}
fn default_scrape_retry_delay() -> u64 {
    1000
}
fn default_scrape_rate_limit() -> u64 {
    200
}
fn default_workers() -> u32 {
    4
}
fn default_recompose_batch_size() -> usize {
    10
}
fn default_recompose_workers() -> u32 {
    5
}
fn default_max_examples() -> usize {
    6
}
fn default_max_related() -> usize {
    15
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wortschatz/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WortschatzError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wortschatz/wortschatz.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| WortschatzError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        WortschatzError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WortschatzError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WortschatzError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WortschatzError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("translate.googleapis.com"));
        assert!(toml_str.contains("dwds.de"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.translation.max_retries, 3);
        assert_eq!(parsed.translation.batch_chars, 4500);
        assert_eq!(parsed.scrape.workers, 4);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
data_dir = "/tmp/german"

[scrape]
workers = 8
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.data_dir, "/tmp/german");
        assert_eq!(config.defaults.base_dir, "app/german_base");
        assert_eq!(config.scrape.workers, 8);
        assert_eq!(config.scrape.max_retries, 3);
        assert_eq!(config.translation.rate_limit_ms, 300);
    }
}
