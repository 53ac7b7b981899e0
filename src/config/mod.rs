//! Configuration Module
//!
//! Handles configuration loading, validation, and persistence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::predictor::DEFAULT_ENDPOINT;
use crate::voice::{DEFAULT_LOCALE, DEFAULT_PROMPT, DEFAULT_TRIGGER};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Prediction service connection
    #[serde(default)]
    pub predictor: PredictorConfig,

    /// Voice command handling
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Speech output
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Service root (default: "http://127.0.0.1:5000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prediction path under the root (default: "/predict")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Escape response values before rendering them (default: true)
    #[serde(default = "default_true")]
    pub escape_markup: bool,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            escape_markup: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Recognition locale (default: "en-US")
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Substring that triggers a prediction (default: "analyze")
    #[serde(default = "default_trigger")]
    pub trigger: String,

    /// Spoken when the trigger is missing
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Seconds to wait for a transcript (default: 10)
    #[serde(default = "default_listen_timeout")]
    pub listen_timeout_secs: u64,

    /// Groq API key for audio transcription (loaded from GROQ_API_KEY env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groq_api_key: Option<String>,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_trigger() -> String {
    DEFAULT_TRIGGER.to_string()
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_listen_timeout() -> u64 {
    10
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            trigger: default_trigger(),
            prompt: default_prompt(),
            listen_timeout_secs: default_listen_timeout(),
            groq_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Playback engine: "console" or "openai" (default: "console")
    #[serde(default = "default_engine")]
    pub engine: String,

    /// TTS voice name (default: "ash")
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,

    /// TTS model (default: "gpt-4o-mini-tts")
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Where synthesized clips are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// OpenAI API key for TTS (loaded from OPENAI_API_KEY env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

pub const SPEECH_ENGINES: [&str; 2] = ["console", "openai"];

fn default_engine() -> String {
    "console".to_string()
}

fn default_tts_voice() -> String {
    "ash".to_string()
}

fn default_tts_model() -> String {
    "gpt-4o-mini-tts".to_string()
}

fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("civictwin")
        .join("speech")
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            tts_voice: default_tts_voice(),
            tts_model: default_tts_model(),
            output_dir: default_output_dir(),
            openai_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for debug-mode log files
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.config/civictwin/config.toml
    /// 3. Local config: ./civictwin.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        if let Some(system_config_path) = Self::system_config_path() {
            if system_config_path.exists() {
                tracing::debug!("Loading system config from: {:?}", system_config_path);
                config = Self::read_file(&system_config_path)?;
            }
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::read_file(&local_config_path)?;
        }

        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }

        let mut config = Self::read_file(path)?;
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        Ok(config)
    }

    /// Get the system config path: ~/.config/civictwin/config.toml
    pub fn system_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("civictwin").join("config.toml"))
    }

    /// Get the local config path: ./civictwin.toml
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("./civictwin.toml")
    }

    /// A later file replaces an earlier one entirely; sections it leaves out
    /// fall back to defaults.
    fn read_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Apply environment variable overrides, reading variables through `var`.
    pub fn apply_env_overrides<F>(config: &mut Self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = var("CIVICTWIN_BASE_URL") {
            config.predictor.base_url = base_url;
        }

        if let Some(endpoint) = var("CIVICTWIN_ENDPOINT") {
            config.predictor.endpoint = endpoint;
        }

        if let Some(escape) = var("CIVICTWIN_ESCAPE_MARKUP") {
            match parse_flag(&escape) {
                Some(flag) => config.predictor.escape_markup = flag,
                None => tracing::warn!(
                    "Ignoring CIVICTWIN_ESCAPE_MARKUP={:?} (expected true/false/1/0)",
                    escape
                ),
            }
        }

        if let Some(log_level) = var("CIVICTWIN_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        if let Some(log_dir) = var("CIVICTWIN_LOG_DIR") {
            config.logging.dir = Some(PathBuf::from(log_dir));
        }

        if let Some(locale) = var("CIVICTWIN_LOCALE") {
            config.voice.locale = locale;
        }

        if let Some(trigger) = var("CIVICTWIN_TRIGGER") {
            config.voice.trigger = trigger;
        }

        if let Some(engine) = var("CIVICTWIN_SPEECH_ENGINE") {
            config.speech.engine = engine;
        }

        if let Some(api_key) = var("GROQ_API_KEY") {
            config.voice.groq_api_key = Some(api_key);
        }

        if let Some(api_key) = var("OPENAI_API_KEY") {
            config.speech.openai_api_key = Some(api_key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        let base_url = &self.predictor.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("Invalid predictor base_url: {} (expected http:// or https://)", base_url);
        }

        if self.predictor.timeout_secs == 0 {
            anyhow::bail!("predictor.timeout_secs must be greater than zero");
        }

        if self.voice.trigger.trim().is_empty() {
            anyhow::bail!("voice.trigger cannot be empty");
        }

        if self.voice.listen_timeout_secs == 0 {
            anyhow::bail!("voice.listen_timeout_secs must be greater than zero");
        }

        if !SPEECH_ENGINES.contains(&self.speech.engine.as_str()) {
            anyhow::bail!(
                "Invalid speech engine: {}. Must be one of: {:?}",
                self.speech.engine,
                SPEECH_ENGINES
            );
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}
