use std::fmt;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub data_dir: PathBuf,
    pub log_level: Level,
}

// The token never goes to the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("data_dir", &self.data_dir)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// `BOT_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let bot_token = std::env::var("BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("BOT_TOKEN".to_string()))?;

        Ok(Self {
            bot_token,
            data_dir: data_dir_from_env(),
            log_level: log_level_from_env()?,
        })
    }
}

/// Reads a `.env` file if one is present.
pub fn load_dotenv() {
    // Only load from .env in non-test mode to avoid contamination
    if !cfg!(test) {
        dotenvy::dotenv().ok();
    }
}

/// The question bank root, `QUIZ_DATA_DIR` or `./data`.
pub fn data_dir_from_env() -> PathBuf {
    std::env::var("QUIZ_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"))
}

pub fn log_level_from_env() -> Result<Level, ConfigError> {
    let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
    log_level_str.parse::<Level>().map_err(|_| {
        ConfigError::InvalidValue(
            "RUST_LOG".to_string(),
            format!("'{}' is not a valid log level", log_level_str),
        )
    })
}
