use secrecy::SecretString;
use std::net::SocketAddr;
use tracing::Level;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-mini-realtime-preview";
pub const DEFAULT_REALTIME_TEMPERATURE: f64 = 0.6;
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Session defaults the client setup is merged over.
#[derive(Clone, Debug)]
pub struct SessionDefaults {
    pub model: String,
    pub temperature: f64,
    pub transcription_model: String,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            model: DEFAULT_REALTIME_MODEL.to_string(),
            temperature: DEFAULT_REALTIME_TEMPERATURE,
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub openai_api_key: SecretString,
    pub openai_base_url: String,
    pub defaults: SessionDefaults,
    pub environment: Environment,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables, after reading `.env`
    /// if present.
    ///
    /// *   `BIND_ADDRESS`: defaults to `0.0.0.0:8080`.
    /// *   `OPENAI_API_KEY`: required.
    /// *   `OPENAI_BASE_URL`: defaults to `https://api.openai.com/v1`.
    /// *   `REALTIME_MODEL`, `REALTIME_TEMPERATURE`, `TRANSCRIPTION_MODEL`: session defaults.
    /// *   `APP_ENV`: `production` turns off permissive CORS.
    /// *   `RUST_LOG`: defaults to `INFO`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;

        let openai_base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !openai_base_url.starts_with("http://") && !openai_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "OPENAI_BASE_URL".to_string(),
                format!("'{}' is not an http(s) url", openai_base_url),
            ));
        }

        let model =
            std::env::var("REALTIME_MODEL").unwrap_or_else(|_| DEFAULT_REALTIME_MODEL.to_string());
        let temperature = match std::env::var("REALTIME_TEMPERATURE") {
            Ok(value) => value.parse::<f64>().map_err(|e| {
                ConfigError::InvalidValue("REALTIME_TEMPERATURE".to_string(), e.to_string())
            })?,
            Err(_) => DEFAULT_REALTIME_TEMPERATURE,
        };
        let transcription_model = std::env::var("TRANSCRIPTION_MODEL")
            .unwrap_or_else(|_| DEFAULT_TRANSCRIPTION_MODEL.to_string());

        let environment = std::env::var("APP_ENV")
            .map(|value| Environment::parse(&value))
            .unwrap_or(Environment::Development);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            openai_api_key,
            openai_base_url,
            defaults: SessionDefaults {
                model,
                temperature,
                transcription_model,
            },
            environment,
            log_level,
        })
    }

    pub fn sessions_url(&self) -> String {
        format!("{}/realtime/sessions", self.openai_base_url)
    }
}
