use crate::session::consts::*;
use apika_types::Voice;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Upper bounds for the slow steps of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    pub credential: Duration,
    pub handshake: Duration,
    pub tool: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            credential: CREDENTIAL_TIMEOUT,
            handshake: HANDSHAKE_TIMEOUT,
            tool: TOOL_TIMEOUT,
        }
    }
}

/// Per-session parameters passed to `create_session`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDetails {
    instructions: String,
    voice: Voice,
    turn_detection_silence_ms: u32,
    start_muted: bool,
}

impl SessionDetails {
    pub fn new(instructions: &str) -> Self {
        Self {
            instructions: instructions.to_string(),
            voice: Voice::default(),
            turn_detection_silence_ms: DEFAULT_SILENCE_DURATION_MS,
            start_muted: true,
        }
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_turn_detection_silence_ms(mut self, silence_ms: u32) -> Self {
        self.turn_detection_silence_ms = silence_ms;
        self
    }

    /// Whether the microphone starts muted. Defaults to `true`.
    pub fn with_start_muted(mut self, muted: bool) -> Self {
        self.start_muted = muted;
        self
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn turn_detection_silence_ms(&self) -> u32 {
        self.turn_detection_silence_ms
    }

    pub fn start_muted(&self) -> bool {
        self.start_muted
    }
}

#[derive(Debug, Clone)]
pub struct LiveSessionConfig {
    service_url: String,
    provider_base_url: String,
    timeouts: SessionTimeouts,
}

pub struct LiveSessionConfigBuilder {
    config: LiveSessionConfig,
}

impl Default for LiveSessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveSessionConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: LiveSessionConfig::new(),
        }
    }

    pub fn with_service_url(mut self, service_url: &str) -> Self {
        self.config.service_url = service_url.to_string();
        self
    }

    pub fn with_provider_base_url(mut self, base_url: &str) -> Self {
        self.config.provider_base_url = base_url.to_string();
        self
    }

    pub fn with_timeouts(mut self, timeouts: SessionTimeouts) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    pub fn build(self) -> LiveSessionConfig {
        self.config
    }
}

impl Default for LiveSessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveSessionConfig {
    pub fn new() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            timeouts: SessionTimeouts::default(),
        }
    }

    pub fn builder() -> LiveSessionConfigBuilder {
        LiveSessionConfigBuilder::new()
    }

    /// Loads configuration from the environment (and `.env`, if present).
    ///
    /// *   `APIKA_SERVICE_URL`: base URL of the token service. Required.
    /// *   `APIKA_PROVIDER_BASE_URL`: (Optional) realtime API base. Defaults to `https://api.openai.com/v1`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let service_url = std::env::var(SERVICE_URL_VAR)
            .map_err(|_| ConfigError::MissingVar(SERVICE_URL_VAR.to_string()))?;
        validate_url(SERVICE_URL_VAR, &service_url)?;

        let provider_base_url = std::env::var(PROVIDER_BASE_URL_VAR)
            .unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_string());
        validate_url(PROVIDER_BASE_URL_VAR, &provider_base_url)?;

        Ok(Self {
            service_url,
            provider_base_url,
            timeouts: SessionTimeouts::default(),
        })
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    pub fn provider_base_url(&self) -> &str {
        &self.provider_base_url
    }

    pub fn timeouts(&self) -> SessionTimeouts {
        self.timeouts
    }
}

fn validate_url(var: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(
            var.to_string(),
            format!("'{}' is not an http(s) URL", value),
        ))
    }
}
