use crate::audio::{TurnDetection, Voice};
use crate::tools::{Tool, ToolChoice};
use secrecy::{ExposeSecret, SecretString};

/// The session parameters the browser asks the token service to bake into
/// the ephemeral credential. Sent base64-encoded in the `data` query param.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionSetup {
    pub voice: Voice,
    pub instructions: String,
    pub tools: Vec<Tool>,
    pub tool_choice: ToolChoice,
    pub turn_detection: TurnDetection,
}

/// A short-lived credential authorizing one realtime session.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EphemeralCredential {
    model: String,
    client_secret: ClientSecret,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClientSecret {
    value: SecretString,
    #[serde(default)]
    expires_at: Option<i64>,
}

impl EphemeralCredential {
    pub fn new(model: &str, token: &str, expires_in: Option<u64>) -> Self {
        Self {
            model: model.to_string(),
            client_secret: ClientSecret {
                value: SecretString::from(token.to_string()),
                expires_at: None,
            },
            expires_in,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }
}

impl ClientSecret {
    pub fn value(&self) -> &SecretString {
        &self.value
    }

    /// The bearer token, for the one place that has to send it.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }
}
