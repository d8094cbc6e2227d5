use crate::error::{Result, SessionError};
use apika_types::{EphemeralCredential, SessionSetup};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
#[cfg(test)]
use mockall::automock;

/// Obtains a short-lived credential for one session. The long-lived provider
/// key stays on the token service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialFetcher: Send + Sync {
    async fn fetch(&self, setup: &SessionSetup) -> Result<EphemeralCredential>;
}

pub struct HttpCredentialFetcher {
    client: reqwest::Client,
    service_url: String,
}

impl HttpCredentialFetcher {
    pub fn new(service_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            service_url: service_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/get-token", self.service_url)
    }
}

/// Encodes the setup the way the token service expects it in `?data=`.
pub fn encode_setup(setup: &SessionSetup) -> Result<String> {
    let json = serde_json::to_vec(setup)?;
    Ok(STANDARD.encode(json))
}

#[async_trait]
impl CredentialFetcher for HttpCredentialFetcher {
    async fn fetch(&self, setup: &SessionSetup) -> Result<EphemeralCredential> {
        let data = encode_setup(setup)?;
        let response = self
            .client
            .get(self.token_url())
            .query(&[("data", data.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("credential request failed: {}, body={}", status, body);
            return Err(SessionError::Credential {
                status: status.as_u16(),
                body,
            });
        }

        let credential = response.json::<EphemeralCredential>().await?;
        tracing::debug!(
            "received credential for model {}, expires_in={:?}",
            credential.model(),
            credential.expires_in()
        );
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apika_types::audio::TurnDetection;
    use apika_types::{FunctionTool, ToolChoice, Voice};
    use serde_json::json;

    fn setup() -> SessionSetup {
        SessionSetup {
            voice: Voice::Alloy,
            instructions: "Be brief".into(),
            tools: vec![FunctionTool::new("getWeather", "Weather lookup").into()],
            tool_choice: ToolChoice::auto(),
            turn_detection: TurnDetection::server_vad(1000),
        }
    }

    #[test]
    fn setup_encodes_to_base64_json() {
        let encoded = encode_setup(&setup()).unwrap();
        let decoded: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(
            decoded,
            json!({
                "voice": "alloy",
                "instructions": "Be brief",
                "tools": [{ "type": "function", "name": "getWeather", "description": "Weather lookup" }],
                "tool_choice": "auto",
                "turn_detection": { "type": "server_vad", "silence_duration_ms": 1000 }
            })
        );
    }

    #[test]
    fn token_url_ignores_trailing_slash() {
        let fetcher = HttpCredentialFetcher::new("https://assist.example.com/");
        assert_eq!(fetcher.token_url(), "https://assist.example.com/api/get-token");
    }

    #[tokio::test]
    async fn mocked_fetcher_returns_credential() {
        let mut fetcher = MockCredentialFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|setup| setup.instructions == "Be brief")
            .returning(|_| Ok(EphemeralCredential::new("gpt-4o-mini-realtime-preview", "ek_1", Some(60))));

        let credential = fetcher.fetch(&setup()).await.unwrap();
        assert_eq!(credential.client_secret().expose(), "ek_1");
    }
}
