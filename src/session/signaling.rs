use crate::error::{Result, SessionError};
use crate::session::consts::{AUTHORIZATION_HEADER, DEFAULT_PROVIDER_BASE_URL, SDP_CONTENT_TYPE};
use crate::transport::SessionDescription;
use apika_types::EphemeralCredential;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Trades the local SDP offer for the provider's answer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Signaling: Send + Sync {
    async fn exchange(
        &self,
        offer: &SessionDescription,
        credential: &EphemeralCredential,
    ) -> Result<SessionDescription>;
}

pub struct HttpSignaling {
    client: reqwest::Client,
    base_url: String,
}

impl Default for HttpSignaling {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDER_BASE_URL)
    }
}

impl HttpSignaling {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn realtime_url(&self, model: &str) -> String {
        format!("{}/realtime?model={}", self.base_url, model)
    }
}

#[async_trait]
impl Signaling for HttpSignaling {
    async fn exchange(
        &self,
        offer: &SessionDescription,
        credential: &EphemeralCredential,
    ) -> Result<SessionDescription> {
        let response = self
            .client
            .post(self.realtime_url(credential.model()))
            .header(
                AUTHORIZATION_HEADER,
                format!("Bearer {}", credential.client_secret().expose()),
            )
            .header(reqwest::header::CONTENT_TYPE, SDP_CONTENT_TYPE)
            .body(offer.sdp().to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("sdp exchange failed: {}, body={}", status, body);
            return Err(SessionError::Signaling {
                status: status.as_u16(),
                body,
            });
        }

        Ok(SessionDescription::answer(&body))
    }
}
