use std::time::Duration;

/// Everything that can go wrong while setting up or driving a live session.
///
/// Tool and flow-transition failures are not errors: they travel back to the
/// model as a [`ToolResponse`](crate::tools::ToolResponse).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("credential service returned status {status}: {body}")]
    Credential { status: u16, body: String },

    #[error("sdp exchange failed with status {status}: {body}")]
    Signaling { status: u16, body: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media device unavailable: {0}")]
    Media(String),

    #[error("audio sink not provided")]
    MissingAudioSink,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("no data channel available")]
    ChannelClosed,

    #[error("no active session")]
    NoActiveSession,

    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },

    #[error("tool \"{0}\" is already registered")]
    DuplicateTool(String),

    #[error("invalid flow: {0}")]
    InvalidFlow(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Runs `fut` under `limit`, mapping expiry to [`SessionError::Timeout`].
pub(crate) async fn with_timeout<T>(
    operation: &'static str,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::Timeout {
            operation,
            elapsed: limit,
        }),
    }
}
