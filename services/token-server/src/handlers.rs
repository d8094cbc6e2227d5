//! Handler for minting ephemeral realtime credentials.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{error, info};

use crate::{config::SessionDefaults, state::AppState};

pub const GENERIC_FAILURE: &str = "Failed to create the live session";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Upstream(StatusCode),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Upstream(status) => {
                let message = format!("{}, Openai status: {}", GENERIC_FAILURE, status.as_u16());
                (status, Json(json!({ "error": message }))).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("error generating token: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": GENERIC_FAILURE })),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub data: Option<String>,
}

/// Decodes the `data` parameter: base64 of a JSON object.
pub fn decode_setup(data: &str) -> Result<Map<String, Value>, ApiError> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| ApiError::BadRequest(format!("data is not valid base64: {}", e)))?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(setup)) => Ok(setup),
        Ok(_) => Err(ApiError::BadRequest("data must encode a JSON object".to_string())),
        Err(e) => Err(ApiError::BadRequest(format!("data is not valid JSON: {}", e))),
    }
}

/// Server defaults with the client's keys laid over them. Top-level keys from
/// the client replace the defaults wholesale.
pub fn merge_setup(defaults: &SessionDefaults, setup: Map<String, Value>) -> Value {
    let mut body = Map::new();
    body.insert("model".to_string(), json!(defaults.model));
    body.insert("temperature".to_string(), json!(defaults.temperature));
    body.insert(
        "input_audio_transcription".to_string(),
        json!({ "model": defaults.transcription_model }),
    );
    body.extend(setup);
    Value::Object(body)
}

/// `GET /api/get-token?data=<base64 JSON>`
///
/// Creates a realtime session upstream with the server-held key and returns
/// the provider's response, ephemeral secret included, unchanged.
pub async fn get_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Value>, ApiError> {
    let data = query
        .data
        .ok_or_else(|| ApiError::BadRequest("data query parameter is required".to_string()))?;
    let body = merge_setup(&state.config.defaults, decode_setup(&data)?);

    let response = state
        .http
        .post(state.config.sessions_url())
        .bearer_auth(state.config.openai_api_key.expose_secret())
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        error!("failed to create the live session: {}, {}", status, detail);
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return Err(ApiError::Upstream(status));
    }

    let session = response.json::<Value>().await?;
    info!("issued ephemeral credential for model {}", body["model"]);
    Ok(Json(session))
}
