use std::time::Duration;

pub const SERVICE_URL_VAR: &str = "APIKA_SERVICE_URL";
pub const PROVIDER_BASE_URL_VAR: &str = "APIKA_PROVIDER_BASE_URL";

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080";

pub const DEFAULT_SILENCE_DURATION_MS: u32 = 1000;

pub const CREDENTIAL_TIMEOUT: Duration = Duration::from_secs(15);
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(30);

pub const RAW_EVENTS_CAPACITY: usize = 256;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const SDP_CONTENT_TYPE: &str = "application/sdp";
