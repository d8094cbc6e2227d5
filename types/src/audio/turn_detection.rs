#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    #[serde(rename = "server_vad")]
    ServerVad(ServerVadTurnDetection),
}

/// Server-side voice activity detection. Unset fields fall back to the
/// provider defaults.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServerVadTurnDetection {
    /// Activation threshold for VAD (0.0 to 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<f32>,

    /// Amount of audio to include before speech starts, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix_padding_ms: Option<u32>,

    /// Duration of silence to detect speech stop, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    silence_duration_ms: Option<u32>,
}

impl Default for TurnDetection {
    fn default() -> Self {
        Self::ServerVad(ServerVadTurnDetection::default())
    }
}

impl TurnDetection {
    pub fn server_vad(silence_duration_ms: u32) -> Self {
        Self::ServerVad(ServerVadTurnDetection::default().with_silence_duration_ms(silence_duration_ms))
    }
}

impl ServerVadTurnDetection {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_prefix_padding_ms(mut self, prefix_padding_ms: u32) -> Self {
        self.prefix_padding_ms = Some(prefix_padding_ms);
        self
    }

    pub fn with_silence_duration_ms(mut self, silence_duration_ms: u32) -> Self {
        self.silence_duration_ms = Some(silence_duration_ms);
        self
    }

    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    pub fn prefix_padding_ms(&self) -> Option<u32> {
        self.prefix_padding_ms
    }

    pub fn silence_duration_ms(&self) -> Option<u32> {
        self.silence_duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_vad_only_carries_what_was_set() {
        let json = serde_json::to_value(TurnDetection::server_vad(1000)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "server_vad", "silence_duration_ms": 1000 })
        );
    }
}
