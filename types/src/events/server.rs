pub mod error;
pub mod resources;

use error::ErrorDetails;
use resources::{ResponseResource, SessionResource};

/// `error` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ErrorEvent {
    #[serde(default)]
    event_id: String,

    /// Details about the error
    #[serde(default)]
    error: ErrorDetails,
}

impl ErrorEvent {
    pub fn new(error: ErrorDetails) -> Self {
        Self {
            event_id: String::new(),
            error,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn error(&self) -> &ErrorDetails {
        &self.error
    }
}

/// `session.created` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionCreatedEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    session: SessionResource,
}

impl SessionCreatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn session(&self) -> &SessionResource {
        &self.session
    }
}

/// `session.updated` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionUpdatedEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    session: SessionResource,
}

impl SessionUpdatedEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn session(&self) -> &SessionResource {
        &self.session
    }
}

/// `input_audio_buffer.speech_started` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferSpeechStartedEvent {
    #[serde(default)]
    event_id: String,

    /// Milliseconds since the session started when speech was detected
    #[serde(default)]
    audio_start_ms: i64,

    #[serde(default)]
    item_id: String,
}

impl InputAudioBufferSpeechStartedEvent {
    pub fn audio_start_ms(&self) -> i64 {
        self.audio_start_ms
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `input_audio_buffer.speech_stopped` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferSpeechStoppedEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    audio_end_ms: i64,

    #[serde(default)]
    item_id: String,
}

impl InputAudioBufferSpeechStoppedEvent {
    pub fn audio_end_ms(&self) -> i64 {
        self.audio_end_ms
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// `conversation.item.input_audio_transcription.completed` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemInputAudioTranscriptionCompletedEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    item_id: String,

    #[serde(default)]
    content_index: u32,

    /// The transcribed text of the user's turn
    #[serde(default)]
    transcript: String,
}

impl ConversationItemInputAudioTranscriptionCompletedEvent {
    pub fn new(item_id: &str, transcript: &str) -> Self {
        Self {
            event_id: String::new(),
            item_id: item_id.to_string(),
            content_index: 0,
            transcript: transcript.to_string(),
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn content_index(&self) -> u32 {
        self.content_index
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

/// `response.created` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseCreatedEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    response: ResponseResource,
}

impl ResponseCreatedEvent {
    pub fn response(&self) -> &ResponseResource {
        &self.response
    }
}

/// `response.done` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseDoneEvent {
    #[serde(default)]
    event_id: String,

    /// The finished response, with any function calls and usage
    #[serde(default)]
    response: ResponseResource,
}

impl ResponseDoneEvent {
    pub fn new(response: ResponseResource) -> Self {
        Self {
            event_id: String::new(),
            response,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn response(&self) -> &ResponseResource {
        &self.response
    }
}

/// `response.audio_transcript.delta` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseAudioTranscriptDeltaEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    response_id: String,

    #[serde(default)]
    item_id: String,

    #[serde(default)]
    output_index: u32,

    #[serde(default)]
    content_index: u32,

    /// The transcript delta
    #[serde(default)]
    delta: String,
}

impl ResponseAudioTranscriptDeltaEvent {
    pub fn new(response_id: &str, delta: &str) -> Self {
        Self {
            event_id: String::new(),
            response_id: response_id.to_string(),
            item_id: String::new(),
            output_index: 0,
            content_index: 0,
            delta: delta.to_string(),
        }
    }

    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn delta(&self) -> &str {
        &self.delta
    }
}

/// `response.audio_transcript.done` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseAudioTranscriptDoneEvent {
    #[serde(default)]
    event_id: String,

    #[serde(default)]
    response_id: String,

    #[serde(default)]
    item_id: String,

    /// The final transcript of the audio
    #[serde(default)]
    transcript: String,
}

impl ResponseAudioTranscriptDoneEvent {
    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}
