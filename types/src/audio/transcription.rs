use crate::audio::TranscriptionModel;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputAudioTranscription {
    /// The model to use for transcription: "whisper-1"
    model: TranscriptionModel,
}

impl InputAudioTranscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: TranscriptionModel) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> TranscriptionModel {
        self.model.clone()
    }
}
