use crate::audio::{InputAudioTranscription, TranscriptionModel, TurnDetection, Voice};
use crate::tools::{Tool, ToolChoice};

/// Session configuration as carried by `session.update`. Every field is
/// optional so an update only touches what it sets.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Session {
    /// The set of modalities the model can respond with. To disable audio, set this to ["text"].
    #[serde(skip_serializing_if = "Option::is_none")]
    modalities: Option<Vec<String>>,

    /// The default system instructions prepended to model calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,

    /// The voice the model uses to respond. Cannot be changed once the model has responded with audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<Voice>,

    /// Configuration for input audio transcription.
    #[serde(skip_serializing_if = "Option::is_none")]
    input_audio_transcription: Option<InputAudioTranscription>,

    /// Configuration for turn detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    turn_detection: Option<TurnDetection>,

    /// Tools (functions) available to the model. An empty list clears them.
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,

    /// How the model chooses tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,

    /// Sampling temperature for the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl Session {
    pub fn builder() -> SessionConfigurator {
        SessionConfigurator::new()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn tools(&self) -> Option<&[Tool]> {
        self.tools.as_deref()
    }

    pub fn tool_choice(&self) -> Option<&ToolChoice> {
        self.tool_choice.as_ref()
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }
}

pub struct SessionConfigurator {
    session: Session,
}

impl Default for SessionConfigurator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfigurator {
    pub fn new() -> Self {
        Self {
            session: Session::default(),
        }
    }

    pub fn with_modalities_enable_audio(mut self) -> Self {
        self.session.modalities = Some(vec!["text".to_string(), "audio".to_string()]);
        self
    }

    pub fn with_modalities_disable_audio(mut self) -> Self {
        self.session.modalities = Some(vec!["text".to_string()]);
        self
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.session.instructions = Some(instructions.to_string());
        self
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.session.voice = Some(voice);
        self
    }

    pub fn with_input_audio_transcription_enable(mut self, model: TranscriptionModel) -> Self {
        self.session.input_audio_transcription =
            Some(InputAudioTranscription::new().with_model(model));
        self
    }

    pub fn with_turn_detection_enable(mut self, turn_detection: TurnDetection) -> Self {
        self.session.turn_detection = Some(turn_detection);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.session.tools = Some(tools);
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.session.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.session.temperature = Some(temperature);
        self
    }

    pub fn build(self) -> Session {
        self.session
    }
}
