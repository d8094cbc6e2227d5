//! Maps inbound server events to what the session should do about them.

use apika_types::{ErrorDetails, FunctionCallItem, ItemResource, ServerEvent, TokenUsage};

#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    SessionCreated {
        event_id: String,
    },
    /// Part of the assistant's spoken reply; `response_id` keys the dialog.
    AiTranscriptDelta {
        response_id: String,
        delta: String,
    },
    /// The finished transcription of a user turn; `item_id` keys the dialog.
    UserTranscript {
        item_id: String,
        transcript: String,
    },
    TurnCompleted {
        function_call: Option<FunctionCallItem>,
        usage: Option<TokenUsage>,
    },
    Error(ErrorDetails),
    Ignored,
}

pub fn interpret(event: &ServerEvent) -> Interpretation {
    match event {
        ServerEvent::SessionCreated(created) => Interpretation::SessionCreated {
            event_id: created.event_id().to_string(),
        },
        ServerEvent::ResponseAudioTranscriptDelta(delta) => Interpretation::AiTranscriptDelta {
            response_id: delta.response_id().to_string(),
            delta: delta.delta().to_string(),
        },
        ServerEvent::ConversationItemInputAudioTranscriptionCompleted(completed) => {
            if completed.transcript().is_empty() {
                return Interpretation::Ignored;
            }
            Interpretation::UserTranscript {
                item_id: completed.item_id().to_string(),
                transcript: completed.transcript().to_string(),
            }
        }
        ServerEvent::ResponseDone(done) => {
            let response = done.response();
            // only the first output item can request a tool call
            let function_call = match response.output().first() {
                Some(ItemResource::FunctionCall(call)) => Some(call.clone()),
                _ => None,
            };
            let usage = response.usage().copied();
            if function_call.is_none() && usage.is_none() {
                return Interpretation::Ignored;
            }
            Interpretation::TurnCompleted {
                function_call,
                usage,
            }
        }
        ServerEvent::Error(error) => Interpretation::Error(error.error().clone()),
        _ => Interpretation::Ignored,
    }
}
