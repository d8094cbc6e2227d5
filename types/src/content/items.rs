use crate::content::message::MessageItem;

/// An item the client adds to the conversation with `conversation.item.create`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Item {
    #[serde(rename = "message")]
    Message(MessageItem),
    #[serde(rename = "function_call_output")]
    FunctionCallOutput(FunctionCallOutputItem),
}

/// The result of a locally executed tool, returned to the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionCallOutputItem {
    /// The ID of the function call this output answers.
    call_id: String,

    /// JSON-encoded tool result.
    output: String,
}

impl FunctionCallOutputItem {
    pub fn new(call_id: &str, output: String) -> Self {
        Self {
            call_id: call_id.to_string(),
            output,
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}
