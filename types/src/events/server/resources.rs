use crate::content::message::MessageRole;
use crate::usage::TokenUsage;

/// The session as echoed back in `session.created` / `session.updated`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionResource {
    id: Option<String>,
    model: Option<String>,
    instructions: Option<String>,
    expires_at: Option<i64>,
}

impl SessionResource {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    #[default]
    InProgress,
    Completed,
    Cancelled,
    Incomplete,
    Failed,
}

/// A model response: the payload of `response.created` and `response.done`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ResponseResource {
    id: String,
    status: ResponseStatus,
    output: Vec<ItemResource>,
    usage: Option<TokenUsage>,
}

impl ResponseResource {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_output(mut self, item: ItemResource) -> Self {
        self.output.push(item);
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn output(&self) -> &[ItemResource] {
        &self.output
    }

    pub fn usage(&self) -> Option<&TokenUsage> {
        self.usage.as_ref()
    }

    /// Function calls in the order the model emitted them.
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCallItem> {
        self.output.iter().filter_map(|item| match item {
            ItemResource::FunctionCall(call) => Some(call),
            _ => None,
        })
    }
}

/// An item of a response's output list.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ItemResource {
    #[serde(rename = "message")]
    Message(MessageResource),
    #[serde(rename = "function_call")]
    FunctionCall(FunctionCallItem),
    #[serde(rename = "function_call_output")]
    FunctionCallOutput {
        #[serde(default)]
        call_id: String,
        #[serde(default)]
        output: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MessageResource {
    #[serde(default)]
    id: Option<String>,
    role: MessageRole,
    #[serde(default)]
    content: Vec<serde_json::Value>,
}

impl MessageResource {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn role(&self) -> MessageRole {
        self.role.clone()
    }
}

/// A function call requested by the model. `arguments` is a JSON-encoded object.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FunctionCallItem {
    id: Option<String>,
    call_id: String,
    name: String,
    arguments: String,
}

impl FunctionCallItem {
    pub fn new(call_id: &str, name: &str, arguments: &str) -> Self {
        Self {
            id: None,
            call_id: call_id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}
