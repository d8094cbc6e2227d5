use crate::Item;
use crate::session::Session;

/// `session.update` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionUpdateEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The session configuration to update
    session: Session,
}

impl SessionUpdateEvent {
    pub fn new(session: Session) -> Self {
        Self {
            event_id: None,
            session,
        }
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// `conversation.item.create` event
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationItemCreateEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The ID of the preceding item after which the new item will be inserted
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_item_id: Option<String>,

    /// The item to add to the conversation
    item: Item,
}

impl ConversationItemCreateEvent {
    pub fn new(item: Item) -> Self {
        Self {
            event_id: None,
            previous_item_id: None,
            item,
        }
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    pub fn with_previous_item_id(mut self, previous_item_id: &str) -> Self {
        self.previous_item_id = Some(previous_item_id.to_string());
        self
    }

    pub fn item(&self) -> &Item {
        &self.item
    }
}

/// `response.create` event
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseCreateEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// Per-response overrides; only modalities and instructions are honoured
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<Session>,
}

impl ResponseCreateEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    pub fn with_response(mut self, response: Session) -> Self {
        self.response = Some(response);
        self
    }

    pub fn response(&self) -> Option<&Session> {
        self.response.as_ref()
    }
}
