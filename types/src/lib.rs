//! Wire types for the realtime voice session: session configuration, tool
//! definitions, client/server events, usage accounting and the ephemeral
//! credential handed out by the token service.

pub mod audio;
pub mod credential;
pub mod events;
pub mod session;
pub mod tools;
pub mod usage;
mod content;

pub use audio::{TranscriptionModel, TurnDetection, Voice};
pub use content::items::{FunctionCallOutputItem, Item};
pub use content::message::*;
pub use credential::{ClientSecret, EphemeralCredential, SessionSetup};
pub use events::server::error::ErrorDetails;
pub use events::server::resources::{
    FunctionCallItem, ItemResource, ResponseResource, ResponseStatus, SessionResource,
};
pub use events::{ClientEvent, ServerEvent};
pub use session::Session;
pub use tools::{FunctionTool, Tool, ToolChoice};
pub use usage::TokenUsage;
