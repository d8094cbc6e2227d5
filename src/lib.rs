pub mod credential;
pub mod error;
pub mod flow;
pub mod interpreter;
pub mod record;
pub mod session;
pub mod signals;
pub mod store;
pub mod tools;
pub mod transport;

#[cfg(test)]
mod testing;

pub use apika_types as types;

pub use credential::{CredentialFetcher, HttpCredentialFetcher};
pub use error::{Result, SessionError};
pub use flow::{ConversationStep, FlowConfig, FlowManager};
pub use record::{NoopRecorder, SessionRecorder};
pub use session::{
    EndSessionResult, HttpSignaling, LiveSessionConfig, LiveSessionManager, SessionDetails,
    SessionInfo, Signaling,
};
pub use signals::{EmbedSignal, SignalBus};
pub use store::{ConversationDialog, ConversationStore, Speaker};
pub use tools::{AiTool, ToolResponse, ToolSet, async_handler, sync_handler};
