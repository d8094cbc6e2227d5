mod config;
mod consts;
mod dispatch;
mod signaling;

pub use config::{
    ConfigError, LiveSessionConfig, LiveSessionConfigBuilder, SessionDetails, SessionTimeouts,
};
pub use dispatch::execute;
pub use signaling::{HttpSignaling, Signaling};
#[cfg(test)]
pub(crate) use signaling::MockSignaling;

use crate::credential::{CredentialFetcher, HttpCredentialFetcher};
use crate::error::{Result, SessionError, with_timeout};
use crate::interpreter::{Interpretation, interpret};
use crate::record::{self, NoopRecorder, SessionRecordUpdate, SessionRecorder};
use crate::store::ConversationStore;
use crate::tools::{ToolResponse, ToolSet};
use crate::transport::{
    AudioSink, DataChannel, DataChannelHandle, EVENTS_CHANNEL_LABEL, MediaTrack, PeerConnection,
    RealtimePlatform,
};
use apika_types::audio::TurnDetection;
use apika_types::events::client::{
    ConversationItemCreateEvent, ResponseCreateEvent, SessionUpdateEvent,
};
use apika_types::{
    ClientEvent, FunctionCallOutputItem, Item, MessageItem, ServerEvent, Session, SessionSetup,
    ToolChoice,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

pub type EventRx = broadcast::Receiver<Value>;

/// Returned by a successful [`LiveSessionManager::create_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub model: String,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EndSessionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The transport resources of the one live session. Dropping it releases
/// everything it holds and stops the session's tasks.
struct ActiveSession {
    model: String,
    record_id: Option<String>,
    peer: Box<dyn PeerConnection>,
    microphone: Option<Arc<dyn MediaTrack>>,
    channel: Option<Arc<dyn DataChannel>>,
    sink: Arc<dyn AudioSink>,
    cancel: CancellationToken,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(channel) = self.channel.take() {
            channel.close();
        }
        self.peer.close();
        if let Some(microphone) = self.microphone.take() {
            microphone.stop();
        }
        self.sink.detach();
    }
}

#[derive(Default)]
struct State {
    active: Option<ActiveSession>,
    tools: Arc<ToolSet>,
}

/// Everything the session's background tasks share with the manager.
pub(crate) struct Shared {
    state: Mutex<State>,
    store: ConversationStore,
    recorder: Arc<dyn SessionRecorder>,
    raw_events: broadcast::Sender<Value>,
    pub(crate) timeouts: SessionTimeouts,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn tools(&self) -> Arc<ToolSet> {
        self.lock().tools.clone()
    }

    fn set_tools(&self, tools: ToolSet) {
        self.lock().tools = Arc::new(tools);
    }

    fn channel(&self) -> Option<Arc<dyn DataChannel>> {
        self.lock().active.as_ref().and_then(|s| s.channel.clone())
    }

    fn send_event(&self, event: &ClientEvent) -> Result<()> {
        let channel = self.channel().ok_or(SessionError::ChannelClosed)?;
        let text = serde_json::to_string(event)?;
        tracing::debug!("sending message: {}", event.event_type());
        channel.send(text)
    }

    /// Returns a tool result to the model and asks it to continue. A session
    /// that went away in the meantime swallows the output.
    pub(crate) fn send_function_output(&self, call_id: &str, response: &ToolResponse) {
        let output = match serde_json::to_string(response) {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("failed to serialize tool output: {}", e);
                return;
            }
        };
        let item = ClientEvent::ConversationItemCreate(ConversationItemCreateEvent::new(
            Item::FunctionCallOutput(FunctionCallOutputItem::new(call_id, output)),
        ));
        let proceed = ClientEvent::ResponseCreate(ResponseCreateEvent::new());

        for event in [item, proceed] {
            match self.send_event(&event) {
                Ok(()) => {}
                Err(SessionError::ChannelClosed) => {
                    tracing::debug!("no data channel, dropping output of call {}", call_id);
                    return;
                }
                Err(e) => {
                    tracing::warn!("failed to send {}: {}", event.event_type(), e);
                    return;
                }
            }
        }
    }

    fn request_record_update(&self) {
        let Some(record_id) = self.lock().active.as_ref().and_then(|s| s.record_id.clone()) else {
            tracing::debug!("no session record to update");
            return;
        };
        let update = SessionRecordUpdate {
            usage: self.store.usage(),
            dialogs: self.store.last_dialog().into_iter().collect(),
        };
        record::spawn_update(self.recorder.clone(), record_id, update);
    }

    fn handle_message(&self, text: &str, calls: &dispatch::CallTx) {
        let json = match serde_json::from_str::<Value>(text) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to parse message: {}, text=> {:?}", e, text);
                return;
            }
        };

        let event_type = json
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let event_id = json.get("event_id").and_then(Value::as_str).unwrap_or("unknown");
        tracing::debug!("received message: {}, id={}", event_type, event_id);

        // no subscribers is fine
        let _ = self.raw_events.send(json.clone());

        let event = match serde_json::from_value::<ServerEvent>(json) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("failed to deserialize event: {}, type=> {}", e, event_type);
                return;
            }
        };

        let interpretation = interpret(&event);
        match &interpretation {
            Interpretation::SessionCreated { event_id } => {
                tracing::info!("session created, id={}", event_id);
            }
            Interpretation::Error(details) => {
                tracing::error!(
                    "error from provider: {} (type={}, code={:?})",
                    details.message(),
                    details.error_type(),
                    details.code()
                );
            }
            Interpretation::TurnCompleted {
                function_call: Some(call),
                ..
            } => {
                if calls.send(call.clone()).is_err() {
                    tracing::debug!("dispatcher gone, dropping call {}", call.call_id());
                }
            }
            _ => {}
        }

        if self.store.apply(&interpretation) {
            self.request_record_update();
        }
    }
}

async fn run_event_loop(
    shared: Arc<Shared>,
    mut messages: mpsc::UnboundedReceiver<String>,
    calls: dispatch::CallTx,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            message = messages.recv() => match message {
                Some(text) => shared.handle_message(&text, &calls),
                None => {
                    tracing::info!("data channel closed");
                    break;
                }
            },
        }
    }
}

/// Owns the single live session: its peer connection, microphone, data
/// channel and the tasks reading from it. Cheap to clone.
#[derive(Clone)]
pub struct LiveSessionManager {
    platform: Arc<dyn RealtimePlatform>,
    credentials: Arc<dyn CredentialFetcher>,
    signaling: Arc<dyn Signaling>,
    shared: Arc<Shared>,
}

pub struct LiveSessionManagerBuilder {
    platform: Arc<dyn RealtimePlatform>,
    credentials: Arc<dyn CredentialFetcher>,
    signaling: Arc<dyn Signaling>,
    recorder: Arc<dyn SessionRecorder>,
    timeouts: SessionTimeouts,
}

impl LiveSessionManagerBuilder {
    pub fn with_recorder(mut self, recorder: Arc<dyn SessionRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_timeouts(mut self, timeouts: SessionTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn build(self) -> LiveSessionManager {
        let (raw_events, _) = broadcast::channel(consts::RAW_EVENTS_CAPACITY);
        LiveSessionManager {
            platform: self.platform,
            credentials: self.credentials,
            signaling: self.signaling,
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                store: ConversationStore::new(),
                recorder: self.recorder,
                raw_events,
                timeouts: self.timeouts,
            }),
        }
    }
}

impl LiveSessionManager {
    pub fn builder(
        platform: Arc<dyn RealtimePlatform>,
        credentials: Arc<dyn CredentialFetcher>,
        signaling: Arc<dyn Signaling>,
    ) -> LiveSessionManagerBuilder {
        LiveSessionManagerBuilder {
            platform,
            credentials,
            signaling,
            recorder: Arc::new(NoopRecorder),
            timeouts: SessionTimeouts::default(),
        }
    }

    /// Builder for a manager talking HTTP to the token service and the provider.
    pub fn from_config(
        platform: Arc<dyn RealtimePlatform>,
        config: &LiveSessionConfig,
    ) -> LiveSessionManagerBuilder {
        Self::builder(
            platform,
            Arc::new(HttpCredentialFetcher::new(config.service_url())),
            Arc::new(HttpSignaling::new(config.provider_base_url())),
        )
        .with_timeouts(config.timeouts())
    }

    /// Starts a new session, ending any session that is still active.
    ///
    /// On failure everything acquired so far is released and no session is
    /// active afterwards.
    pub async fn create_session(
        &self,
        details: SessionDetails,
        tools: ToolSet,
        sink: Option<Arc<dyn AudioSink>>,
    ) -> Result<SessionInfo> {
        if self.shared.lock().active.is_some() {
            tracing::info!("replacing the active session");
            self.end_session();
        }

        let sink = sink.ok_or(SessionError::MissingAudioSink)?;
        let timeouts = self.shared.timeouts;

        let setup = SessionSetup {
            voice: details.voice().clone(),
            instructions: details.instructions().to_string(),
            tools: tools.definitions(),
            tool_choice: ToolChoice::auto(),
            turn_detection: TurnDetection::server_vad(details.turn_detection_silence_ms()),
        };
        self.shared.set_tools(tools);

        let credential = with_timeout(
            "credential fetch",
            timeouts.credential,
            self.credentials.fetch(&setup),
        )
        .await?;
        let record_id =
            record::create_best_effort(self.shared.recorder.as_ref(), credential.model()).await;

        let peer = self.platform.create_peer_connection()?;
        peer.set_remote_audio_sink(sink.clone());
        let mut session = ActiveSession {
            model: credential.model().to_string(),
            record_id,
            peer,
            microphone: None,
            channel: None,
            sink,
            cancel: CancellationToken::new(),
        };

        // any early return from here drops `session`, which releases it
        let microphone = self.platform.media_devices().open_microphone().await?;
        session.microphone = Some(microphone.clone());
        session.peer.add_track(microphone)?;

        let DataChannelHandle { channel, messages } =
            session.peer.create_data_channel(EVENTS_CHANNEL_LABEL)?;
        session.channel = Some(channel);

        let calls = dispatch::spawn(self.shared.clone(), session.cancel.clone());
        tokio::spawn(run_event_loop(
            self.shared.clone(),
            messages,
            calls,
            session.cancel.clone(),
        ));

        let peer = session.peer.as_ref();
        with_timeout("sdp exchange", timeouts.handshake, async {
            let offer = peer.create_offer().await?;
            peer.set_local_description(offer.clone()).await?;
            let answer = self.signaling.exchange(&offer, &credential).await?;
            peer.set_remote_description(answer).await
        })
        .await?;

        let replaced = self.shared.lock().active.replace(session);
        if replaced.is_some() {
            tracing::warn!("a concurrent session was replaced");
        }
        drop(replaced);

        self.shared.store.set_session_started(true);
        self.toggle_microphone(Some(details.start_muted()));
        tracing::info!("session started with model {}", credential.model());

        Ok(SessionInfo {
            model: credential.model().to_string(),
            expires_in: credential.expires_in(),
        })
    }

    /// Stores `tools` and pushes the new instructions and tools to the live
    /// session without a new handshake.
    pub fn reconfigure(&self, instructions: &str, tools: ToolSet) -> Result<()> {
        let session = Session::builder()
            .with_instructions(instructions)
            .with_tools(tools.definitions())
            .with_tool_choice(ToolChoice::auto())
            .build();
        tracing::debug!("reconfiguring session with tools {:?}", tools.names());
        self.shared.set_tools(tools);
        self.shared
            .send_event(&ClientEvent::SessionUpdate(SessionUpdateEvent::new(session)))
    }

    pub fn end_session(&self) -> EndSessionResult {
        let Some(session) = self.shared.lock().active.take() else {
            tracing::warn!("no active session to end");
            return EndSessionResult {
                success: false,
                message: Some("No active session".to_string()),
            };
        };

        tracing::info!("ending session with model {}", session.model);
        drop(session);
        self.shared.store.set_session_started(false);
        self.shared.store.set_microphone_muted(false);

        EndSessionResult {
            success: true,
            message: None,
        }
    }

    /// `muted` is the desired muted state; `None` flips it. Returns the muted
    /// state after the call. Without a microphone nothing changes.
    pub fn toggle_microphone(&self, muted: Option<bool>) -> bool {
        let state = self.shared.lock();
        let current = self.shared.store.microphone_muted();
        let Some(microphone) = state.active.as_ref().and_then(|s| s.microphone.as_ref()) else {
            return current;
        };

        let muted = muted.unwrap_or(!current);
        microphone.set_enabled(!muted);
        self.shared.store.set_microphone_muted(muted);
        muted
    }

    /// Makes the model speak right away, guided by `instructions`.
    pub fn send_text_trigger(&self, instructions: &str) -> Result<()> {
        let response = Session::builder()
            .with_modalities_enable_audio()
            .with_instructions(instructions)
            .build();
        self.shared.send_event(&ClientEvent::ResponseCreate(
            ResponseCreateEvent::new().with_response(response),
        ))
    }

    /// Adds a typed user message to the conversation and asks for a reply.
    pub fn send_text_message(&self, text: &str) -> Result<()> {
        let message = MessageItem::builder().with_input_text(text).build();
        self.shared.send_event(&ClientEvent::ConversationItemCreate(
            ConversationItemCreateEvent::new(Item::Message(message)),
        ))?;
        self.shared
            .send_event(&ClientEvent::ResponseCreate(ResponseCreateEvent::new()))
    }

    pub fn clear_dialogs(&self) {
        self.shared.store.clear_dialogs();
    }

    pub fn store(&self) -> &ConversationStore {
        &self.shared.store
    }

    /// Every inbound message as raw JSON, before interpretation.
    pub fn subscribe_events(&self) -> EventRx {
        self.shared.raw_events.subscribe()
    }

    pub fn is_started(&self) -> bool {
        self.shared.store.session_started()
    }

    pub fn is_microphone_muted(&self) -> bool {
        self.shared.store.microphone_muted()
    }

    pub fn active_tools(&self) -> Arc<ToolSet> {
        self.shared.tools()
    }

    pub fn model(&self) -> Option<String> {
        self.shared.lock().active.as_ref().map(|s| s.model.clone())
    }
}
