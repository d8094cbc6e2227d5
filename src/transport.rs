//! The media side of a live session, as seen from the core.
//!
//! A host (browser bindings, a native WebRTC stack, or the fakes under test)
//! implements these traits. The core only ever drives them: it never touches
//! audio samples.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Label of the data channel carrying realtime events.
pub const EVENTS_CHANNEL_LABEL: &str = "oai-events";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpType {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    kind: SdpType,
    sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: &str) -> Self {
        Self {
            kind: SdpType::Offer,
            sdp: sdp.to_string(),
        }
    }

    pub fn answer(sdp: &str) -> Self {
        Self {
            kind: SdpType::Answer,
            sdp: sdp.to_string(),
        }
    }

    pub fn kind(&self) -> SdpType {
        self.kind
    }

    pub fn sdp(&self) -> &str {
        &self.sdp
    }
}

/// A local or remote audio track.
pub trait MediaTrack: Send + Sync {
    fn set_enabled(&self, enabled: bool);
    fn enabled(&self) -> bool;
    /// Releases the underlying device. A stopped track stays stopped.
    fn stop(&self);
}

/// Where the model's voice ends up, typically an audio element.
pub trait AudioSink: Send + Sync {
    fn attach(&self, track: Arc<dyn MediaTrack>);
    fn detach(&self) {}
}

/// An ordered, reliable text channel to the provider.
pub trait DataChannel: Send + Sync {
    fn send(&self, text: String) -> Result<()>;
    fn is_open(&self) -> bool;
    fn close(&self);
}

/// A freshly created data channel and the stream of messages it receives.
pub struct DataChannelHandle {
    pub channel: Arc<dyn DataChannel>,
    pub messages: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
pub trait PeerConnection: Send + Sync {
    fn add_track(&self, track: Arc<dyn MediaTrack>) -> Result<()>;

    /// Remote tracks are handed to `sink` as they arrive.
    fn set_remote_audio_sink(&self, sink: Arc<dyn AudioSink>);

    fn create_data_channel(&self, label: &str) -> Result<DataChannelHandle>;

    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    fn close(&self);
}

#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Asks for microphone access. Denial maps to [`SessionError::Media`](crate::SessionError::Media).
    async fn open_microphone(&self) -> Result<Arc<dyn MediaTrack>>;
}

/// Factory for everything a session needs from the host.
pub trait RealtimePlatform: Send + Sync {
    fn create_peer_connection(&self) -> Result<Box<dyn PeerConnection>>;
    fn media_devices(&self) -> Arc<dyn MediaDevices>;
}
