//! In-memory stand-ins for the host media stack.

use crate::credential::MockCredentialFetcher;
use crate::error::{Result, SessionError};
use crate::session::{LiveSessionManager, MockSignaling, SessionTimeouts};
use crate::transport::*;
use apika_types::EphemeralCredential;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub(crate) const TEST_MODEL: &str = "gpt-4o-mini-realtime-preview";

#[derive(Default)]
pub(crate) struct FakeTrack {
    enabled: AtomicBool,
    stopped: AtomicBool,
}

impl FakeTrack {
    pub(crate) fn live() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl MediaTrack for FakeTrack {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.enabled.store(false, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct FakeSink {
    pub(crate) attached: AtomicUsize,
    pub(crate) detached: AtomicUsize,
}

impl AudioSink for FakeSink {
    fn attach(&self, _track: Arc<dyn MediaTrack>) {
        self.attached.fetch_add(1, Ordering::SeqCst);
    }

    fn detach(&self) {
        self.detached.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct FakeChannel {
    sent: Mutex<Vec<String>>,
    open: AtomicBool,
}

impl FakeChannel {
    pub(crate) fn sent(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }
}

impl DataChannel for FakeChannel {
    fn send(&self, text: String) -> Result<()> {
        if !self.is_open() {
            return Err(SessionError::ChannelClosed);
        }
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

/// What the fake host has handed out so far, newest last.
#[derive(Default)]
pub(crate) struct Host {
    pub(crate) deny_microphone: AtomicBool,
    pub(crate) peers_created: AtomicUsize,
    pub(crate) peers_closed: AtomicUsize,
    microphones: Mutex<Vec<Arc<FakeTrack>>>,
    channels: Mutex<Vec<Arc<FakeChannel>>>,
    inbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

struct FakePeer {
    host: Arc<Host>,
    closed: AtomicBool,
}

#[async_trait]
impl PeerConnection for FakePeer {
    fn add_track(&self, _track: Arc<dyn MediaTrack>) -> Result<()> {
        Ok(())
    }

    fn set_remote_audio_sink(&self, sink: Arc<dyn AudioSink>) {
        sink.attach(Arc::new(FakeTrack::live()));
    }

    fn create_data_channel(&self, label: &str) -> Result<DataChannelHandle> {
        assert_eq!(label, EVENTS_CHANNEL_LABEL);
        let channel = Arc::new(FakeChannel {
            sent: Mutex::new(Vec::new()),
            open: AtomicBool::new(true),
        });
        let (tx, rx) = mpsc::unbounded_channel();
        self.host.channels.lock().unwrap().push(channel.clone());
        *self.host.inbound.lock().unwrap() = Some(tx);
        Ok(DataChannelHandle {
            channel,
            messages: rx,
        })
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        Ok(SessionDescription::offer("v=0 offer"))
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        assert_eq!(description.kind(), SdpType::Offer);
        Ok(())
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        assert_eq!(description.kind(), SdpType::Answer);
        Ok(())
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.host.peers_closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl MediaDevices for Host {
    async fn open_microphone(&self) -> Result<Arc<dyn MediaTrack>> {
        if self.deny_microphone.load(Ordering::SeqCst) {
            return Err(SessionError::Media("permission denied".into()));
        }
        let track = Arc::new(FakeTrack::live());
        self.microphones.lock().unwrap().push(track.clone());
        Ok(track)
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakePlatform {
    pub(crate) host: Arc<Host>,
}

impl RealtimePlatform for FakePlatform {
    fn create_peer_connection(&self) -> Result<Box<dyn PeerConnection>> {
        self.host.peers_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePeer {
            host: self.host.clone(),
            closed: AtomicBool::new(false),
        }))
    }

    fn media_devices(&self) -> Arc<dyn MediaDevices> {
        self.host.clone()
    }
}

impl FakePlatform {
    pub(crate) fn microphone(&self) -> Arc<FakeTrack> {
        self.host.microphones.lock().unwrap().last().cloned().unwrap()
    }

    pub(crate) fn channel(&self) -> Arc<FakeChannel> {
        self.host.channels.lock().unwrap().last().cloned().unwrap()
    }

    pub(crate) fn sent(&self) -> Vec<Value> {
        self.channel().sent()
    }

    /// Delivers a message as if the provider had sent it.
    pub(crate) fn push(&self, message: Value) {
        self.push_raw(&message.to_string());
    }

    pub(crate) fn push_raw(&self, text: &str) {
        let inbound = self.host.inbound.lock().unwrap();
        inbound.as_ref().unwrap().send(text.to_string()).unwrap();
    }

    /// Waits until at least `count` messages went out on the current channel.
    pub(crate) async fn wait_for_sent(&self, count: usize) -> Vec<Value> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let sent = self.sent();
                if sent.len() >= count {
                    return sent;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for outbound messages")
    }
}

/// Polls `condition` until it holds, for at most five seconds.
pub(crate) async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

pub(crate) fn credentials() -> MockCredentialFetcher {
    let mut fetcher = MockCredentialFetcher::new();
    fetcher
        .expect_fetch()
        .returning(|_| Ok(EphemeralCredential::new(TEST_MODEL, "ek_test", Some(60))));
    fetcher
}

pub(crate) fn signaling() -> MockSignaling {
    let mut signaling = MockSignaling::new();
    signaling
        .expect_exchange()
        .returning(|_, _| Ok(SessionDescription::answer("v=0 answer")));
    signaling
}

pub(crate) fn manager(platform: &FakePlatform) -> LiveSessionManager {
    LiveSessionManager::builder(
        Arc::new(platform.clone()),
        Arc::new(credentials()),
        Arc::new(signaling()),
    )
    .with_timeouts(SessionTimeouts {
        tool: Duration::from_secs(2),
        ..Default::default()
    })
    .build()
}

pub(crate) fn sink() -> Option<Arc<dyn AudioSink>> {
    Some(Arc::new(FakeSink::default()))
}
