//! Signals exchanged between an embedded assistant and its host page.

use std::fmt;
use std::str::FromStr;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedSignal {
    /// The embedded app finished loading.
    Ready,
    /// The host asks the app to initialize.
    Init,
    /// Initialization finished and the app is usable.
    InitLoaded,
    Open,
    Close,
}

impl EmbedSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedSignal::Ready => "APIKA_READY",
            EmbedSignal::Init => "APIKA_INIT",
            EmbedSignal::InitLoaded => "APIKA",
            EmbedSignal::Open => "APIKA_OPEN",
            EmbedSignal::Close => "APIKA_CLOSE",
        }
    }
}

impl fmt::Display for EmbedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown embed signal: {0}")]
pub struct UnknownSignal(String);

impl FromStr for EmbedSignal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APIKA_READY" => Ok(EmbedSignal::Ready),
            "APIKA_INIT" => Ok(EmbedSignal::Init),
            "APIKA" => Ok(EmbedSignal::InitLoaded),
            "APIKA_OPEN" => Ok(EmbedSignal::Open),
            "APIKA_CLOSE" => Ok(EmbedSignal::Close),
            other => Err(UnknownSignal(other.to_string())),
        }
    }
}

impl serde::Serialize for EmbedSignal {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for EmbedSignal {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SignalMessage {
    pub signal: EmbedSignal,
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// Fan-out of embed signals to every subscriber.
#[derive(Debug, Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<SignalMessage>,
}

impl SignalBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns how many subscribers received the signal.
    pub fn publish(&self, signal: EmbedSignal, detail: serde_json::Value) -> usize {
        tracing::debug!("embed signal: {}", signal);
        self.tx.send(SignalMessage { signal, detail }).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SignalMessage> {
        self.tx.subscribe()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(16)
    }
}
