use crate::interpreter::Interpretation;
use apika_types::TokenUsage;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Ai,
}

/// One transcript line. Deltas for the same id are appended to `content`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConversationDialog {
    pub id: String,
    pub content: String,
    pub speaker: Speaker,
}

/// Observable session state. Every field is a watch channel so a UI can
/// subscribe and re-render on change.
#[derive(Debug)]
pub struct ConversationStore {
    dialogs: watch::Sender<Vec<ConversationDialog>>,
    usage: watch::Sender<Option<TokenUsage>>,
    session_started: watch::Sender<bool>,
    microphone_muted: watch::Sender<bool>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            dialogs: watch::channel(Vec::new()).0,
            usage: watch::channel(None).0,
            session_started: watch::channel(false).0,
            microphone_muted: watch::channel(false).0,
        }
    }

    /// Applies the state changes of one interpreted event. Returns true when
    /// the host should be asked to persist an updated session record.
    pub fn apply(&self, interpretation: &Interpretation) -> bool {
        match interpretation {
            Interpretation::AiTranscriptDelta { response_id, delta } => {
                self.append_dialog(response_id, delta, Speaker::Ai);
                false
            }
            Interpretation::UserTranscript {
                item_id,
                transcript,
            } => {
                self.append_dialog(item_id, transcript, Speaker::User);
                true
            }
            Interpretation::TurnCompleted {
                usage: Some(usage), ..
            } => {
                self.merge_usage(usage);
                true
            }
            _ => false,
        }
    }

    pub fn append_dialog(&self, id: &str, content: &str, speaker: Speaker) {
        self.dialogs.send_modify(|dialogs| {
            match dialogs.iter_mut().find(|d| d.id == id) {
                Some(dialog) => dialog.content.push_str(content),
                None => dialogs.push(ConversationDialog {
                    id: id.to_string(),
                    content: content.to_string(),
                    speaker,
                }),
            }
        });
    }

    pub fn clear_dialogs(&self) {
        self.dialogs.send_modify(Vec::clear);
    }

    pub fn dialogs(&self) -> Vec<ConversationDialog> {
        self.dialogs.borrow().clone()
    }

    pub fn last_dialog(&self) -> Option<ConversationDialog> {
        self.dialogs.borrow().last().cloned()
    }

    /// Adds a usage report to the running total and returns the new total.
    pub fn merge_usage(&self, report: &TokenUsage) -> TokenUsage {
        let mut total = TokenUsage::default();
        self.usage.send_modify(|usage| {
            let running = usage.get_or_insert_with(TokenUsage::default);
            running.merge(report);
            total = *running;
        });
        total
    }

    pub fn usage(&self) -> Option<TokenUsage> {
        *self.usage.borrow()
    }

    pub fn session_started(&self) -> bool {
        *self.session_started.borrow()
    }

    pub(crate) fn set_session_started(&self, started: bool) {
        self.session_started.send_replace(started);
    }

    pub fn microphone_muted(&self) -> bool {
        *self.microphone_muted.borrow()
    }

    pub(crate) fn set_microphone_muted(&self, muted: bool) {
        self.microphone_muted.send_replace(muted);
    }

    pub fn subscribe_dialogs(&self) -> watch::Receiver<Vec<ConversationDialog>> {
        self.dialogs.subscribe()
    }

    pub fn subscribe_usage(&self) -> watch::Receiver<Option<TokenUsage>> {
        self.usage.subscribe()
    }

    pub fn subscribe_session_started(&self) -> watch::Receiver<bool> {
        self.session_started.subscribe()
    }

    pub fn subscribe_microphone_muted(&self) -> watch::Receiver<bool> {
        self.microphone_muted.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_concatenate_in_arrival_order() {
        let store = ConversationStore::new();
        for delta in ["Hel", "lo, ", "world"] {
            store.apply(&Interpretation::AiTranscriptDelta {
                response_id: "r1".into(),
                delta: delta.into(),
            });
        }
        store.apply(&Interpretation::UserTranscript {
            item_id: "u1".into(),
            transcript: "Hi".into(),
        });

        assert_eq!(
            store.dialogs(),
            vec![
                ConversationDialog {
                    id: "r1".into(),
                    content: "Hello, world".into(),
                    speaker: Speaker::Ai
                },
                ConversationDialog {
                    id: "u1".into(),
                    content: "Hi".into(),
                    speaker: Speaker::User
                },
            ]
        );
    }

    #[test]
    fn usage_starts_empty_and_counts_every_report() {
        let store = ConversationStore::new();
        assert_eq!(store.usage(), None);

        let report = TokenUsage {
            total_tokens: 10,
            input_tokens: 4,
            output_tokens: 6,
            ..Default::default()
        };
        store.merge_usage(&report);
        let total = store.merge_usage(&report);

        assert_eq!(total.total_tokens, 20);
        assert_eq!(store.usage().map(|u| u.output_tokens), Some(12));
    }

    #[test]
    fn finished_turns_and_user_speech_ask_for_a_record_update() {
        let store = ConversationStore::new();
        assert!(!store.apply(&Interpretation::AiTranscriptDelta {
            response_id: "r1".into(),
            delta: "Hi".into(),
        }));
        assert!(store.apply(&Interpretation::UserTranscript {
            item_id: "u1".into(),
            transcript: "Hello".into(),
        }));
        assert!(store.apply(&Interpretation::TurnCompleted {
            usage: Some(TokenUsage::default()),
            function_call: None,
        }));
        assert!(!store.apply(&Interpretation::Ignored));
    }

    #[test]
    fn only_clear_removes_dialogs() {
        let store = ConversationStore::new();
        store.append_dialog("a", "x", Speaker::User);
        store.apply(&Interpretation::Ignored);
        assert_eq!(store.dialogs().len(), 1);
        store.clear_dialogs();
        assert!(store.dialogs().is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = ConversationStore::new();
        let mut rx = store.subscribe_dialogs();
        store.append_dialog("a", "x", Speaker::Ai);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }

    #[test]
    fn speaker_wire_names() {
        assert_eq!(serde_json::to_value(Speaker::Ai).unwrap(), "ai");
        assert_eq!(serde_json::to_value(Speaker::User).unwrap(), "user");
    }
}
