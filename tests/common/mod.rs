//! Common test utilities shared across integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chama_chat::{ChatEvent, ReplyPayload, ResponderGateway, SessionContext};
use tokio::sync::{Notify, mpsc};

/// A recorded outgoing turn: message text plus the session id it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTurn {
    pub message: String,
    pub session_id: String,
}

/// Gateway returning the same payload sequence for every turn, recording
/// what was sent.
pub struct StubGateway {
    replies: Vec<ReplyPayload>,
    sent: Mutex<Vec<SentTurn>>,
}

impl StubGateway {
    pub fn with_output(output: &str) -> Self {
        Self::with_payloads(vec![ReplyPayload::text(output)])
    }

    pub fn with_payloads(replies: Vec<ReplyPayload>) -> Self {
        Self {
            replies,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentTurn> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponderGateway for StubGateway {
    async fn send(&self, message: &str, session: &SessionContext) -> Vec<ReplyPayload> {
        self.sent.lock().unwrap().push(SentTurn {
            message: message.to_string(),
            session_id: session.id().to_string(),
        });
        self.replies.clone()
    }
}

/// Gateway that parks every call until released, holding the sequencer in
/// the awaiting-reply state for as long as a test needs.
pub struct GatedGateway {
    release: Arc<Notify>,
    replies: Vec<ReplyPayload>,
}

impl GatedGateway {
    pub fn with_output(output: &str) -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        let gateway = Self {
            release: release.clone(),
            replies: vec![ReplyPayload::text(output)],
        };
        (gateway, release)
    }
}

#[async_trait]
impl ResponderGateway for GatedGateway {
    async fn send(&self, _message: &str, _session: &SessionContext) -> Vec<ReplyPayload> {
        self.release.notified().await;
        self.replies.clone()
    }
}

/// Drain all events currently sitting in the channel without blocking.
#[allow(dead_code)]
pub fn collect_events(rx: &mut mpsc::UnboundedReceiver<ChatEvent>) -> Vec<ChatEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
