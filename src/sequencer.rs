//! The turn sequencer: the state machine at the heart of the chat widget.
//!
//! One sequencer instance drives one conversation. A submitted user turn
//! goes through a single gateway round-trip, the reply is split into
//! fragments, and each fragment is played back with simulated typing
//! pacing: a pending placeholder appears, delays elapse, the placeholder
//! resolves to real content. While any of that is in flight the sequencer
//! is busy and further submissions are rejected as no-ops, so two
//! round-trips can never interleave and at most one placeholder exists at
//! a time.
//!
//! Execution is cooperative: all waiting is `tokio::time::sleep` plus the
//! one outstanding network call. An in-flight turn always runs to
//! completion; the busy guard prevents starting a second one, it does not
//! abort the first.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::events::ChatEvent;
use crate::fragment::fragment;
use crate::gateway::ResponderGateway;
use crate::session::SessionContext;
use crate::transcript::{Transcript, Turn};

/// Fixed trigger text for the session-initiated greeting flow.
pub const CONSULTATION_TRIGGER: &str = "Iniciar consulta gratuita";

/// Where the sequencer is in its send cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Ready to accept a user turn.
    Idle,
    /// Gateway round-trip in flight.
    AwaitingGatewayReply,
    /// Playing reply fragments back with typing pacing.
    EmittingFragment,
}

/// Delay profile for fragment playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause before the typing animation starts ("noticing" the message).
    pub pre_type: Duration,
    /// Typing time charged per character of the fragment.
    pub per_char: Duration,
    /// Upper bound on the computed typing time.
    pub max_typing: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            pre_type: Duration::from_millis(500),
            per_char: Duration::from_millis(50),
            max_typing: Duration::from_millis(2000),
        }
    }
}

impl Pacing {
    /// All-zero pacing, for one-shot runs and tests that only care about
    /// sequencing.
    pub fn instant() -> Self {
        Self {
            pre_type: Duration::ZERO,
            per_char: Duration::ZERO,
            max_typing: Duration::ZERO,
        }
    }

    /// Typing time for a fragment of `chars` characters, capped at
    /// `max_typing`.
    pub fn typing_delay(&self, chars: usize) -> Duration {
        let chars = u32::try_from(chars).unwrap_or(u32::MAX);
        self.per_char.saturating_mul(chars).min(self.max_typing)
    }
}

/// Result of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The turn ran to completion; `fragments` bot turns were emitted.
    Completed { fragments: usize },
    /// Rejected: another turn is in flight. The log is unchanged.
    Busy,
    /// Rejected: input was empty after trimming. The log is unchanged.
    EmptyInput,
}

/// Which flow initiated the turn; the greeting flow skips the pre-type
/// pause for its first fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    UserSend,
    Greeting,
}

/// Orchestrates one conversation against a responder gateway.
pub struct TurnSequencer {
    gateway: Arc<dyn ResponderGateway>,
    session: SessionContext,
    transcript: Transcript,
    state: Mutex<SequencerState>,
    pacing: Pacing,
    events_tx: Option<mpsc::UnboundedSender<ChatEvent>>,
}

impl TurnSequencer {
    /// The channel is unbounded so every log and state change reaches the
    /// presentation surface; a dropped receiver just ends delivery.
    pub fn new(
        gateway: Arc<dyn ResponderGateway>,
        session: SessionContext,
        pacing: Pacing,
        events_tx: Option<mpsc::UnboundedSender<ChatEvent>>,
    ) -> Self {
        Self {
            gateway,
            session,
            transcript: Transcript::new(),
            state: Mutex::new(SequencerState::Idle),
            pacing,
            events_tx,
        }
    }

    /// Handle to the conversation log. Read-only by convention: only the
    /// sequencer mutates it.
    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn state(&self) -> SequencerState {
        *self.state.lock().unwrap()
    }

    /// Submit a user turn. Empty input and submissions while busy are
    /// rejected without touching the log.
    pub async fn submit(&self, input: &str) -> TurnOutcome {
        self.run_turn(input, Flow::UserSend).await
    }

    /// Open the conversation with the fixed greeting trigger, through the
    /// same pipeline as a regular send.
    pub async fn start_consultation(&self) -> TurnOutcome {
        self.run_turn(CONSULTATION_TRIGGER, Flow::Greeting).await
    }

    async fn run_turn(&self, input: &str, flow: Flow) -> TurnOutcome {
        let text = input.trim();
        if text.is_empty() {
            return TurnOutcome::EmptyInput;
        }
        if !self.try_begin() {
            debug!("submission rejected, sequencer busy");
            return TurnOutcome::Busy;
        }

        info!(session = self.session.id(), "user turn accepted");
        let index = self.transcript.push_user(text);
        self.emit(ChatEvent::TurnAppended {
            index,
            turn: Turn::user(text),
        });

        let payloads = self.gateway.send(text, &self.session).await;
        let fragments = fragment(&payloads);
        if fragments.is_empty() {
            self.set_state(SequencerState::Idle);
            return TurnOutcome::Completed { fragments: 0 };
        }

        self.set_state(SequencerState::EmittingFragment);
        for (position, segment) in fragments.iter().enumerate() {
            self.play_fragment(segment, position, flow).await;
        }
        self.set_state(SequencerState::Idle);

        TurnOutcome::Completed {
            fragments: fragments.len(),
        }
    }

    /// One iteration of the emitting loop: placeholder, pacing, resolve.
    async fn play_fragment(&self, segment: &str, position: usize, flow: Flow) {
        let index = self.transcript.push_typing();
        self.emit(ChatEvent::TurnAppended {
            index,
            turn: Turn::typing(),
        });

        let pre_type = match flow {
            Flow::Greeting if position == 0 => Duration::ZERO,
            _ => self.pacing.pre_type,
        };
        sleep(pre_type).await;
        sleep(self.pacing.typing_delay(segment.chars().count())).await;

        if let Some((index, turn)) = self.transcript.resolve_typing(segment) {
            self.emit(ChatEvent::TurnResolved { index, turn });
        }
    }

    /// Compare-and-set busy guard: Idle -> AwaitingGatewayReply.
    fn try_begin(&self) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            if *state != SequencerState::Idle {
                return false;
            }
            *state = SequencerState::AwaitingGatewayReply;
        }
        self.emit(ChatEvent::StateChanged(SequencerState::AwaitingGatewayReply));
        true
    }

    fn set_state(&self, next: SequencerState) {
        *self.state.lock().unwrap() = next;
        self.emit(ChatEvent::StateChanged(next));
    }

    fn emit(&self, event: ChatEvent) {
        if let Some(tx) = &self.events_tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_delay_is_proportional_and_capped() {
        let pacing = Pacing::default();
        assert_eq!(pacing.typing_delay(10), Duration::from_millis(500));
        assert_eq!(pacing.typing_delay(60), Duration::from_millis(2000));
        assert_eq!(pacing.typing_delay(1000), Duration::from_millis(2000));
        assert_eq!(pacing.typing_delay(0), Duration::ZERO);
    }

    #[test]
    fn test_instant_pacing_is_all_zero() {
        let pacing = Pacing::instant();
        assert_eq!(pacing.typing_delay(5000), Duration::ZERO);
        assert_eq!(pacing.pre_type, Duration::ZERO);
    }
}
