//! Event handling for presentation surfaces.
//!
//! The sequencer emits [`ChatEvent`]s through a channel instead of relying
//! on any rendering framework's re-render machinery. Each surface
//! implements [`EventHandler`] and receives a notification for every
//! conversation-log change and every sequencer state change, which is all
//! it needs to honor the contract:
//!
//! - re-run scroll-to-bottom whenever the log changes;
//! - render a distinguishable transient state for pending turns;
//! - disable the send affordance while the sequencer is not idle.

use std::io::Write;

use colored::Colorize;
use tracing::trace;

use crate::sequencer::SequencerState;
use crate::transcript::{Speaker, Turn};

/// Notifications emitted by the sequencer.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A turn was appended to the conversation log. Pending bot
    /// placeholders arrive through this variant too.
    TurnAppended { index: usize, turn: Turn },

    /// The pending placeholder at `index` was replaced with its resolved
    /// content.
    TurnResolved { index: usize, turn: Turn },

    /// The sequencer moved to a new state.
    StateChanged(SequencerState),
}

/// Handler for chat events. Presentation surfaces implement this.
pub trait EventHandler {
    /// A turn (possibly a pending placeholder) was appended.
    fn on_turn_appended(&mut self, index: usize, turn: &Turn);

    /// The pending placeholder was resolved with real content.
    fn on_turn_resolved(&mut self, index: usize, turn: &Turn);

    /// Sequencer state changed (optional, default no-op).
    fn on_state_changed(&mut self, _state: SequencerState) {}
}

/// Central dispatch with trace logging.
pub fn dispatch_event(handler: &mut dyn EventHandler, event: &ChatEvent) {
    trace!(?event, "chat event");
    match event {
        ChatEvent::TurnAppended { index, turn } => handler.on_turn_appended(*index, turn),
        ChatEvent::TurnResolved { index, turn } => handler.on_turn_resolved(*index, turn),
        ChatEvent::StateChanged(state) => handler.on_state_changed(*state),
    }
}

const USER_LABEL: &str = "você";
const BOT_LABEL: &str = "consultora";

/// Event handler for the terminal REPL.
///
/// Printing at the bottom of a scrolling terminal is the scroll-to-bottom
/// behavior; the typing placeholder is drawn without a newline and the
/// line is rewritten in place once the turn resolves.
#[derive(Debug, Default)]
pub struct TerminalEventHandler {
    typing_shown: bool,
}

impl TerminalEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_typing_line(&mut self) {
        if self.typing_shown {
            print!("\r\x1b[2K");
            self.typing_shown = false;
        }
    }
}

impl EventHandler for TerminalEventHandler {
    fn on_turn_appended(&mut self, _index: usize, turn: &Turn) {
        if turn.pending {
            print!(
                "{} {}",
                format!("{BOT_LABEL}:").magenta().bold(),
                "está digitando…".dimmed()
            );
            let _ = std::io::stdout().flush();
            self.typing_shown = true;
            return;
        }

        match turn.speaker {
            Speaker::User => {
                println!("{} {}", format!("{USER_LABEL}:").cyan().bold(), turn.content);
            }
            Speaker::Bot => {
                println!(
                    "{} {}",
                    format!("{BOT_LABEL}:").magenta().bold(),
                    turn.content
                );
            }
        }
    }

    fn on_turn_resolved(&mut self, _index: usize, turn: &Turn) {
        self.clear_typing_line();
        println!(
            "{} {}",
            format!("{BOT_LABEL}:").magenta().bold(),
            turn.content
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records events in arrival order for assertions.
    #[derive(Debug, Default)]
    struct RecordingHandler {
        seen: Vec<String>,
    }

    impl EventHandler for RecordingHandler {
        fn on_turn_appended(&mut self, index: usize, turn: &Turn) {
            self.seen.push(format!("appended {index} {}", turn.pending));
        }

        fn on_turn_resolved(&mut self, index: usize, turn: &Turn) {
            self.seen.push(format!("resolved {index} {}", turn.content));
        }

        fn on_state_changed(&mut self, state: SequencerState) {
            self.seen.push(format!("state {state:?}"));
        }
    }

    #[test]
    fn test_dispatch_routes_each_variant() {
        let mut handler = RecordingHandler::default();

        dispatch_event(
            &mut handler,
            &ChatEvent::TurnAppended {
                index: 0,
                turn: Turn::typing(),
            },
        );
        dispatch_event(
            &mut handler,
            &ChatEvent::TurnResolved {
                index: 0,
                turn: Turn::bot("Oi!"),
            },
        );
        dispatch_event(&mut handler, &ChatEvent::StateChanged(SequencerState::Idle));

        assert_eq!(
            handler.seen,
            vec!["appended 0 true", "resolved 0 Oi!", "state Idle"]
        );
    }
}
