//! The conversation log: an ordered, append-only record of turns.
//!
//! The transcript is owned by the [`TurnSequencer`](crate::sequencer::TurnSequencer)
//! for mutation; presentation surfaces hold a cloned handle and only read.
//! Bot turns pass through a short "pending" phase while the typing
//! animation plays; at most one turn is pending at any instant, and
//! resolving targets exactly that entry.

use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// One message in the conversation.
///
/// A turn with `pending = true` is a placeholder for a bot reply whose
/// content is still being "typed"; its `content` is empty until the
/// sequencer resolves it. User turns are never pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub content: String,
    pub pending: bool,
}

impl Turn {
    /// A resolved user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            pending: false,
        }
    }

    /// A resolved bot turn.
    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            content: content.into(),
            pending: false,
        }
    }

    /// A pending bot placeholder ("typing" indicator).
    pub fn typing() -> Self {
        Self {
            speaker: Speaker::Bot,
            content: String::new(),
            pending: true,
        }
    }
}

/// Shared handle to the ordered conversation log.
///
/// Cloning is cheap; all clones observe the same log. Insertion order is
/// display order. Turns are never deleted individually; [`clear`] exists
/// only for a full session reset.
///
/// [`clear`]: Transcript::clear
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Arc<Mutex<Vec<Turn>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolved user turn. Returns its index.
    pub fn push_user(&self, content: impl Into<String>) -> usize {
        self.push(Turn::user(content))
    }

    /// Append a pending bot placeholder. Returns its index.
    pub fn push_typing(&self) -> usize {
        let mut turns = self.turns.lock().unwrap();
        debug_assert!(
            turns.iter().all(|t| !t.pending),
            "a typing placeholder is already present"
        );
        turns.push(Turn::typing());
        turns.len() - 1
    }

    fn push(&self, turn: Turn) -> usize {
        let mut turns = self.turns.lock().unwrap();
        turns.push(turn);
        turns.len() - 1
    }

    /// Replace the single pending placeholder with a resolved bot turn.
    ///
    /// Targets only the currently-pending entry; resolved turns are
    /// immutable. Returns the index and the resolved turn, or `None` if
    /// no placeholder exists.
    pub fn resolve_typing(&self, content: impl Into<String>) -> Option<(usize, Turn)> {
        let mut turns = self.turns.lock().unwrap();
        let index = turns.iter().position(|t| t.pending)?;
        let resolved = Turn::bot(content);
        turns[index] = resolved.clone();
        Some((index, resolved))
    }

    /// Snapshot of the log in display order.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.turns.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.lock().unwrap().is_empty()
    }

    /// Number of pending placeholders. Never exceeds one.
    pub fn pending_count(&self) -> usize {
        self.turns.lock().unwrap().iter().filter(|t| t.pending).count()
    }

    /// Full session reset. Not driven by any current flow.
    pub fn clear(&self) {
        self.turns.lock().unwrap().clear();
    }
}
