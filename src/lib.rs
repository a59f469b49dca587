//! Chama Gêmea chat library - the conversation sequencer behind the
//! landing-page widget.
//!
//! The binary crate (main.rs) is a terminal presentation surface over
//! these same modules; integration tests drive them directly.

pub mod config;
pub mod events;
pub mod fragment;
pub mod gateway;
pub mod logging;
pub mod sequencer;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use events::{ChatEvent, EventHandler, dispatch_event};
pub use gateway::{CONNECTION_APOLOGY, ReplyPayload, ResponderGateway, WebhookGateway};
pub use sequencer::{CONSULTATION_TRIGGER, Pacing, SequencerState, TurnOutcome, TurnSequencer};
pub use session::SessionContext;
pub use transcript::{Speaker, Transcript, Turn};
