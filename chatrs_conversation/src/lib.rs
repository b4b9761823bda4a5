#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Session state management for a single-user chat.
//!
//! A session holds the visible transcript and the memory buffer fed back to
//! the model, and applies the lifecycle actions to both:
//! - submit a message and record the reply
//! - retry the last reply
//! - clear the chat (memory too, depending on [`ClearPolicy`])
//! - reset the whole session
//! - export the transcript as plain text

mod command;
mod error;
mod export;
mod history;
mod manager;
mod session;

pub use chatrs_core::ClearPolicy;
pub use command::SlashCommand;
pub use error::ConversationError;
pub use export::{EXPORT_FILE_NAME, write_export};
pub use history::{History, HistoryStats};
pub use manager::{ConversationManager, TurnResult};
pub use session::{ChatSession, ChatSettings, SessionState};
