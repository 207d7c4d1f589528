//! # Events Module
//!
//! Event-driven progress reporting for GUI-ready consumption.
//!
//! ## Design
//! The core pipeline emits one event per file outcome (placed, duplicate,
//! renamed, deleted, error) plus walk progress through a channel; any UI
//! (CLI, GUI, web) subscribes on the receiving end. The final counters
//! snapshot arrives with [`PipelineEvent::Completed`].

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
