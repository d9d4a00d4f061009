//! Trigger endpoint for document-created events.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, TRIGGER_PATH};
