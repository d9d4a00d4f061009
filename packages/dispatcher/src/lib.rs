//! Notification dispatcher library.
//!
//! Reacts to newly created notification documents, delivers them through a
//! push-messaging provider and flags them as sent.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// configuration
pub mod config;
