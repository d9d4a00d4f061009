//! Shared utilities for the Tsuchi workspace.

pub mod logger;
