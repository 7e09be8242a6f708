//! Editor session module
//!
//! This module contains:
//! - The editor state store (state.rs)
//! - Message types for editor interactions (messages.rs)

pub mod messages;
pub mod state;
