//! Core application module
//!
//! This module contains:
//! - The editor session wiring store, preview renderer and exporter
//! - Command dispatch for the CLI

pub mod app;
