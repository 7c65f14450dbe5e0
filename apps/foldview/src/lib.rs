//! # Foldview Library
//!
//! This library exposes the Foldview command layer for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;

// Re-export foldview_core for convenience
pub use foldview_core;
