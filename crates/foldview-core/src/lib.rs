//! # Foldview Core - The Logic
//!
//! Deterministic derived views over an append-only, immutable record log.
//!
//! Every view is a [`Reducer`]: parameters are resolved once, the record
//! sequence is fetched once, records are folded in ascending id order into a
//! private accumulator, and the accumulator is transformed into a
//! serializable result.
//!
//! ## Views
//!
//! | View                  | Reducer                        | Result                          |
//! |-----------------------|--------------------------------|---------------------------------|
//! | `scan-classes`        | [`ClassScanner`]               | [`ScanResult`]                  |
//! | `get-configs`         | [`registry::ConfigRegistry`]   | [`registry::ConfigList`]        |
//! | `get-presets`         | [`registry::PresetRegistry`]   | [`registry::PresetList`]        |
//! | `get-generated-css`   | [`registry::GeneratedCssLookup`] | [`registry::GeneratedCss`]    |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  fetch once   ┌──────────────┐  fold by id  ┌──────────────┐
//! │ RecordSource │ ────────────► │   evaluate   │ ───────────► │   Reducer    │
//! │ (RecordLog)  │               │   (harness)  │              │ init/update/ │
//! └──────────────┘               └──────────────┘              │  transform   │
//!                                                              └──────────────┘
//! ```
//!
//! Nothing in this crate writes records, performs I/O or blocks.

pub mod cache;
pub mod record;
pub mod reducer;
pub mod registry;
pub mod scanner;
pub mod store;
pub mod view;

pub use cache::{ViewCache, ViewCacheKey};
pub use record::{Payload, Record, RecordId};
pub use reducer::{Reducer, evaluate, fold};
pub use scanner::{ClassScanner, ScanParams, ScanResult};
pub use store::{LogSnapshot, RecordFilter, RecordLog, RecordSource};
pub use view::{ViewKind, evaluate_view};

use thiserror::Error;

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors surfaced by the core.
///
/// Malformed records are never errors; reducers skip them. Only the record
/// fetch, log appends and the named-view boundary can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// The record source could not produce a snapshot.
    #[error("record store error: {0}")]
    Store(String),

    /// A record was appended with an id that does not advance the log.
    #[error("record id {next} does not follow {previous}")]
    OutOfOrder {
        /// Last id currently held by the log.
        previous: RecordId,
        /// Rejected id.
        next: RecordId,
    },

    /// The log already holds the largest representable id.
    #[error("record id space exhausted after {0}")]
    IdExhausted(RecordId),

    /// No view is registered under the requested name.
    #[error("unknown view: {0}")]
    UnknownView(String),

    /// A view result could not be converted to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
