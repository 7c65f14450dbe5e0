//! # Reducer Module
//!
//! The four-stage evaluation contract every derived view implements, and the
//! harness that drives it.
//!
//! ```text
//! resolve_params(raw) ─► init() ─► update(record, &mut state) × N ─► transform(state)
//! ```
//!
//! The harness fetches the record sequence exactly once, calls `update` once
//! per record in ascending id order, then calls `transform` once. State is
//! owned by the harness for the duration of one evaluation and never shared.

use crate::record::Record;
use crate::store::{RecordFilter, RecordSource};
use crate::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

// =============================================================================
// REDUCER TRAIT
// =============================================================================

/// A derived view over the record log.
///
/// Implementations must be pure: the output depends only on the folded
/// records and the resolved parameters.
pub trait Reducer {
    /// Resolved query parameters, immutable for one evaluation.
    type Params;
    /// Private accumulator.
    type State;
    /// Serialization-ready result.
    type Output: Serialize;

    /// Stable view name, used for dispatch and logging.
    fn name(&self) -> &'static str;

    /// Store-side filter for the single fetch. Defaults to every record.
    ///
    /// Narrowing the fetch must not change the output; `update` still
    /// checks every record it is handed.
    fn filter(&self, _params: &Self::Params) -> RecordFilter {
        RecordFilter::all()
    }

    /// Merge caller overrides onto fixed defaults. Never fails: missing or
    /// wrongly typed keys fall back to their default.
    fn resolve_params(&self, raw: &Value) -> Self::Params;

    /// Fresh, empty accumulator.
    fn init(&self) -> Self::State;

    /// Fold one record into the accumulator.
    ///
    /// Records this view does not care about, and structurally incomplete
    /// records, leave the state untouched.
    fn update(&self, record: &Record, state: &mut Self::State, params: &Self::Params);

    /// Produce the externally visible result.
    fn transform(&self, state: Self::State, params: &Self::Params) -> Self::Output;
}

// =============================================================================
// HARNESS
// =============================================================================

/// Fold an already-ordered record sequence through a reducer.
///
/// `records` must be in ascending id order.
pub fn fold<R: Reducer + ?Sized>(reducer: &R, records: &[Record], params: &R::Params) -> R::Output {
    let mut state = reducer.init();
    for record in records {
        reducer.update(record, &mut state, params);
    }
    reducer.transform(state, params)
}

/// Evaluate a view: resolve parameters, fetch once, fold, transform.
///
/// The fetch is the only fallible step.
pub fn evaluate<R, S>(reducer: &R, source: &S, raw: &Value) -> Result<R::Output>
where
    R: Reducer + ?Sized,
    S: RecordSource + ?Sized,
{
    let params = reducer.resolve_params(raw);
    let filter = reducer.filter(&params);
    let mut records = source.fetch(&filter)?;

    if !records.is_sorted_by_key(|r| r.id) {
        warn!(view = reducer.name(), "record source returned records out of id order, re-sorting");
        records.sort_by_key(|r| r.id);
    }

    debug!(view = reducer.name(), records = records.len(), "evaluating view");
    let output = fold(reducer, &records, &params);
    debug!(view = reducer.name(), "view evaluated");

    Ok(output)
}

// =============================================================================
// PARAMETER HELPERS
// =============================================================================

/// Read a boolean override, falling back to `default`.
#[must_use]
pub fn bool_param(raw: &Value, key: &str, default: bool) -> bool {
    raw.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Read a string override, falling back to `default`.
#[must_use]
pub fn str_param(raw: &Value, key: &str, default: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

// =============================================================================
// TESTS
// =============================================================================
