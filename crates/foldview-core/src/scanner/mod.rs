//! # Class Scanner
//!
//! Extracts the utility-class tokens referenced across already-produced
//! artifacts in the log: compiled modules, HTML assets and compiled routers.
//!
//! No single pattern separates real class tokens from templated noise, so
//! module source goes through three passes:
//!
//! 1. quoted `class`/`className` attributes, tokens kept verbatim;
//! 2. ``className={`...`}`` templates with `${...}` spans blanked out and
//!    expression leftovers dropped;
//! 3. double-quoted literals carrying a class marker (`bg-`, `flex`,
//!    `hover:` ...), tokens kept only if they look like class names.
//!
//! Markup assets and routers only get the plain `class="..."` pass.
//!
//! Bundled, vendor and runtime-core modules are skipped: they hold minified
//! library code that would flood the result with false positives.

mod patterns;

pub use patterns::{
    Attribute, CLASS_MARKERS, is_class_token, marked_literals, quoted_attribute,
    template_attribute,
};

use crate::record::{Payload, Record, kinds, ops};
use crate::reducer::{Reducer, bool_param};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::trace;

/// Module names containing any of these are never scanned.
pub const EXCLUDED_NAME_FRAGMENTS: &[&str] = &[".bundle", "unocss-core"];

/// Whether a module name matches the exclusion rule.
#[must_use]
pub fn is_excluded(name: &str) -> bool {
    EXCLUDED_NAME_FRAGMENTS
        .iter()
        .any(|fragment| name.contains(fragment))
}

// =============================================================================
// PARAMETERS / STATE / RESULT
// =============================================================================

/// Which artifact categories to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParams {
    pub include_modules: bool,
    pub include_assets: bool,
    pub include_routers: bool,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            include_modules: true,
            include_assets: true,
            include_routers: true,
        }
    }
}

/// Accumulator for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    pub classes: BTreeSet<String>,
    pub scanned_records: u64,
}

/// Deduplicated, sorted class tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub classes: Vec<String>,
    pub count: usize,
    pub scanned_records: u64,
}

// =============================================================================
// REDUCER
// =============================================================================

/// The `scan-classes` view.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassScanner;

impl ClassScanner {
    fn scan_module(record: &Record, state: &mut ScanState) {
        if is_excluded(&record.name) {
            trace!(record = %record.id, name = %record.name, "skipping excluded module");
            return;
        }
        let Payload::Module(source) = record.payload() else {
            return;
        };
        let Some(text) = source.prefer_raw() else {
            return;
        };

        quoted_attribute(text, Attribute::ClassLike, &mut state.classes);
        template_attribute(text, &mut state.classes);
        marked_literals(text, &mut state.classes);
        state.scanned_records = state.scanned_records.saturating_add(1);
    }

    fn scan_asset(record: &Record, state: &mut ScanState) {
        let Payload::Asset(asset) = record.payload() else {
            return;
        };
        let Some(markup) = asset.html() else {
            return;
        };

        quoted_attribute(markup, Attribute::Class, &mut state.classes);
        state.scanned_records = state.scanned_records.saturating_add(1);
    }

    fn scan_router(record: &Record, state: &mut ScanState) {
        let Payload::Router(source) = record.payload() else {
            return;
        };
        let Some(text) = source.prefer_compiled() else {
            return;
        };

        quoted_attribute(text, Attribute::Class, &mut state.classes);
        state.scanned_records = state.scanned_records.saturating_add(1);
    }
}

impl Reducer for ClassScanner {
    type Params = ScanParams;
    type State = ScanState;
    type Output = ScanResult;

    fn name(&self) -> &'static str {
        "scan-classes"
    }

    fn resolve_params(&self, raw: &Value) -> ScanParams {
        let defaults = ScanParams::default();
        ScanParams {
            include_modules: bool_param(raw, "includeModules", defaults.include_modules),
            include_assets: bool_param(raw, "includeAssets", defaults.include_assets),
            include_routers: bool_param(raw, "includeRouters", defaults.include_routers),
        }
    }

    fn init(&self) -> ScanState {
        ScanState::default()
    }

    fn update(&self, record: &Record, state: &mut ScanState, params: &ScanParams) {
        if record.operation != ops::ADD {
            return;
        }
        match record.kind.as_str() {
            kinds::MODULE if params.include_modules => Self::scan_module(record, state),
            kinds::ASSET if params.include_assets => Self::scan_asset(record, state),
            kinds::ROUTER if params.include_routers => Self::scan_router(record, state),
            _ => {}
        }
    }

    fn transform(&self, state: ScanState, _params: &ScanParams) -> ScanResult {
        let classes: Vec<String> = state.classes.into_iter().collect();
        ScanResult {
            count: classes.len(),
            classes,
            scanned_records: state.scanned_records,
        }
    }
}

// =============================================================================
// FREE-FUNCTION FORM
// =============================================================================

/// See [`Reducer::resolve_params`].
pub fn resolve_params(raw: &Value) -> ScanParams {
    ClassScanner.resolve_params(raw)
}

/// See [`Reducer::init`].
pub fn init() -> ScanState {
    ClassScanner.init()
}

/// See [`Reducer::update`].
pub fn update(record: &Record, state: &mut ScanState, params: &ScanParams) {
    ClassScanner.update(record, state, params);
}

/// See [`Reducer::transform`].
pub fn transform(state: ScanState, params: &ScanParams) -> ScanResult {
    ClassScanner.transform(state, params)
}

// =============================================================================
// TESTS
// =============================================================================
