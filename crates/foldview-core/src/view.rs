//! # View Module
//!
//! Named-view dispatch: pick a reducer by name and return its result as JSON.

use crate::reducer::{Reducer, evaluate};
use crate::registry::{ConfigRegistry, GeneratedCssLookup, PresetRegistry};
use crate::scanner::ClassScanner;
use crate::store::RecordSource;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The built-in derived views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewKind {
    ScanClasses,
    GetConfigs,
    GetPresets,
    GetGeneratedCss,
}

impl ViewKind {
    /// Every view, in listing order.
    pub const ALL: [ViewKind; 4] = [
        ViewKind::ScanClasses,
        ViewKind::GetConfigs,
        ViewKind::GetPresets,
        ViewKind::GetGeneratedCss,
    ];

    /// Stable name, shared with the reducer.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ScanClasses => ClassScanner.name(),
            Self::GetConfigs => ConfigRegistry.name(),
            Self::GetPresets => PresetRegistry.name(),
            Self::GetGeneratedCss => GeneratedCssLookup.name(),
        }
    }

    /// One-line description for listings.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::ScanClasses => "utility-class tokens referenced by modules, HTML assets and routers",
            Self::GetConfigs => "named configurations, latest record per name",
            Self::GetPresets => "registered presets by priority",
            Self::GetGeneratedCss => "latest generated stylesheet for `configName`",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownView(s.to_string()))
    }
}

/// Evaluate a view by kind and serialize its result.
pub fn evaluate_view<S>(kind: ViewKind, source: &S, raw: &Value) -> Result<Value>
where
    S: RecordSource + ?Sized,
{
    let value = match kind {
        ViewKind::ScanClasses => serde_json::to_value(evaluate(&ClassScanner, source, raw)?)?,
        ViewKind::GetConfigs => serde_json::to_value(evaluate(&ConfigRegistry, source, raw)?)?,
        ViewKind::GetPresets => serde_json::to_value(evaluate(&PresetRegistry, source, raw)?)?,
        ViewKind::GetGeneratedCss => {
            serde_json::to_value(evaluate(&GeneratedCssLookup, source, raw)?)?
        }
    };
    Ok(value)
}

// =============================================================================
// TESTS
// =============================================================================
