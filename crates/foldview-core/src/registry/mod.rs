//! # Registry Views
//!
//! Upsert-style views built directly on the reducer contract:
//!
//! - [`ConfigRegistry`]: named configurations, last write wins per name,
//!   sorted by name.
//! - [`PresetRegistry`]: registered presets, sorted by priority (highest
//!   first) then name.
//! - [`GeneratedCssLookup`]: the most recent generated stylesheet for one
//!   configuration name.

mod configs;
mod generated;
mod presets;

pub use configs::{ConfigEntry, ConfigList, ConfigRegistry};
pub use generated::{GeneratedCss, GeneratedCssLookup, GeneratedCssParams, GeneratedCssState};
pub use presets::{DEFAULT_PRIORITY, PresetEntry, PresetList, PresetParams, PresetRegistry};

/// Free-function form of the configuration view.
pub mod config_view {
    pub use super::configs::{init, resolve_params, transform, update};
}

/// Free-function form of the preset view.
pub mod preset_view {
    pub use super::presets::{init, resolve_params, transform, update};
}

/// Free-function form of the generated stylesheet lookup.
pub mod generated_css_view {
    pub use super::generated::{init, resolve_params, transform, update};
}
