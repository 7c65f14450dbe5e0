//! # Record Module
//!
//! The immutable log entry consumed by every view, and the typed payloads
//! records are converted into at the fold boundary.
//!
//! Payloads arrive as opaque JSON. [`Record::payload`] converts them into a
//! tagged [`Payload`] whose structs carry only optional fields, so a
//! structurally incomplete record degrades to "nothing to contribute" instead
//! of failing an evaluation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Record type tags understood by the built-in views.
pub mod kinds {
    /// Compiled application module.
    pub const MODULE: &str = "module";
    /// Static asset (markup, images, ...).
    pub const ASSET: &str = "asset";
    /// Compiled router code.
    pub const ROUTER: &str = "router";
    /// Named configuration entity.
    pub const CONFIG: &str = "uno-config";
    /// Registered preset entity.
    pub const PRESET: &str = "uno-preset";
    /// Generated stylesheet output.
    pub const GENERATED_CSS: &str = "css-generated";
}

/// Record operation verbs understood by the built-in views.
pub mod ops {
    pub const ADD: &str = "add";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const REGISTER: &str = "register";
    pub const GENERATE: &str = "generate";
}

// =============================================================================
// RECORD ID
// =============================================================================

/// Monotonic record identifier. Ordering by id is the log's total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// The id following this one, `None` at `u64::MAX`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// An immutable, append-only log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Record {
    /// Create a record without a content fingerprint.
    #[must_use]
    pub fn new(
        id: RecordId,
        kind: impl Into<String>,
        name: impl Into<String>,
        operation: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            id,
            kind: kind.into(),
            name: name.into(),
            operation: operation.into(),
            data,
            hash: None,
        }
    }

    /// Attach a content fingerprint.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Check the record's type tag and operation verb together.
    #[must_use]
    pub fn is(&self, kind: &str, operation: &str) -> bool {
        self.kind == kind && self.operation == operation
    }

    /// Convert the opaque payload into its typed variant.
    ///
    /// Unknown type tags map to [`Payload::Other`]. A payload that is not a
    /// JSON object, or whose fields have the wrong shape, maps to
    /// [`Payload::Malformed`].
    #[must_use]
    pub fn payload(&self) -> Payload {
        let typed = match self.kind.as_str() {
            kinds::MODULE => parse(&self.data).map(Payload::Module),
            kinds::ROUTER => parse(&self.data).map(Payload::Router),
            kinds::ASSET => parse(&self.data).map(Payload::Asset),
            kinds::CONFIG => parse(&self.data).map(Payload::Config),
            kinds::PRESET => parse(&self.data).map(Payload::Preset),
            kinds::GENERATED_CSS => parse(&self.data).map(Payload::GeneratedCss),
            _ => return Payload::Other,
        };
        typed.unwrap_or(Payload::Malformed)
    }
}

fn parse<T: DeserializeOwned>(data: &Value) -> Option<T> {
    if !data.is_object() {
        return None;
    }
    T::deserialize(data).ok()
}

// =============================================================================
// TYPED PAYLOADS
// =============================================================================

/// Record payload, tagged by the record's type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Module(SourcePayload),
    Router(SourcePayload),
    Asset(AssetPayload),
    Config(ConfigPayload),
    Preset(PresetPayload),
    GeneratedCss(GeneratedCssPayload),
    /// A type tag no built-in view reads.
    Other,
    /// A known type tag whose payload could not be read.
    Malformed,
}

/// Source text carried by module and router records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourcePayload {
    pub src: Option<String>,
    pub compiled_src: Option<String>,
}

impl SourcePayload {
    /// Raw source if non-empty, otherwise the compiled source.
    #[must_use]
    pub fn prefer_raw(&self) -> Option<&str> {
        non_empty(self.src.as_deref()).or_else(|| non_empty(self.compiled_src.as_deref()))
    }

    /// Compiled source if non-empty, otherwise the raw source.
    #[must_use]
    pub fn prefer_compiled(&self) -> Option<&str> {
        non_empty(self.compiled_src.as_deref()).or_else(|| non_empty(self.src.as_deref()))
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

/// Static asset payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetPayload {
    pub mime_type: Option<String>,
    pub content: Option<String>,
}

impl AssetPayload {
    /// Whether the declared content type is HTML. Parameters such as
    /// `; charset=utf-8` are ignored.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.mime_type.as_deref().is_some_and(|mime| {
            mime.split(';')
                .next()
                .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("text/html"))
        })
    }

    /// Markup text, if the asset is HTML and not empty.
    #[must_use]
    pub fn html(&self) -> Option<&str> {
        if self.is_html() {
            non_empty(self.content.as_deref())
        } else {
            None
        }
    }
}

/// Configuration entity payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigPayload {
    pub presets: Option<Vec<String>>,
    pub theme: Option<Map<String, Value>>,
    pub rules: Option<Vec<Value>>,
    pub shortcuts: Option<Map<String, Value>>,
    pub path: Option<String>,
    pub created_at: Option<String>,
    pub created_by: Option<String>,
    pub updated_at: Option<String>,
    pub updated_by: Option<String>,
}

/// Preset registration payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PresetPayload {
    pub module: Option<String>,
    pub path: Option<String>,
    /// Any JSON number; floats are truncated, non-numbers read as absent.
    #[serde(deserialize_with = "lenient_i64")]
    pub priority: Option<i64>,
    pub config: Option<Map<String, Value>>,
    pub registered_at: Option<String>,
    pub registered_by: Option<String>,
}

/// Generated stylesheet payload.
///
/// Only the fields the lookup reads are declared. A stray type on
/// `generatedAt` or `classCount` reads as absent so the record still
/// replaces the one held before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratedCssPayload {
    pub content: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub generated_at: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub class_count: Option<u64>,
}

// =============================================================================
// LENIENT FIELDS
// =============================================================================

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))))
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    // Negative numbers saturate to 0 through the float cast.
    Ok(value
        .as_ref()
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64))))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    }))
}

// =============================================================================
// TESTS
// =============================================================================
