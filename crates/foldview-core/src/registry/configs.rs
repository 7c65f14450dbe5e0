//! Configuration registry: one entry per name, later records replace
//! earlier ones wholesale.

use crate::record::{Payload, Record, kinds, ops};
use crate::reducer::Reducer;
use crate::store::RecordFilter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A materialized configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub name: String,
    pub presets: Vec<String>,
    pub theme: Map<String, Value>,
    pub rules: Vec<Value>,
    pub shortcuts: Map<String, Value>,
    pub path: Option<String>,
    pub created_at: Option<String>,
    pub created_by: Option<String>,
    pub updated_at: Option<String>,
    pub updated_by: Option<String>,
}

/// Result of the `get-configs` view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigList {
    pub configs: Vec<ConfigEntry>,
    pub count: usize,
}

/// The `get-configs` view.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigRegistry;

impl Reducer for ConfigRegistry {
    type Params = ();
    type State = BTreeMap<String, ConfigEntry>;
    type Output = ConfigList;

    fn name(&self) -> &'static str {
        "get-configs"
    }

    fn filter(&self, _params: &()) -> RecordFilter {
        RecordFilter::of_kind(kinds::CONFIG)
    }

    fn resolve_params(&self, _raw: &Value) {}

    fn init(&self) -> Self::State {
        BTreeMap::new()
    }

    fn update(&self, record: &Record, state: &mut Self::State, _params: &()) {
        if !(record.is(kinds::CONFIG, ops::CREATE) || record.is(kinds::CONFIG, ops::UPDATE)) {
            return;
        }
        let Payload::Config(data) = record.payload() else {
            return;
        };

        let entry = ConfigEntry {
            name: record.name.clone(),
            presets: data.presets.unwrap_or_default(),
            theme: data.theme.unwrap_or_default(),
            rules: data.rules.unwrap_or_default(),
            shortcuts: data.shortcuts.unwrap_or_default(),
            path: data.path,
            created_at: data.created_at,
            created_by: data.created_by,
            updated_at: data.updated_at,
            updated_by: data.updated_by,
        };
        state.insert(record.name.clone(), entry);
    }

    fn transform(&self, state: Self::State, _params: &()) -> ConfigList {
        let configs: Vec<ConfigEntry> = state.into_values().collect();
        ConfigList {
            count: configs.len(),
            configs,
        }
    }
}

pub fn resolve_params(raw: &Value) {
    ConfigRegistry.resolve_params(raw);
}

pub fn init() -> BTreeMap<String, ConfigEntry> {
    ConfigRegistry.init()
}

pub fn update(record: &Record, state: &mut BTreeMap<String, ConfigEntry>) {
    ConfigRegistry.update(record, state, &());
}

pub fn transform(state: BTreeMap<String, ConfigEntry>) -> ConfigList {
    ConfigRegistry.transform(state, &())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::record::RecordId;
    use crate::reducer::fold;
    use serde_json::json;

    fn config(id: u64, name: &str, op: &str, data: Value) -> Record {
        Record::new(RecordId(id), kinds::CONFIG, name, op, data)
    }

    #[test]
    fn update_replaces_earlier_create() {
        let records = vec![
            config(1, "a", ops::CREATE, json!({"presets": ["uno"], "path": "/a.css"})),
            config(2, "a", ops::UPDATE, json!({"presets": ["wind", "icons"], "updatedBy": "ops"})),
        ];
        let result = fold(&ConfigRegistry, &records, &());

        assert_eq!(result.count, 1);
        let entry = &result.configs[0];
        assert_eq!(entry.name, "a");
        assert_eq!(entry.presets, vec!["wind", "icons"]);
        assert_eq!(entry.updated_by.as_deref(), Some("ops"));
        // Replacement, not merge
        assert_eq!(entry.path, None);
    }

    #[test]
    fn entries_sorted_by_name() {
        let records = vec![
            config(1, "zeta", ops::CREATE, json!({})),
            config(2, "alpha", ops::CREATE, json!({})),
            config(3, "mid", ops::CREATE, json!({})),
        ];
        let result = fold(&ConfigRegistry, &records, &());
        let names: Vec<_> = result.configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let result = fold(&ConfigRegistry, &[config(1, "bare", ops::CREATE, json!({}))], &());
        let entry = &result.configs[0];
        assert!(entry.presets.is_empty());
        assert!(entry.theme.is_empty());
        assert!(entry.rules.is_empty());
        assert!(entry.shortcuts.is_empty());
        assert_eq!(entry.created_at, None);
    }

    #[test]
    fn malformed_and_foreign_records_are_skipped() {
        let records = vec![
            config(1, "bad", ops::CREATE, json!({"theme": "dark"})),
            config(2, "gone", "delete", json!({})),
            Record::new(RecordId(3), kinds::PRESET, "p", ops::CREATE, json!({})),
            config(4, "nodata", ops::CREATE, Value::Null),
        ];
        let result = fold(&ConfigRegistry, &records, &());
        assert_eq!(result, ConfigList::default());
    }

    #[test]
    fn serializes_camel_case_with_nulls() {
        let result = fold(&ConfigRegistry, &[config(1, "a", ops::CREATE, json!({"createdAt": "t0"}))], &());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["count"], json!(1));
        assert_eq!(json["configs"][0]["createdAt"], json!("t0"));
        assert_eq!(json["configs"][0]["updatedAt"], Value::Null);
    }

    #[test]
    fn free_functions_match_reducer() {
        let record = config(1, "a", ops::CREATE, json!({"presets": ["uno"]}));
        resolve_params(&Value::Null);
        let mut state = init();
        update(&record, &mut state);
        assert_eq!(transform(state), fold(&ConfigRegistry, &[record], &()));
    }
}
