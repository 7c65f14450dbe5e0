//! Preset registry: every registration is kept, highest priority first.

use crate::record::{Payload, Record, kinds, ops};
use crate::reducer::{Reducer, bool_param};
use crate::store::RecordFilter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Priority assigned to presets registered without one.
pub const DEFAULT_PRIORITY: i64 = 100;

/// A registered preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetEntry {
    pub name: String,
    pub module: Option<String>,
    pub path: Option<String>,
    pub priority: i64,
    pub registered_at: Option<String>,
    pub registered_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

/// Result of the `get-presets` view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetList {
    pub presets: Vec<PresetEntry>,
    pub count: usize,
}

/// Parameters for the `get-presets` view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetParams {
    /// Attach each preset's configuration object.
    pub include_config: bool,
}

impl Default for PresetParams {
    fn default() -> Self {
        Self {
            include_config: true,
        }
    }
}

/// The `get-presets` view.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresetRegistry;

impl Reducer for PresetRegistry {
    type Params = PresetParams;
    type State = Vec<PresetEntry>;
    type Output = PresetList;

    fn name(&self) -> &'static str {
        "get-presets"
    }

    fn filter(&self, _params: &PresetParams) -> RecordFilter {
        RecordFilter::of_kind(kinds::PRESET)
    }

    fn resolve_params(&self, raw: &Value) -> PresetParams {
        PresetParams {
            include_config: bool_param(raw, "includeConfig", PresetParams::default().include_config),
        }
    }

    fn init(&self) -> Vec<PresetEntry> {
        Vec::new()
    }

    fn update(&self, record: &Record, state: &mut Vec<PresetEntry>, params: &PresetParams) {
        if !record.is(kinds::PRESET, ops::REGISTER) {
            return;
        }
        let Payload::Preset(data) = record.payload() else {
            return;
        };

        state.push(PresetEntry {
            name: record.name.clone(),
            module: data.module,
            path: data.path,
            // Zero counts as unset, like a missing priority.
            priority: data.priority.filter(|p| *p != 0).unwrap_or(DEFAULT_PRIORITY),
            registered_at: data.registered_at,
            registered_by: data.registered_by,
            config: params
                .include_config
                .then(|| data.config.unwrap_or_default()),
        });
    }

    fn transform(&self, mut state: Vec<PresetEntry>, _params: &PresetParams) -> PresetList {
        // Stable: identical (priority, name) pairs keep log order.
        state.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.name.cmp(&b.name))
        });
        PresetList {
            count: state.len(),
            presets: state,
        }
    }
}

pub fn resolve_params(raw: &Value) -> PresetParams {
    PresetRegistry.resolve_params(raw)
}

pub fn init() -> Vec<PresetEntry> {
    PresetRegistry.init()
}

pub fn update(record: &Record, state: &mut Vec<PresetEntry>, params: &PresetParams) {
    PresetRegistry.update(record, state, params);
}

pub fn transform(state: Vec<PresetEntry>, params: &PresetParams) -> PresetList {
    PresetRegistry.transform(state, params)
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

    fn preset(id: u64, name: &str, data: Value) -> Record {
        Record::new(RecordId(id), kinds::PRESET, name, ops::REGISTER, data)
    }

    fn names(list: &PresetList) -> Vec<&str> {
        list.presets.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn sorted_by_priority_desc_then_name() {
        let records = vec![
            preset(1, "low", json!({"priority": 100})),
            preset(2, "high", json!({"priority": 200})),
            preset(3, "beta", json!({"priority": 150})),
            preset(4, "alpha", json!({"priority": 150})),
        ];
        let result = fold(&PresetRegistry, &records, &PresetParams::default());
        assert_eq!(names(&result), vec!["high", "alpha", "beta", "low"]);
        assert_eq!(result.count, 4);
    }

    #[test]
    fn missing_priority_defaults() {
        let result = fold(&PresetRegistry, &[preset(1, "uno", json!({}))], &PresetParams::default());
        assert_eq!(result.presets[0].priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn zero_priority_defaults() {
        let records = vec![
            preset(1, "zero", json!({"priority": 0})),
            preset(2, "low", json!({"priority": 50})),
        ];
        let result = fold(&PresetRegistry, &records, &PresetParams::default());
        let order: Vec<_> = result.presets.iter().map(|p| (p.name.as_str(), p.priority)).collect();
        assert_eq!(order, vec![("zero", DEFAULT_PRIORITY), ("low", 50)]);
    }

    #[test]
    fn float_priority_is_kept_and_truncated() {
        let records = vec![
            preset(1, "zero", json!({"priority": 0})),
            preset(2, "float", json!({"priority": 150.0})),
            preset(3, "half", json!({"priority": 120.5})),
        ];
        let result = fold(&PresetRegistry, &records, &PresetParams::default());
        let order: Vec<_> = result.presets.iter().map(|p| (p.name.as_str(), p.priority)).collect();
        assert_eq!(order, vec![("float", 150), ("half", 120), ("zero", DEFAULT_PRIORITY)]);
    }

    #[test]
    fn non_numeric_priority_defaults() {
        let result = fold(
            &PresetRegistry,
            &[preset(1, "uno", json!({"priority": "high"}))],
            &PresetParams::default(),
        );
        assert_eq!(result.count, 1);
        assert_eq!(result.presets[0].priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn unread_fields_do_not_drop_registration() {
        let records = vec![preset(
            1,
            "uno",
            json!({"module": "@unocss/preset-uno", "version": 1.5, "tags": ["core"], "priority": 10}),
        )];
        let result = fold(&PresetRegistry, &records, &PresetParams::default());
        assert_eq!(result.count, 1);
        assert_eq!(result.presets[0].module.as_deref(), Some("@unocss/preset-uno"));
        assert_eq!(result.presets[0].priority, 10);
    }

    #[test]
    fn repeated_registrations_are_kept() {
        let records = vec![
            preset(1, "uno", json!({"module": "a"})),
            preset(2, "uno", json!({"module": "b"})),
        ];
        let result = fold(&PresetRegistry, &records, &PresetParams::default());
        let modules: Vec<_> = result
            .presets
            .iter()
            .map(|p| p.module.as_deref())
            .collect();
        assert_eq!(modules, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn include_config_flag() {
        let records = vec![preset(1, "uno", json!({"config": {"dark": true}}))];

        let with = fold(&PresetRegistry, &records, &PresetParams::default());
        assert_eq!(
            with.presets[0].config.as_ref().and_then(|c| c.get("dark")),
            Some(&json!(true))
        );

        let params = PresetRegistry.resolve_params(&json!({"includeConfig": false}));
        let without = fold(&PresetRegistry, &records, &params);
        assert_eq!(without.presets[0].config, None);
        let json = serde_json::to_value(&without).unwrap();
        assert!(json["presets"][0].get("config").is_none());
    }

    #[test]
    fn config_defaults_to_empty_object() {
        let result = fold(&PresetRegistry, &[preset(1, "uno", json!({}))], &PresetParams::default());
        assert_eq!(result.presets[0].config, Some(Map::new()));
    }

    #[test]
    fn non_register_records_are_ignored() {
        let records = vec![
            Record::new(RecordId(1), kinds::PRESET, "x", ops::CREATE, json!({})),
            Record::new(RecordId(2), kinds::PRESET, "y", ops::UPDATE, json!({"priority": 5})),
        ];
        let result = fold(&PresetRegistry, &records, &PresetParams::default());
        assert_eq!(result, PresetList::default());
    }

    #[test]
    fn free_functions_match_reducer() {
        let record = preset(1, "uno", json!({"priority": 5}));
        let params = resolve_params(&Value::Null);
        let mut state = init();
        update(&record, &mut state, &params);
        assert_eq!(
            transform(state, &params),
            fold(&PresetRegistry, &[record], &params)
        );
    }
}
