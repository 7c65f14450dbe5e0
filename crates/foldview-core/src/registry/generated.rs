//! Latest generated stylesheet for one configuration name.
//!
//! Each qualifying record replaces whatever was held before; nothing is
//! merged. Record order (ascending id) decides which record is latest.

use crate::record::{Payload, Record, RecordId, kinds, ops};
use crate::reducer::{Reducer, str_param};
use crate::store::RecordFilter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for the `get-generated-css` view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCssParams {
    /// Configuration to look up. Empty matches nothing.
    pub config_name: String,
}

/// The record currently held by the lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCssState {
    pub content: Option<String>,
    pub generated_at: Option<String>,
    pub class_count: u64,
    pub record_id: Option<RecordId>,
}

/// Result of the `get-generated-css` view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCss {
    pub found: bool,
    pub content: Option<String>,
    pub generated_at: Option<String>,
    pub class_count: u64,
    pub record_id: Option<RecordId>,
}

impl GeneratedCss {
    /// The well-defined "no such output" result.
    #[must_use]
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// The `get-generated-css` view.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedCssLookup;

impl Reducer for GeneratedCssLookup {
    type Params = GeneratedCssParams;
    type State = GeneratedCssState;
    type Output = GeneratedCss;

    fn name(&self) -> &'static str {
        "get-generated-css"
    }

    fn filter(&self, params: &GeneratedCssParams) -> RecordFilter {
        RecordFilter::of_kind(kinds::GENERATED_CSS).named(params.config_name.clone())
    }

    fn resolve_params(&self, raw: &Value) -> GeneratedCssParams {
        GeneratedCssParams {
            config_name: str_param(raw, "configName", ""),
        }
    }

    fn init(&self) -> GeneratedCssState {
        GeneratedCssState::default()
    }

    fn update(&self, record: &Record, state: &mut GeneratedCssState, params: &GeneratedCssParams) {
        if params.config_name.is_empty()
            || record.name != params.config_name
            || !record.is(kinds::GENERATED_CSS, ops::GENERATE)
        {
            return;
        }
        let Payload::GeneratedCss(data) = record.payload() else {
            return;
        };

        *state = GeneratedCssState {
            content: data.content,
            generated_at: data.generated_at,
            class_count: data.class_count.unwrap_or(0),
            record_id: Some(record.id),
        };
    }

    fn transform(&self, state: GeneratedCssState, _params: &GeneratedCssParams) -> GeneratedCss {
        match state.content {
            Some(content) if !content.is_empty() => GeneratedCss {
                found: true,
                content: Some(content),
                generated_at: state.generated_at,
                class_count: state.class_count,
                record_id: state.record_id,
            },
            _ => GeneratedCss::not_found(),
        }
    }
}

pub fn resolve_params(raw: &Value) -> GeneratedCssParams {
    GeneratedCssLookup.resolve_params(raw)
}

pub fn init() -> GeneratedCssState {
    GeneratedCssLookup.init()
}

pub fn update(record: &Record, state: &mut GeneratedCssState, params: &GeneratedCssParams) {
    GeneratedCssLookup.update(record, state, params);
}

pub fn transform(state: GeneratedCssState, params: &GeneratedCssParams) -> GeneratedCss {
    GeneratedCssLookup.transform(state, params)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::reducer::{evaluate, fold};
    use crate::store::RecordLog;
    use serde_json::json;

    fn params(name: &str) -> GeneratedCssParams {
        GeneratedCssParams {
            config_name: name.to_string(),
        }
    }

    fn generated(id: u64, name: &str, data: Value) -> Record {
        Record::new(RecordId(id), kinds::GENERATED_CSS, name, ops::GENERATE, data)
    }

    #[test]
    fn latest_record_wins() {
        let records = vec![
            generated(1, "site", json!({"content": ".a{}", "generatedAt": "t1", "classCount": 1})),
            generated(2, "docs", json!({"content": ".d{}", "classCount": 9})),
            generated(3, "site", json!({"content": ".b{}", "generatedAt": "t3", "classCount": 2})),
        ];
        let result = fold(&GeneratedCssLookup, &records, &params("site"));

        assert_eq!(
            result,
            GeneratedCss {
                found: true,
                content: Some(".b{}".into()),
                generated_at: Some("t3".into()),
                class_count: 2,
                record_id: Some(RecordId(3)),
            }
        );
    }

    #[test]
    fn unknown_name_is_not_found() {
        let records = vec![generated(1, "site", json!({"content": ".a{}"}))];
        let result = fold(&GeneratedCssLookup, &records, &params("missing"));
        assert_eq!(result, GeneratedCss::not_found());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            json!({
                "found": false,
                "content": null,
                "generatedAt": null,
                "classCount": 0,
                "recordId": null
            })
        );
    }

    #[test]
    fn later_empty_output_replaces_earlier_content() {
        let records = vec![
            generated(1, "site", json!({"content": ".a{}", "classCount": 1})),
            generated(2, "site", json!({"classCount": 0})),
        ];
        let result = fold(&GeneratedCssLookup, &records, &params("site"));
        assert!(!result.found);
        assert_eq!(result.record_id, None);
    }

    #[test]
    fn other_operations_do_not_qualify() {
        let records = vec![
            generated(1, "site", json!({"content": ".a{}"})),
            Record::new(RecordId(2), kinds::GENERATED_CSS, "site", "purge", json!({"content": ".x{}"})),
        ];
        let result = fold(&GeneratedCssLookup, &records, &params("site"));
        assert_eq!(result.content.as_deref(), Some(".a{}"));
        assert_eq!(result.record_id, Some(RecordId(1)));
    }

    #[test]
    fn empty_config_name_matches_nothing() {
        let records = vec![generated(1, "", json!({"content": ".a{}"}))];
        let result = fold(&GeneratedCssLookup, &records, &params(""));
        assert_eq!(result, GeneratedCss::not_found());
    }

    #[test]
    fn later_record_with_loose_fields_still_wins() {
        let records = vec![
            generated(1, "site", json!({"content": ".old{}", "classCount": 1, "size": 6})),
            generated(2, "site", json!({"content": ".new{}", "classCount": 3.0, "size": 6.5})),
        ];
        let result = fold(&GeneratedCssLookup, &records, &params("site"));
        assert!(result.found);
        assert_eq!(result.content.as_deref(), Some(".new{}"));
        assert_eq!(result.class_count, 3);
        assert_eq!(result.record_id, Some(RecordId(2)));
    }

    #[test]
    fn wrongly_typed_metadata_reads_as_absent() {
        let records = vec![
            generated(1, "site", json!({"content": ".old{}", "generatedAt": "t1", "classCount": 4})),
            generated(2, "site", json!({"content": ".new{}", "generatedAt": 1700000000, "classCount": "many"})),
        ];
        let result = fold(&GeneratedCssLookup, &records, &params("site"));
        assert_eq!(
            result,
            GeneratedCss {
                found: true,
                content: Some(".new{}".into()),
                generated_at: None,
                class_count: 0,
                record_id: Some(RecordId(2)),
            }
        );
    }

    #[test]
    fn missing_class_count_defaults_to_zero() {
        let records = vec![generated(1, "site", json!({"content": ".a{}"}))];
        let result = fold(&GeneratedCssLookup, &records, &params("site"));
        assert!(result.found);
        assert_eq!(result.class_count, 0);
    }

    #[test]
    fn evaluate_reads_config_name_param() {
        let mut log = RecordLog::new();
        log.append(kinds::GENERATED_CSS, "site", ops::GENERATE, json!({"content": ".a{}"})).unwrap();
        log.append(kinds::MODULE, "site", ops::ADD, json!({"src": ""})).unwrap();

        let found = evaluate(&GeneratedCssLookup, &log, &json!({"configName": "site"})).unwrap();
        assert!(found.found);
        assert_eq!(found.record_id, Some(RecordId(1)));

        let missing = evaluate(&GeneratedCssLookup, &log, &Value::Null).unwrap();
        assert_eq!(missing, GeneratedCss::not_found());
    }

    #[test]
    fn free_functions_match_reducer() {
        let record = generated(1, "site", json!({"content": ".a{}"}));
        let p = resolve_params(&json!({"configName": "site"}));
        let mut state = init();
        update(&record, &mut state, &p);
        assert_eq!(transform(state, &p), fold(&GeneratedCssLookup, &[record], &p));
    }
}
