//! Demographic answers submitted in the assessment result format
//!
//! Assessment results arrive as a step history:
//!
//! ```json
//! {"stepHistory": [
//!     {"identifier": "languages", "answerType": {"type": "array"}, "value": ["en", "fr"]},
//!     {"identifier": "age", "answerType": {"type": "integer"}, "value": 42}
//! ]}
//! ```
//!
//! and are normalized into a [`DemographicUser`] keyed by step identifier.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{Demographic, DemographicUser, DemographicValue};
use crate::Result;

const MULTIPLE_SELECT_STEP_TYPE: &str = "array";

/// A [`DemographicUser`] parsed from assessment results
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicUserAssessment {
    pub demographic_user: DemographicUser,
}

impl DemographicUserAssessment {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_demographic_user(self) -> DemographicUser {
        self.demographic_user
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentResults {
    #[serde(default)]
    step_history: Option<Vec<Option<ResultStep>>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultStep {
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    answer_type: Option<AnswerType>,
    #[serde(default)]
    value: Option<Value>,
}

#[derive(Deserialize)]
struct AnswerType {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Entries of a step's value: a list, or a single entry
fn step_entries(value: Option<Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(item) => vec![item],
    }
}

/// Canonical value of one entry, a bare scalar or `{"value": scalar}`
fn entry_value<E: serde::de::Error>(entry: Value) -> std::result::Result<Option<DemographicValue>, E> {
    let inner = match entry {
        Value::Object(mut wrapper) => wrapper.remove("value").unwrap_or(Value::Null),
        other => other,
    };
    match inner {
        Value::Null => Ok(None),
        Value::Array(_) | Value::Object(_) => Err(E::custom(format!(
            "demographic value must be a scalar, got {}",
            inner
        ))),
        scalar => Ok(DemographicValue::from_scalar(&scalar)),
    }
}

impl<'de> Deserialize<'de> for DemographicUserAssessment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let results = AssessmentResults::deserialize(deserializer)?;
        let mut demographics = BTreeMap::new();

        for step in results.step_history.unwrap_or_default().into_iter().flatten() {
            // The identifier is the category name and the map key
            let identifier = step
                .identifier
                .ok_or_else(|| D::Error::custom("identifier cannot be null"))?;

            let mut values = Vec::new();
            for entry in step_entries(step.value) {
                if let Some(value) = entry_value::<D::Error>(entry)? {
                    values.push(value);
                }
            }

            let answer_type = step
                .answer_type
                .and_then(|answer_type| answer_type.kind)
                .ok_or_else(|| D::Error::custom("answerType containing type must be included"))?;

            let demographic = Demographic::new(
                identifier.clone(),
                answer_type.eq_ignore_ascii_case(MULTIPLE_SELECT_STEP_TYPE),
                values,
            );
            demographics.insert(identifier, demographic);
        }

        Ok(DemographicUserAssessment {
            demographic_user: DemographicUser {
                demographics,
                ..Default::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    fn parse(value: Value) -> std::result::Result<DemographicUser, serde_json::Error> {
        serde_json::from_value::<DemographicUserAssessment>(value).map(|a| a.demographic_user)
    }

    #[test]
    fn test_single_scalar_value() {
        let user = parse(json!({"stepHistory": [
            {"identifier": "age", "answerType": {"type": "integer"}, "value": 42}
        ]}))
        .unwrap();

        assert_eq!(user.demographics.len(), 1);
        let age = user.demographic("age").unwrap();
        assert_eq!(age.category_name, "age");
        assert!(!age.multiple_select);
        assert_eq!(age.values, vec![DemographicValue::from(42)]);
        assert!(user.id.is_none());
        assert!(user.app_id.is_none());
        assert!(user.study_id.is_none());
        assert!(user.user_id.is_none());
    }

    #[test]
    fn test_array_answer_type_is_multiple_select() {
        let user = parse(json!({"stepHistory": [
            {"identifier": "languages", "answerType": {"type": "ARRAY"}, "value": ["en", "fr"]},
            {"identifier": "race", "answerType": {"type": "string"}, "value": ["white"]}
        ]}))
        .unwrap();

        let languages = user.demographic("languages").unwrap();
        assert!(languages.multiple_select);
        assert_eq!(languages.values, vec![DemographicValue::from("en"), DemographicValue::from("fr")]);
        assert!(!user.demographic("race").unwrap().multiple_select);
    }

    #[test]
    fn test_null_steps_are_skipped() {
        let user = parse(json!({"stepHistory": [
            null,
            {"identifier": "height", "answerType": {"type": "number"}, "value": 1.8},
            null
        ]}))
        .unwrap();

        assert_eq!(user.demographics.len(), 1);
        assert_eq!(user.demographic("height").unwrap().values, vec![DemographicValue::new("1.8")]);
    }

    #[test]
    fn test_null_identifier_is_error() {
        let err = parse(json!({"stepHistory": [
            {"identifier": null, "answerType": {"type": "string"}, "value": "x"}
        ]}))
        .unwrap_err();
        assert!(err.to_string().contains("identifier cannot be null"));

        let err = parse(json!({"stepHistory": [
            {"answerType": {"type": "string"}, "value": "x"}
        ]}))
        .unwrap_err();
        assert!(err.to_string().contains("identifier cannot be null"));
    }

    #[test]
    fn test_missing_answer_type_is_error() {
        for step in [
            json!({"identifier": "age", "value": 3}),
            json!({"identifier": "age", "answerType": null, "value": 3}),
            json!({"identifier": "age", "answerType": {"other": "x"}, "value": 3}),
        ] {
            let err = parse(json!({"stepHistory": [step]})).unwrap_err();
            assert!(
                err.to_string().contains("answerType containing type must be included"),
                "unexpected error: {}",
                err
            );
        }
    }

    #[test]
    fn test_null_value_is_empty_list() {
        let user = parse(json!({"stepHistory": [
            {"identifier": "age", "answerType": {"type": "integer"}, "value": null},
            {"identifier": "sex", "answerType": {"type": "string"}}
        ]}))
        .unwrap();

        assert!(user.demographic("age").unwrap().values.is_empty());
        assert!(user.demographic("sex").unwrap().values.is_empty());
    }

    #[test]
    fn test_null_entries_are_dropped() {
        let user = parse(json!({"stepHistory": [
            {"identifier": "categories", "answerType": {"type": "array"},
             "value": [null, "a", {"value": null}, {"value": "b"}, true, {}]}
        ]}))
        .unwrap();

        assert_eq!(
            user.demographic("categories").unwrap().values,
            vec![DemographicValue::from("a"), DemographicValue::from("b"), DemographicValue::from(true)]
        );
    }

    #[test]
    fn test_nested_value_is_error() {
        let err = parse(json!({"stepHistory": [
            {"identifier": "x", "answerType": {"type": "array"}, "value": [[1, 2]]}
        ]}))
        .unwrap_err();
        assert!(err.to_string().contains("must be a scalar"));
    }

    #[test]
    fn test_duplicate_identifier_last_write_wins() {
        let user = parse(json!({"stepHistory": [
            {"identifier": "age", "answerType": {"type": "integer"}, "value": 30},
            {"identifier": "age", "answerType": {"type": "array"}, "value": [31]}
        ]}))
        .unwrap();

        let age = user.demographic("age").unwrap();
        assert!(age.multiple_select);
        assert_eq!(age.values, vec![DemographicValue::from(31)]);
    }

    #[test]
    fn test_missing_step_history_and_unknown_fields() {
        let user = parse(json!({"taskRunUUID": "abc"})).unwrap();
        assert!(user.demographics.is_empty());

        let user = parse(json!({"stepHistory": null, "endDate": "2024-01-01"})).unwrap();
        assert!(user.demographics.is_empty());

        let user = parse(json!({"stepHistory": [
            {"identifier": "age", "type": "answer", "startDate": "x",
             "answerType": {"type": "integer", "baseType": "number"}, "value": 5}
        ]}))
        .unwrap();
        assert_eq!(user.demographic("age").unwrap().values, vec![DemographicValue::from(5)]);
    }

    #[test]
    fn test_from_json_str_maps_to_parse_error() {
        let result = DemographicUserAssessment::from_json_str(
            r#"{"stepHistory":[{"identifier":null,"answerType":{"type":"string"}}]}"#,
        );
        match result {
            Err(Error::Parse(message)) => assert!(message.contains("identifier cannot be null")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }
}
