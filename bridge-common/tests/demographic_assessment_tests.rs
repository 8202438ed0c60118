//! Assessment result documents normalized to canonical demographics

use bridge_common::json::DemographicUserAssessment;
use bridge_common::models::{DemographicUser, DemographicValue};
use serde_json::{json, Value};

#[test]
fn test_single_integer_step() {
    let assessment = DemographicUserAssessment::from_json_str(
        r#"{"stepHistory":[{"identifier":"age","answerType":{"type":"integer"},"value":42}]}"#,
    )
    .unwrap();
    let user = assessment.into_demographic_user();

    assert_eq!(user.demographics.len(), 1);
    let age = user.demographic("age").unwrap();
    assert!(!age.multiple_select);
    assert_eq!(age.values, vec![DemographicValue::from(42)]);
}

#[test]
fn test_caller_fills_identifying_fields_then_serializes_canonical_form() {
    let mut user = DemographicUserAssessment::from_json_str(
        &json!({
            "type": "AssessmentResult",
            "stepHistory": [
                {"identifier": "languages", "answerType": {"type": "array"}, "value": ["en", null, "fr"]},
                {"identifier": "height", "answerType": {"type": "number"}, "value": {"value": 180}},
                null
            ]
        })
        .to_string(),
    )
    .unwrap()
    .into_demographic_user();

    user.app_id = Some("api".to_string());
    user.user_id = Some("user1".to_string());

    let canonical: Value = serde_json::to_value(&user).unwrap();
    assert_eq!(
        canonical,
        json!({
            "appId": "api",
            "userId": "user1",
            "demographics": {
                "height": {"multipleSelect": false, "values": ["180"]},
                "languages": {"multipleSelect": true, "values": ["en", "fr"]}
            }
        })
    );

    let restored: DemographicUser = serde_json::from_value(canonical).unwrap();
    assert_eq!(restored, user);
}
