//! Integration tests for bridge-tool commands

use bridge_common::db::{init_memory_database, SqliteAccountStore};
use bridge_common::models::{Account, PasswordPolicy};
use bridge_common::RequestContext;
use bridge_tool::{check_labels, check_password, lookup_account, normalize_demographics, render_errors, LookupKey};
use serde_json::{json, Value};

fn key() -> LookupKey {
    LookupKey {
        id: None,
        email: None,
        phone: None,
        external_id: None,
        synapse_user_id: None,
    }
}

#[test]
fn test_normalize_demographics_outputs_canonical_json() {
    let output = normalize_demographics(
        r#"{"stepHistory":[{"identifier":"age","answerType":{"type":"integer"},"value":42}]}"#,
    )
    .unwrap();

    let value: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        value,
        json!({"demographics": {"age": {"multipleSelect": false, "values": ["42"]}}})
    );
}

#[test]
fn test_normalize_demographics_reports_parse_errors() {
    let err = normalize_demographics(r#"{"stepHistory":[{"identifier":"age","value":1}]}"#).unwrap_err();
    assert!(err.to_string().contains("answerType containing type must be included"));
}

#[test]
fn test_check_password_reports_each_failed_rule() {
    let policy = PasswordPolicy::new(10, true, false, false, false);
    let errors = check_password(&policy, Some("abcdefgh"));

    assert_eq!(errors.error_count(), 2);
    assert_eq!(
        render_errors(&errors),
        "password must be at least 10 characters\npassword must contain at least one number (0-9)"
    );
}

#[test]
fn test_check_labels() {
    let errors = check_labels(r#"[{"lang": "en", "value": "Hi"}, {"lang": "fr", "value": "Salut"}]"#).unwrap();
    assert!(!errors.has_errors());

    let errors = check_labels(r#"[{"lang": "en", "value": "Hi"}, {"lang": "en", "value": ""}]"#).unwrap();
    assert_eq!(errors.error_count(), 2);

    assert!(check_labels(r#"{"lang": "en"}"#).is_err());
}

#[tokio::test]
async fn test_lookup_account_by_email() {
    let store = SqliteAccountStore::new(init_memory_database().await.unwrap());
    let saved = store
        .create_account(
            &Account::new("api").with_email("someone@example.com"),
            &RequestContext::unrestricted(),
        )
        .await
        .unwrap();

    let found = lookup_account(
        &store,
        "api",
        &LookupKey {
            email: Some("someone@example.com".to_string()),
            ..key()
        },
    )
    .await
    .unwrap();
    assert_eq!(found.map(|a| a.id), Some(saved.id));

    let missing = lookup_account(
        &store,
        "api",
        &LookupKey {
            synapse_user_id: Some("999".to_string()),
            ..key()
        },
    )
    .await
    .unwrap();
    assert!(missing.is_none());

    assert!(lookup_account(&store, "api", &key()).await.is_err());
}
