//! Demographic answers in their canonical shape

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single scalar demographic answer, kept in canonical string form
///
/// Numbers and booleans are stored as their JSON text, so `42` becomes `"42"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct DemographicValue(String);

impl DemographicValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical value for a JSON scalar; `None` for null, arrays and objects
    pub fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            Value::Bool(b) => Some(Self(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl TryFrom<Value> for DemographicValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_scalar(&value)
            .ok_or_else(|| format!("demographic value must be a scalar, got {}", value))
    }
}

impl From<DemographicValue> for String {
    fn from(value: DemographicValue) -> Self {
        value.0
    }
}

impl From<&str> for DemographicValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for DemographicValue {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<bool> for DemographicValue {
    fn from(value: bool) -> Self {
        Self(value.to_string())
    }
}

/// Answers for one demographic category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing)]
    pub category_name: String,
    #[serde(default)]
    pub multiple_select: bool,
    #[serde(default)]
    pub values: Vec<DemographicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Demographic {
    pub fn new(category_name: impl Into<String>, multiple_select: bool, values: Vec<DemographicValue>) -> Self {
        Self {
            id: None,
            category_name: category_name.into(),
            multiple_select,
            values,
            units: None,
        }
    }
}

/// All demographic answers of one participant
///
/// Identifying fields are populated by whoever stores the record; parsing
/// leaves them unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_demographics")]
    pub demographics: BTreeMap<String, Demographic>,
}

impl DemographicUser {
    pub fn demographic(&self, category_name: &str) -> Option<&Demographic> {
        self.demographics.get(category_name)
    }
}

/// The category name is the map key in canonical JSON; copy it into each entry
fn deserialize_demographics<'de, D>(deserializer: D) -> Result<BTreeMap<String, Demographic>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut demographics = BTreeMap::<String, Demographic>::deserialize(deserializer)?;
    for (name, demographic) in demographics.iter_mut() {
        demographic.category_name = name.clone();
    }
    Ok(demographics)
}
