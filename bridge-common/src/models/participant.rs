//! Participant-facing view of an account

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Phone;

/// Study participant as submitted by a caller
///
/// `external_ids` maps study ID to external ID and keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyParticipant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synapse_user_id: Option<String>,
    #[serde(default)]
    pub external_ids: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl StudyParticipant {
    /// External ID of the first study mapping, if any
    pub fn first_external_id(&self) -> Option<&str> {
        self.external_ids.first().map(|(_, ext)| ext.as_str())
    }
}
