//! Account, enrollment and account lookup keys

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Telephone number with the region it was entered for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    pub number: String,
    pub region_code: String,
}

impl Phone {
    pub fn new(number: impl Into<String>, region_code: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            region_code: region_code.into(),
        }
    }
}

/// Association of an account with a study, optionally carrying an external ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub app_id: String,
    pub study_id: String,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl Enrollment {
    pub fn create(
        app_id: impl Into<String>,
        study_id: impl Into<String>,
        account_id: impl Into<String>,
        external_id: Option<&str>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            study_id: study_id.into(),
            account_id: account_id.into(),
            external_id: external_id.map(str::to_string),
        }
    }
}

/// A participant account within one app
///
/// Enrollments keep their insertion order; conflict resolution walks them
/// in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Phone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synapse_user_id: Option<String>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
}

impl Account {
    /// New, unsaved account in the given app
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            app_id: app_id.into(),
            email: None,
            phone: None,
            synapse_user_id: None,
            enrollments: Vec::new(),
            version: 0,
            created_on: None,
            modified_on: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: Phone) -> Self {
        self.phone = Some(phone);
        self
    }

    pub fn with_synapse_user_id(mut self, synapse_user_id: impl Into<String>) -> Self {
        self.synapse_user_id = Some(synapse_user_id.into());
        self
    }

    pub fn with_enrollment(mut self, enrollment: Enrollment) -> Self {
        self.enrollments.push(enrollment);
        self
    }

    /// External IDs across all enrollments, in enrollment order
    pub fn external_ids(&self) -> impl Iterator<Item = &str> {
        self.enrollments
            .iter()
            .filter_map(|en| en.external_id.as_deref())
    }
}

/// Key used to look up a single account within an app
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountId {
    Id { app_id: String, id: String },
    Email { app_id: String, email: String },
    Phone { app_id: String, phone: Phone },
    ExternalId { app_id: String, external_id: String },
    SynapseUserId { app_id: String, synapse_user_id: String },
}

impl AccountId {
    pub fn for_id(app_id: &str, id: &str) -> Self {
        AccountId::Id {
            app_id: app_id.to_string(),
            id: id.to_string(),
        }
    }

    pub fn for_email(app_id: &str, email: &str) -> Self {
        AccountId::Email {
            app_id: app_id.to_string(),
            email: email.to_string(),
        }
    }

    pub fn for_phone(app_id: &str, phone: &Phone) -> Self {
        AccountId::Phone {
            app_id: app_id.to_string(),
            phone: phone.clone(),
        }
    }

    pub fn for_external_id(app_id: &str, external_id: &str) -> Self {
        AccountId::ExternalId {
            app_id: app_id.to_string(),
            external_id: external_id.to_string(),
        }
    }

    pub fn for_synapse_user_id(app_id: &str, synapse_user_id: &str) -> Self {
        AccountId::SynapseUserId {
            app_id: app_id.to_string(),
            synapse_user_id: synapse_user_id.to_string(),
        }
    }

    pub fn app_id(&self) -> &str {
        match self {
            AccountId::Id { app_id, .. }
            | AccountId::Email { app_id, .. }
            | AccountId::Phone { app_id, .. }
            | AccountId::ExternalId { app_id, .. }
            | AccountId::SynapseUserId { app_id, .. } => app_id,
        }
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Identifying values are personal data; only the key kind is printed
        match self {
            AccountId::Id { app_id, id } => write!(f, "{}:id:{}", app_id, id),
            AccountId::Email { app_id, .. } => write!(f, "{}:email", app_id),
            AccountId::Phone { app_id, .. } => write!(f, "{}:phone", app_id),
            AccountId::ExternalId { app_id, .. } => write!(f, "{}:externalId", app_id),
            AccountId::SynapseUserId { app_id, .. } => write!(f, "{}:synapseUserId", app_id),
        }
    }
}
