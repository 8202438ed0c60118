//! Classification of raw persistence failures

use sqlx::error::ErrorKind;
use thiserror::Error;

/// A failure reported by the persistence layer, before conversion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Write rejected by a uniqueness or integrity rule
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// Violated constraint name, when the store reports one
        constraint: Option<String>,
        message: String,
    },

    /// Write rejected because the stored version no longer matched
    #[error("Optimistic lock failure on {entity} at version {version}")]
    OptimisticLock { entity: String, version: i64 },

    /// A second live copy of an already-attached record was written
    #[error("Non-unique object: {message}")]
    NonUniqueObject { message: String },

    /// Any other persistence failure
    #[error("{0}")]
    Other(String),
}

impl PersistenceError {
    /// Classify a sqlx error
    pub fn from_sqlx(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => PersistenceError::ConstraintViolation {
                    constraint: db_err.constraint().map(str::to_string),
                    message: db_err.message().to_string(),
                },
                _ => PersistenceError::Other(err.to_string()),
            },
            _ => PersistenceError::Other(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        PersistenceError::from_sqlx(&err)
    }
}

/// Account field guarded by a uniqueness constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintField {
    Email,
    Phone,
    ExternalId,
    SynapseUserId,
}

/// Known constraint identifiers per field: legacy index names, this schema's
/// index names, and the column lists SQLite reports in place of a name.
const CONSTRAINT_SIGNATURES: &[(ConstraintField, &[&str])] = &[
    (
        ConstraintField::Email,
        &[
            "Accounts-StudyId-Email-Index",
            "accounts_app_id_email_idx",
            "accounts.app_id, accounts.email",
        ],
    ),
    (
        ConstraintField::Phone,
        &[
            "Accounts-StudyId-Phone-Index",
            "accounts_app_id_phone_idx",
            "accounts.app_id, accounts.phone",
        ],
    ),
    (
        ConstraintField::ExternalId,
        &[
            "Accounts-StudyId-ExternalId-Index",
            "enrollments_app_id_study_id_external_id_idx",
            "enrollments.app_id, enrollments.study_id, enrollments.external_id",
        ],
    ),
    (
        ConstraintField::SynapseUserId,
        &[
            "Accounts-StudyId-SynapseUserId-Index",
            "accounts_app_id_synapse_user_id_idx",
            "accounts.app_id, accounts.synapse_user_id",
        ],
    ),
];

impl ConstraintField {
    /// Resolve the field behind a violation
    ///
    /// A reported constraint name must match exactly; otherwise the message
    /// is searched for a known signature.
    pub fn from_violation(constraint: Option<&str>, message: &str) -> Option<Self> {
        if let Some(name) = constraint {
            return CONSTRAINT_SIGNATURES
                .iter()
                .find(|(_, signatures)| signatures.contains(&name))
                .map(|(field, _)| *field);
        }
        CONSTRAINT_SIGNATURES
            .iter()
            .find(|(_, signatures)| signatures.iter().any(|sig| message.contains(sig)))
            .map(|(field, _)| *field)
    }

    /// User-facing message for a conflict on this field
    pub fn already_used_message(&self) -> &'static str {
        match self {
            ConstraintField::Email => "Email address has already been used by another account.",
            ConstraintField::Phone => "Phone number has already been used by another account.",
            ConstraintField::ExternalId => "External ID has already been used by another account.",
            ConstraintField::SynapseUserId => {
                "Synapse User ID has already been used by another account."
            }
        }
    }
}
