//! Conversion of account persistence failures into domain errors
//!
//! Uniqueness violations are attributed to the offending account field and
//! the conflicting account is looked up, so callers learn which existing
//! account holds the email, phone, external ID or Synapse user ID.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::failure::{ConstraintField, PersistenceError};
use super::lookup::AccountLookup;
use crate::context::RequestContext;
use crate::models::{Account, AccountId};
use crate::Error;

/// Message for constraint violations that cannot be attributed to a field
pub const CONSTRAINT_VIOLATION_MSG: &str = "Accounts table constraint prevented save or update.";

/// Message for stale-version writes
pub const CONCURRENT_MODIFICATION_MSG: &str =
    "Account has the wrong version number; it may have been saved in the background.";

/// Message for a second live copy of an already-attached record
pub const NON_UNIQUE_MSG: &str =
    "This account has already been associated to the study (possibly through another external ID).";

const ACCOUNT_ENTITY_TYPE: &str = "Account";

/// Converts account persistence failures using `L` to find conflicting accounts
pub struct AccountPersistenceExceptionConverter<L> {
    lookup: L,
}

impl<L: AccountLookup> AccountPersistenceExceptionConverter<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Convert `failure` raised while saving `account`
    ///
    /// Failures that match no known pattern come back unchanged as
    /// `Error::Persistence`.
    pub async fn convert(
        &self,
        failure: PersistenceError,
        account: Option<&Account>,
        context: &RequestContext,
    ) -> Error {
        match failure {
            PersistenceError::OptimisticLock { entity, version } => {
                debug!(entity = %entity, version, "Stale version on save");
                Error::ConcurrentModification(CONCURRENT_MODIFICATION_MSG.to_string())
            }
            PersistenceError::NonUniqueObject { .. } => {
                Error::ConstraintViolation(NON_UNIQUE_MSG.to_string())
            }
            PersistenceError::ConstraintViolation { constraint, message } => {
                match ConstraintField::from_violation(constraint.as_deref(), &message) {
                    Some(field) => {
                        if let Some(account) = account {
                            if let Some(existing) = self.find_existing(field, account, context).await {
                                return entity_already_exists(field, &existing);
                            }
                        }
                    }
                    None => warn!(
                        constraint = ?constraint,
                        "Unrecognized accounts constraint violation"
                    ),
                }
                Error::ConstraintViolation(CONSTRAINT_VIOLATION_MSG.to_string())
            }
            other @ PersistenceError::Other(_) => Error::Persistence(other),
        }
    }

    /// First existing account holding `field`'s value(s) of `account`
    async fn find_existing(
        &self,
        field: ConstraintField,
        account: &Account,
        context: &RequestContext,
    ) -> Option<Account> {
        for (study_id, account_id) in candidate_keys(field, account) {
            if let Some(study_id) = study_id {
                // Candidates are not filtered by caller scope; visibility is only recorded
                debug!(
                    study_id,
                    visible_to_caller = context.can_access_study(study_id),
                    "Looking up external ID conflict"
                );
            }
            match self.lookup.get_account(&account_id).await {
                Ok(Some(existing)) => return Some(existing),
                Ok(None) => continue,
                Err(e) => {
                    warn!(key = %account_id, error = %e, "Conflicting account lookup failed");
                    return None;
                }
            }
        }
        None
    }
}

/// Lookup keys to try, in order, paired with the enrollment's study for external IDs
fn candidate_keys(field: ConstraintField, account: &Account) -> Vec<(Option<&str>, AccountId)> {
    let app_id = account.app_id.as_str();
    match field {
        ConstraintField::Email => account
            .email
            .iter()
            .map(|email| (None, AccountId::for_email(app_id, email)))
            .collect(),
        ConstraintField::Phone => account
            .phone
            .iter()
            .map(|phone| (None, AccountId::for_phone(app_id, phone)))
            .collect(),
        ConstraintField::SynapseUserId => account
            .synapse_user_id
            .iter()
            .map(|id| (None, AccountId::for_synapse_user_id(app_id, id)))
            .collect(),
        ConstraintField::ExternalId => account
            .enrollments
            .iter()
            .filter_map(|en| {
                en.external_id.as_deref().map(|ext| {
                    (
                        Some(en.study_id.as_str()),
                        AccountId::for_external_id(app_id, ext),
                    )
                })
            })
            .collect(),
    }
}

fn entity_already_exists(field: ConstraintField, existing: &Account) -> Error {
    let mut entity_keys = BTreeMap::new();
    entity_keys.insert("userId".to_string(), existing.id.clone());
    Error::EntityAlreadyExists {
        entity_type: ACCOUNT_ENTITY_TYPE.to_string(),
        entity_keys,
        message: field.already_used_message().to_string(),
    }
}
