//! bridge-tool library - command implementations
//!
//! Each command takes plain inputs and returns its output, so `main.rs` only
//! deals with argument parsing, configuration and printing.

pub mod logging;

use anyhow::{Context, Result};
use bridge_common::json::DemographicUserAssessment;
use bridge_common::models::{Account, AccountId, Label, PasswordPolicy, Phone};
use bridge_common::persistence::AccountLookup;
use bridge_common::validators::{validate_labels, validate_password, ValidationErrors};
use clap::Args;

/// Normalize an assessment result document to canonical demographics JSON
pub fn normalize_demographics(input: &str) -> Result<String> {
    let user = DemographicUserAssessment::from_json_str(input)?.into_demographic_user();
    Ok(serde_json::to_string_pretty(&user)?)
}

pub fn check_password(policy: &PasswordPolicy, password: Option<&str>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    validate_password(&mut errors, policy, password);
    errors
}

/// Validate a JSON array of `{"lang": .., "value": ..}` labels
pub fn check_labels(input: &str) -> Result<ValidationErrors> {
    let labels: Vec<Label> = serde_json::from_str(input).context("Labels must be a JSON array")?;
    let mut errors = ValidationErrors::new();
    validate_labels(&mut errors, &labels);
    Ok(errors)
}

/// One line per recorded error, in field order
pub fn render_errors(errors: &ValidationErrors) -> String {
    errors
        .errors()
        .values()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Exactly one account key, chosen on the command line
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct LookupKey {
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Phone number in E.164 form
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub external_id: Option<String>,
    #[arg(long)]
    pub synapse_user_id: Option<String>,
}

impl LookupKey {
    pub fn to_account_id(&self, app_id: &str) -> Option<AccountId> {
        if let Some(id) = &self.id {
            Some(AccountId::for_id(app_id, id))
        } else if let Some(email) = &self.email {
            Some(AccountId::for_email(app_id, email))
        } else if let Some(phone) = &self.phone {
            // Lookups match on the number alone
            Some(AccountId::for_phone(app_id, &Phone::new(phone.as_str(), "")))
        } else if let Some(external_id) = &self.external_id {
            Some(AccountId::for_external_id(app_id, external_id))
        } else {
            self.synapse_user_id
                .as_deref()
                .map(|id| AccountId::for_synapse_user_id(app_id, id))
        }
    }
}

pub async fn lookup_account<L: AccountLookup>(lookup: &L, app_id: &str, key: &LookupKey) -> Result<Option<Account>> {
    let account_id = key
        .to_account_id(app_id)
        .context("One of --id, --email, --phone, --external-id or --synapse-user-id is required")?;
    Ok(lookup.get_account(&account_id).await?)
}
