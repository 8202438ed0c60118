//! Entity validators built from the shared field checks

use super::utils::{participant_has_valid_identifier, validate_labels, validate_password};
use super::{Validate, ValidationErrors};
use crate::models::{Label, PasswordPolicy, StudyParticipant};

pub const IDENTIFIER_REQUIRED: &str = "email, phone, synapseUserId or externalId is required";

/// Validates a participant against the app's password policy
///
/// Passwords are only checked for new participants; existing participants
/// change passwords through a separate flow.
pub struct StudyParticipantValidator<'a> {
    pub policy: PasswordPolicy,
    pub is_new: bool,
    pub participant: &'a StudyParticipant,
}

impl<'a> StudyParticipantValidator<'a> {
    pub fn new(policy: PasswordPolicy, is_new: bool, participant: &'a StudyParticipant) -> Self {
        Self {
            policy,
            is_new,
            participant,
        }
    }
}

impl Validate for StudyParticipantValidator<'_> {
    fn validate(&self, errors: &mut ValidationErrors) {
        if !participant_has_valid_identifier(self.participant) {
            errors.reject_value("identifier", IDENTIFIER_REQUIRED);
        }
        if self.is_new && self.participant.password.is_some() {
            validate_password(errors, &self.policy, self.participant.password.as_deref());
        }
    }
}

/// Validates a list of labels as a whole
pub struct LabelsValidator<'a>(pub &'a [Label]);

impl Validate for LabelsValidator<'_> {
    fn validate(&self, errors: &mut ValidationErrors) {
        validate_labels(errors, self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::validate_entity;
    use crate::Error;

    #[test]
    fn test_participant_without_identifier() {
        let participant = StudyParticipant::default();
        let validator = StudyParticipantValidator::new(PasswordPolicy::default(), true, &participant);

        match validate_entity(&validator, "StudyParticipant") {
            Err(Error::InvalidEntity { message, .. }) => assert_eq!(
                message,
                "StudyParticipant is invalid: identifier email, phone, synapseUserId or externalId is required"
            ),
            other => panic!("Expected InvalidEntity, got {:?}", other),
        }
    }

    #[test]
    fn test_new_participant_password_checked() {
        let participant = StudyParticipant {
            email: Some("a@b.com".to_string()),
            password: Some("short".to_string()),
            ..Default::default()
        };
        let policy = PasswordPolicy::new(8, true, false, false, false);

        let mut errors = ValidationErrors::new();
        StudyParticipantValidator::new(policy, true, &participant).validate(&mut errors);
        assert_eq!(errors.field_errors("password").len(), 2);

        let mut errors = ValidationErrors::new();
        StudyParticipantValidator::new(policy, false, &participant).validate(&mut errors);
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_labels_validator() {
        let labels = vec![Label::new("en", "a"), Label::new("fr", "b")];
        assert!(validate_entity(&LabelsValidator(&labels), "Labels").is_ok());

        let labels = vec![Label::new("en", "a"), Label::new("en", "")];
        let err = validate_entity(&LabelsValidator(&labels), "Labels").unwrap_err();
        assert!(err.to_string().starts_with("Labels is invalid: "));
    }
}
