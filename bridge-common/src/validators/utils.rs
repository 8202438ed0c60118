//! Shared field checks

use std::collections::HashSet;

use isocountry::CountryCode;
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ValidationErrors, CANNOT_BE_BLANK};
use crate::context::RequestContext;
use crate::models::{Account, HasLang, Label, PasswordPolicy, StudyParticipant};

pub const DUPLICATE_LANG: &str = "%s is a duplicate message under the same language code";
pub const INVALID_LANG: &str = "%s is not a valid ISO 639 alpha-2 or alpha-3 language code";

/// Language, optionally followed by a region (`en`, `en-US`, `fil`, `es-419`)
static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)([a-z]{2,3})(?:-([a-z]{2}|[0-9]{3}))?$").expect("valid language tag regex")
});

pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// UN M.49 areas used as locale regions (world, Europe, Latin America)
const AREA_REGIONS: &[&str] = &["001", "150", "419"];

/// Whether `tag` names a known ISO 639 alpha-2 or alpha-3 language, with
/// an optional ISO 3166 alpha-2, ISO 3166 numeric or M.49 area region
pub fn is_valid_language_tag(tag: &str) -> bool {
    let Some(captures) = LANGUAGE_TAG.captures(tag) else {
        return false;
    };
    let language = captures[1].to_ascii_lowercase();
    let known_language = match language.len() {
        2 => Language::from_639_1(&language).is_some(),
        _ => Language::from_639_3(&language).is_some(),
    };
    known_language && captures.get(2).map_or(true, |region| is_known_region(region.as_str()))
}

fn is_known_region(region: &str) -> bool {
    if AREA_REGIONS.contains(&region) {
        return true;
    }
    match region.parse::<u32>() {
        Ok(numeric) => CountryCode::for_id(numeric).is_ok(),
        Err(_) => CountryCode::for_alpha2(&region.to_ascii_uppercase()).is_ok(),
    }
}

pub fn participant_has_valid_identifier(participant: &StudyParticipant) -> bool {
    participant.email.is_some()
        || !is_blank(participant.first_external_id())
        || participant.phone.is_some()
        || !is_blank(participant.synapse_user_id.as_deref())
}

/// External IDs of `account` in studies the caller can see
pub fn collect_external_ids<'a>(account: &'a Account, context: &RequestContext) -> Vec<&'a str> {
    account
        .enrollments
        .iter()
        .filter(|en| context.can_access_study(&en.study_id))
        .filter_map(|en| en.external_id.as_deref())
        .collect()
}

pub fn account_has_valid_identifier(account: &Account, context: &RequestContext) -> bool {
    account.email.is_some()
        || !collect_external_ids(account, context).is_empty()
        || account.phone.is_some()
        || !is_blank(account.synapse_user_id.as_deref())
}

/// Check `password` against `policy`
///
/// A blank password is the only error reported in that case; otherwise each
/// failing rule adds its own error.
pub fn validate_password(errors: &mut ValidationErrors, policy: &PasswordPolicy, password: Option<&str>) {
    let password = match password {
        Some(p) if !p.trim().is_empty() => p,
        _ => {
            errors.reject_value("password", "is required");
            return;
        }
    };

    if policy.min_length > 0 && password.chars().count() < policy.min_length {
        errors.reject_value(
            "password",
            &format!("must be at least {} characters", policy.min_length),
        );
    }
    if policy.numeric_required && !password.chars().any(|c| c.is_ascii_digit()) {
        errors.reject_value("password", "must contain at least one number (0-9)");
    }
    if policy.symbol_required && !password.chars().any(|c| c.is_ascii_punctuation()) {
        errors.reject_value(
            "password",
            "must contain at least one symbol ( !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ )",
        );
    }
    if policy.lower_case_required && !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.reject_value("password", "must contain at least one lowercase letter (a-z)");
    }
    if policy.upper_case_required && !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.reject_value("password", "must contain at least one uppercase letter (A-Z)");
    }
}

/// Check the `lang` of each item, recording errors under `field_name[i]`
pub fn validate_language_set<T: HasLang>(errors: &mut ValidationErrors, items: &[T], field_name: &str) {
    let mut visited: HashSet<&str> = HashSet::new();
    for (i, item) in items.iter().enumerate() {
        errors.nested(format!("{}[{}]", field_name, i), |errors| match item.lang() {
            Some(lang) if !lang.trim().is_empty() => {
                if !visited.insert(lang) {
                    errors.reject_value("lang", DUPLICATE_LANG);
                }
                if !is_valid_language_tag(lang) {
                    errors.reject_value("lang", INVALID_LANG);
                }
            }
            _ => errors.reject_value("lang", CANNOT_BE_BLANK),
        });
    }
}

pub fn validate_labels(errors: &mut ValidationErrors, labels: &[Label]) {
    if labels.is_empty() {
        return;
    }
    validate_language_set(errors, labels, "labels");
    for (j, label) in labels.iter().enumerate() {
        if is_blank(label.value.as_deref()) {
            errors.nested(format!("labels[{}]", j), |errors| {
                errors.reject_value("value", CANNOT_BE_BLANK)
            });
        }
    }
}
