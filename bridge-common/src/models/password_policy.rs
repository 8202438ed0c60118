//! Per-app password composition rules

use serde::{Deserialize, Serialize};

/// Password composition rules
///
/// A `min_length` of zero disables the length rule. Field names are
/// camelCase in JSON; snake_case is also accepted for TOML configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordPolicy {
    #[serde(alias = "min_length")]
    pub min_length: usize,
    #[serde(alias = "numeric_required")]
    pub numeric_required: bool,
    #[serde(alias = "symbol_required")]
    pub symbol_required: bool,
    #[serde(alias = "lower_case_required")]
    pub lower_case_required: bool,
    #[serde(alias = "upper_case_required")]
    pub upper_case_required: bool,
}

impl PasswordPolicy {
    pub const DEFAULT_MIN_LENGTH: usize = 8;

    pub fn new(
        min_length: usize,
        numeric_required: bool,
        symbol_required: bool,
        lower_case_required: bool,
        upper_case_required: bool,
    ) -> Self {
        Self {
            min_length,
            numeric_required,
            symbol_required,
            lower_case_required,
            upper_case_required,
        }
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_LENGTH, true, true, true, true)
    }
}
