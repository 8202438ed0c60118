//! Per-request caller scope

use std::collections::BTreeSet;

/// Caller information passed explicitly to operations that depend on it
///
/// An empty `caller_studies` set means the caller is not restricted to any
/// subset of studies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub caller_user_id: Option<String>,
    pub caller_studies: BTreeSet<String>,
}

impl RequestContext {
    /// Unrestricted context with no caller
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn with_caller_studies<I, S>(studies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            caller_user_id: None,
            caller_studies: studies.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_study_restricted(&self) -> bool {
        !self.caller_studies.is_empty()
    }

    /// Whether records in `study_id` are visible to the caller
    pub fn can_access_study(&self, study_id: &str) -> bool {
        !self.is_study_restricted() || self.caller_studies.contains(study_id)
    }
}
