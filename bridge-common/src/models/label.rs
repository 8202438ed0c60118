//! Localized labels

use serde::{Deserialize, Serialize};

/// Anything tagged with a language code
pub trait HasLang {
    fn lang(&self) -> Option<&str>;
}

/// Display text in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl Label {
    pub fn new(lang: &str, value: &str) -> Self {
        Self {
            lang: Some(lang.to_string()),
            value: Some(value.to_string()),
        }
    }
}

impl HasLang for Label {
    fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }
}
