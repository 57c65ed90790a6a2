//! Language - UI locale

use serde::{Deserialize, Serialize};

/// Interface language
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    It,
    En,
}

impl Language {
    /// Human-readable name, in the language itself
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::It => "Italiano",
            Language::En => "English",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::It => write!(f, "it"),
            Language::En => write!(f, "en"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "it" | "italian" | "italiano" => Ok(Language::It),
            "en" | "english" => Ok(Language::En),
            _ => Err(format!("Unknown language: {}. Valid: it, en", s)),
        }
    }
}
