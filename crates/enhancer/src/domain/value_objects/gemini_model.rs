//! GeminiModel - Supported generation backend models

use serde::{Deserialize, Serialize};

/// Backend model used for enhancement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum GeminiModel {
    #[default]
    #[serde(rename = "gemini-2.5-pro")]
    Pro,
    #[serde(rename = "gemini-2.5-flash")]
    Flash,
}

impl GeminiModel {
    pub const ALL: [GeminiModel; 2] = [GeminiModel::Pro, GeminiModel::Flash];

    /// Model identifier as understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            GeminiModel::Pro => "gemini-2.5-pro",
            GeminiModel::Flash => "gemini-2.5-flash",
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GeminiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini-2.5-pro" | "pro" => Ok(GeminiModel::Pro),
            "gemini-2.5-flash" | "flash" => Ok(GeminiModel::Flash),
            _ => Err(format!(
                "Unknown model: {}. Valid: gemini-2.5-pro, gemini-2.5-flash",
                s
            )),
        }
    }
}
