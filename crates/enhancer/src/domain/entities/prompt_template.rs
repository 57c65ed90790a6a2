//! PromptTemplate - Reusable named prompt
//!
//! Pure domain entity without infrastructure dependencies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::ValidationError;

/// PromptTemplate - A prompt saved under a title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptTemplate {
    pub id: String,
    pub title: String,
    pub prompt: String,
}

impl PromptTemplate {
    /// Create a new template with a fresh id
    ///
    /// The title is stored trimmed; the prompt body is kept as written.
    pub fn new(title: &str, prompt: &str) -> Result<Self, ValidationError> {
        let template = Self {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            prompt: prompt.to_string(),
        };
        template.validate()?;
        Ok(template)
    }

    /// Produce an edited copy that keeps this template's id
    pub fn edited(&self, title: &str, prompt: &str) -> Result<Self, ValidationError> {
        let template = Self {
            id: self.id.clone(),
            title: title.trim().to_string(),
            prompt: prompt.to_string(),
        };
        template.validate()?;
        Ok(template)
    }

    /// Title and prompt must both be non-empty after trimming
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.prompt.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prompt_rejected() {
        let err = PromptTemplate::new("T", "").unwrap_err();
        assert_eq!(err, ValidationError::EmptyPrompt);
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = PromptTemplate::new("   ", "body").unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
    }

    #[test]
    fn test_title_trimmed_prompt_kept() {
        let template = PromptTemplate::new("  Title  ", "  body\n").unwrap();
        assert_eq!(template.title, "Title");
        assert_eq!(template.prompt, "  body\n");
    }

    #[test]
    fn test_edited_preserves_id() {
        let template = PromptTemplate::new("Old", "old body").unwrap();
        let edited = template.edited("New", "new body").unwrap();
        assert_eq!(edited.id, template.id);
        assert_eq!(edited.title, "New");
        assert!(template.edited("New", " ").is_err());
    }
}
