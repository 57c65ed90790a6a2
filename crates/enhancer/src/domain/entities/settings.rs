//! Settings - Singleton user configuration

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{GeminiModel, Language};

/// Built-in system instruction steering the generation backend
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"You are an AI assistant specializing in prompt engineering for large language models. Your sole purpose is to rewrite a user's prompt to be more effective for the Gemini model.

**Task:**
Transform the user's provided prompt into a high-quality, detailed, and structured prompt.

**Guidelines:**
- **Clarity and Specificity:** Add specific details, context, and constraints to eliminate ambiguity.
- **Persona:** Define a clear persona for the AI to adopt (e.g., "You are an expert astrophysicist").
- **Format:** Specify a desired output format (e.g., "Use markdown headings for each section," "Provide the answer as a JSON object with keys 'name' and 'contribution'").
- **Constraints:** Include negative constraints (e.g., "Do not include a lengthy introduction," "Avoid technical jargon").
- **Chain of Thought:** You may instruct the model to think step-by-step.

**CRITICAL RULE:**
- **Your ONLY output must be the rewritten prompt text itself.**
- **Do NOT include any preamble, conversational text, or explanation like "Here is the enhanced prompt:".**
- **Do NOT wrap the output in markdown code fences (```).**
- **The output should be immediately usable as a new prompt.**
"#;

/// Settings - model, system instruction and language
///
/// Missing fields take their defaults when decoding, so a partial record
/// from an older backup still loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(alias = "geminiModel")]
    pub model: GeminiModel,
    pub system_instruction: String,
    pub language: Language,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: GeminiModel::default(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            language: Language::default(),
        }
    }
}

impl Settings {
    /// Copy with the system instruction reset, other fields unchanged
    pub fn with_default_instruction(self) -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            ..self
        }
    }

    pub fn has_default_instruction(&self) -> bool {
        self.system_instruction == DEFAULT_SYSTEM_INSTRUCTION
    }
}
