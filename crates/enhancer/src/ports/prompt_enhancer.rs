//! Prompt Enhancer Port
//!
//! Abstract interface for the external generation call. One request, one
//! response: the rough prompt goes in, the rewritten prompt comes out.

use async_trait::async_trait;

use crate::domain::{errors::RequestError, GeminiModel};

/// Generation backend interface
///
/// # Example
///
/// ```rust,ignore
/// use prompt_enhancer::ports::PromptEnhancer;
///
/// struct CannedEnhancer;
///
/// #[async_trait]
/// impl PromptEnhancer for CannedEnhancer {
///     async fn enhance(&self, prompt: &str, model: GeminiModel, system_instruction: &str)
///         -> Result<String, RequestError> {
///         Ok(format!("You are an expert. {}", prompt))
///     }
/// }
/// ```
#[async_trait]
pub trait PromptEnhancer: Send + Sync {
    /// Rewrite `prompt` into a richer one
    ///
    /// Implementations fail with `RequestError::EmptyPrompt` on blank input,
    /// `RequestError::Backend` when the call errors, and
    /// `RequestError::EmptyResponse` when the backend returns no text.
    async fn enhance(
        &self,
        prompt: &str,
        model: GeminiModel,
        system_instruction: &str,
    ) -> Result<String, RequestError>;

    /// Provider name (e.g., "gemini")
    fn provider_name(&self) -> &str;
}
