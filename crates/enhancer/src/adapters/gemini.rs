//! Gemini enhancer - rewrites prompts through the `generateContent` REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::{errors::RequestError, GeminiModel};
use crate::ports::PromptEnhancer;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Enhancer backed by Google's Gemini models
#[derive(Clone)]
pub struct GeminiEnhancer {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiEnhancer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point at a different endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: GeminiModel) -> String {
        format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = model.as_str(),
            api_key = self.api_key
        )
    }
}

/// Wrap the user's text so the model treats it as material to rewrite
pub fn wrap_user_prompt(prompt: &str) -> String {
    format!("Here is the user's prompt to enhance:\n\n---\n\n{}", prompt)
}

#[async_trait]
impl PromptEnhancer for GeminiEnhancer {
    async fn enhance(
        &self,
        prompt: &str,
        model: GeminiModel,
        system_instruction: &str,
    ) -> Result<String, RequestError> {
        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: wrap_user_prompt(prompt),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
        };

        debug!(model = %model, "Sending enhancement request");

        let response = self
            .client
            .post(self.endpoint(model))
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "Error enhancing prompt");
                RequestError::Backend(err.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, "Gemini API returned an error");
            return Err(map_http_error(status, body));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| RequestError::Backend(format!("Failed to parse response: {}", err)))?;

        extract_text(&payload).ok_or(RequestError::EmptyResponse)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

fn map_http_error(status: StatusCode, body: String) -> RequestError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RequestError::Backend(format!("API key rejected ({}): {}", status, body))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            RequestError::Backend(format!("Rate limited ({}): {}", status, body))
        }
        _ => RequestError::Backend(format!("API error ({}): {}", status, body)),
    }
}

/// Concatenated text of the first candidate, trimmed; `None` when empty
fn extract_text(payload: &GenerateContentResponse) -> Option<String> {
    let candidate = payload.candidates.first()?;
    let text: String = candidate
        .content
        .as_ref()?
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================
// Request/Response Types
// ============================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_text_joins_parts_and_trims() {
        let payload = parse(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  You are " }, { "text": "an expert.\n" }] }
            }]
        }));
        assert_eq!(extract_text(&payload).as_deref(), Some("You are an expert."));
    }

    #[test]
    fn test_extract_text_empty_is_none() {
        assert_eq!(extract_text(&parse(serde_json::json!({}))), None);
        let blank = parse(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        }));
        assert_eq!(extract_text(&blank), None);
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: wrap_user_prompt("write a poem"),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: "be helpful".to_string(),
                }],
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be helpful");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(
            value["contents"][0]["parts"][0]["text"],
            "Here is the user's prompt to enhance:\n\n---\n\nwrite a poem"
        );
    }

    #[test]
    fn test_endpoint_uses_model_id() {
        let enhancer = GeminiEnhancer::new("k").with_base_url("http://localhost:9000/models/");
        assert_eq!(
            enhancer.endpoint(GeminiModel::Flash),
            "http://localhost:9000/models/gemini-2.5-flash:generateContent?key=k"
        );
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected_without_request() {
        let enhancer = GeminiEnhancer::new("k").with_base_url("http://127.0.0.1:9");
        let err = enhancer
            .enhance("   ", GeminiModel::Pro, "instruction")
            .await
            .unwrap_err();
        assert_eq!(err, RequestError::EmptyPrompt);
    }
}
