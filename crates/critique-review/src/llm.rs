use std::future::Future;
use std::time::Duration;

use critique_core::{CritiqueError, DiffResult, LlmConfig, ResponseSchema, ReviewText, Secret};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::prompt::build_review_prompt;

const SERVICE: &str = "completion";

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use critique_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Review this code".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use critique_review::llm::Role;
///
/// let role = Role::User;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"user\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// Something that turns a diff into review text.
pub trait ReviewModel {
    /// Ask for a review of `diff`, written in `language`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails, or a data error if the
    /// response carries no review.
    fn review(
        &self,
        diff: &DiffResult,
        language: &str,
    ) -> impl Future<Output = Result<ReviewText, CritiqueError>> + Send;
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes a chat-completions endpoint:
/// OpenAI, Ollama, vLLM, LiteLLM, etc.
///
/// # Examples
///
/// ```
/// use critique_core::{LlmConfig, Secret};
/// use critique_review::llm::LlmClient;
///
/// let client = LlmClient::new(&LlmConfig::default(), Secret::new("sk-test")).unwrap();
/// assert_eq!(client.model(), "gpt-3.5-turbo");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: Secret,
}

impl LlmClient {
    /// Create a new LLM client from configuration and a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns [`CritiqueError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig, api_key: Secret) -> Result<Self, CritiqueError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CritiqueError::Http {
                service: SERVICE,
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a chat completion request and return the generated text.
    ///
    /// Exactly one request is made.
    ///
    /// # Errors
    ///
    /// Returns [`CritiqueError::Transport`] with the status code on a
    /// non-success response, [`CritiqueError::Http`] on network or decoding
    /// failures, and a data error if the response holds no content.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, CritiqueError> {
        let body = CompletionRequest {
            model: &self.config.model,
            messages,
        };
        debug!(endpoint = %self.config.endpoint, model = %self.config.model, "sending completion request");

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CritiqueError::Http {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(CritiqueError::Transport {
                service: SERVICE,
                status: status.as_u16(),
                body: body_text,
            });
        }

        let response_body: serde_json::Value =
            response.json().await.map_err(|e| CritiqueError::Http {
                service: SERVICE,
                message: format!("failed to parse response: {e}"),
            })?;

        extract_content(&response_body, self.config.response_schema)
    }
}

impl ReviewModel for LlmClient {
    async fn review(&self, diff: &DiffResult, language: &str) -> Result<ReviewText, CritiqueError> {
        let messages = [ChatMessage {
            role: Role::User,
            content: build_review_prompt(diff, language),
        }];
        let content = self.chat(&messages).await?;
        info!(model = %self.config.model, chars = content.len(), "received review");
        Ok(ReviewText::new(content))
    }
}

/// Pull the generated text out of a completion response body.
///
/// # Errors
///
/// Returns [`CritiqueError::EmptyCompletion`] when `choices` is empty, and
/// [`CritiqueError::MissingField`] when the expected field is absent.
///
/// # Examples
///
/// ```
/// use critique_core::ResponseSchema;
/// use critique_review::llm::extract_content;
///
/// let body = serde_json::json!({"choices": [{"message": {"content": "Looks good"}}]});
/// assert_eq!(extract_content(&body, ResponseSchema::Choices).unwrap(), "Looks good");
///
/// let flat = serde_json::json!({"message": "Looks good"});
/// assert_eq!(extract_content(&flat, ResponseSchema::Message).unwrap(), "Looks good");
/// ```
pub fn extract_content(
    body: &serde_json::Value,
    schema: ResponseSchema,
) -> Result<String, CritiqueError> {
    const DOCUMENT: &str = "completion response";

    match schema {
        ResponseSchema::Choices => {
            let choices = body
                .get("choices")
                .and_then(|c| c.as_array())
                .ok_or(CritiqueError::MissingField {
                    document: DOCUMENT,
                    field: "choices",
                })?;
            let first = choices.first().ok_or(CritiqueError::EmptyCompletion)?;
            first
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str())
                .map(str::to_string)
                .ok_or(CritiqueError::MissingField {
                    document: DOCUMENT,
                    field: "choices[0].message.content",
                })
        }
        ResponseSchema::Message => body
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .ok_or(CritiqueError::MissingField {
                document: DOCUMENT,
                field: "message",
            }),
    }
}
