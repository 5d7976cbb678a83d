//! HTTP client for the remote chat-completion endpoint.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ChatConfig;
use crate::credential::Credential;
use crate::error::ChatError;

/// Returned in place of a reply when the service answers with no choices.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response received";

const DEFAULT_ERROR_MESSAGE: &str = "completion request failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Client for a single chat-completion endpoint.
///
/// The credential is handed in by whoever owns the session; the client
/// never reads it from storage itself.
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
    credential: Option<Credential>,
}

impl ChatClient {
    pub fn new(config: ChatConfig, credential: Option<Credential>) -> Result<Self, ChatError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
            credential,
        })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    /// Send the full message history and return the first reply.
    ///
    /// No retries and no streaming. An empty `choices` array is not an
    /// error: it yields [`NO_RESPONSE_PLACEHOLDER`].
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let credential = self.credential.as_ref().ok_or(ChatError::CredentialMissing)?;

        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        info!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            messages = messages.len(),
            "sending chat completion request"
        );
        let resp = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = remote_error_message(&text);
            warn!(status = status.as_u16(), message = %message, "chat completion failed");
            return Err(ChatError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CompletionResponse = resp.json().await?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty());

        match reply {
            Some(content) => {
                info!(chars = content.len(), "chat completion received");
                Ok(content)
            }
            None => {
                warn!("chat completion returned no choices");
                Ok(NO_RESPONSE_PLACEHOLDER.to_string())
            }
        }
    }
}

fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}
