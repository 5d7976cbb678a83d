//! Labor-law assistant prompts layered on top of [`ChatClient::chat`].

use lexdraft_core::CaseDetails;
use tracing::info;

use crate::client::{ChatClient, ChatMessage, Role};
use crate::error::ChatError;

// ── Prompt templates ──

const ANALYSIS_SYSTEM_PROMPT: &str = "\
You are a Kosovo labor law expert assistant. Analyze the legal case and provide structured feedback including:
1. Strong points in the case
2. Weak points that need attention
3. Specific recommendations
4. Relevant legal grounds under Kosovo Labor Law
5. Success probability estimate (as percentage)

Focus specifically on Kosovo Labor Law and provide practical, actionable advice.";

const EDITOR_SYSTEM_PROMPT: &str = "\
You are a legal document editor specializing in Kosovo Labor Law. Help improve lawsuit documents by:
1. Making language more precise and legal
2. Strengthening legal arguments
3. Ensuring compliance with Kosovo Labor Law
4. Improving document structure and clarity

Always maintain the formal legal document format and ensure all changes are legally sound.";

const GUIDANCE_SYSTEM_PROMPT: &str = "\
You are a Kosovo labor law expert providing guidance on legal cases. Be helpful, professional, \
and provide specific advice based on Kosovo Labor Law. Keep responses concise but informative.";

pub const EDITOR_GREETING: &str = "I've generated your lawsuit document. You can review and edit it, \
or ask me to make specific changes. How can I help you improve this document?";

/// Free-form analysis of a case. Returns the model's text unparsed.
pub async fn analyze_case(
    client: &ChatClient,
    case_explanation: &str,
    details: &CaseDetails,
) -> Result<String, ChatError> {
    let user_prompt = format!(
        "Please analyze this employment case:\n\
         \n\
         Client: {client}\n\
         Case: {title}\n\
         Description: {case_explanation}\n\
         \n\
         Provide a detailed analysis focusing on Kosovo Labor Law requirements.",
        client = details.client_name,
        title = details.title,
    );
    client
        .chat(&[
            ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ])
        .await
}

/// Ask for a revised version of `document` addressing `request`.
pub async fn improve_lawsuit(
    client: &ChatClient,
    document: &str,
    request: &str,
) -> Result<String, ChatError> {
    let user_prompt = format!(
        "Current lawsuit document:\n\
         {document}\n\
         \n\
         User request: {request}\n\
         \n\
         Please provide an improved version of the document addressing the user's request."
    );
    client
        .chat(&[
            ChatMessage::system(EDITOR_SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ])
        .await
}

/// Chat sidebar for a case: an ordered user/assistant history.
#[derive(Debug, Clone)]
pub struct CaseConversation {
    history: Vec<ChatMessage>,
}

impl Default for CaseConversation {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseConversation {
    /// A conversation opened by the editor greeting.
    pub fn new() -> Self {
        Self {
            history: vec![ChatMessage::assistant(EDITOR_GREETING)],
        }
    }

    /// Greeting followed by the generated document, so follow-up questions
    /// are asked with the lawsuit text in context.
    pub fn for_document(document: &str) -> Self {
        let mut conversation = Self::new();
        conversation
            .history
            .push(ChatMessage::assistant(document.to_string()));
        conversation
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Send one user turn. Blank input is ignored and returns `None`.
    ///
    /// The history only grows when the call succeeds.
    pub async fn send(
        &mut self,
        client: &ChatClient,
        message: &str,
    ) -> Result<Option<String>, ChatError> {
        if message.trim().is_empty() {
            return Ok(None);
        }

        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(GUIDANCE_SYSTEM_PROMPT));
        messages.extend(
            self.history
                .iter()
                .filter(|m| m.role != Role::System)
                .cloned(),
        );
        messages.push(ChatMessage::user(message));

        let reply = client.chat(&messages).await?;
        info!(turns = self.history.len() + 2, "case conversation reply received");

        self.history.push(ChatMessage::user(message));
        self.history.push(ChatMessage::assistant(reply.clone()));
        Ok(Some(reply))
    }
}
