//! Chat-completion client: a single request/response call to a remote model,
//! gated by a stored credential.

pub mod assistant;
mod client;
mod config;
mod credential;
mod error;

#[cfg(test)]
mod testing;

pub use assistant::{CaseConversation, analyze_case, improve_lawsuit};
pub use client::{ChatClient, ChatMessage, NO_RESPONSE_PLACEHOLDER, Role};
pub use config::{ChatConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use credential::{
    Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, validate_credential,
};
pub use error::ChatError;
