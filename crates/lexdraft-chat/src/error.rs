use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("API key not set")]
    CredentialMissing,
    #[error("invalid API key or connection failed: {0}")]
    CredentialInvalid(String),
    #[error("completion service returned {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("credential store error: {0}")]
    Store(#[from] std::io::Error),
}
