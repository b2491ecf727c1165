use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    /// No API key was configured.
    #[error("language model provider is not configured")]
    Unavailable,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The completion came back without any message content.
    #[error("completion contained no content")]
    EmptyCompletion,

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
