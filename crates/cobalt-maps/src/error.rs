use thiserror::Error;

/// Errors returned by the places provider client.
#[derive(Debug, Error)]
pub enum MapsError {
    /// No API key was configured.
    #[error("places provider is not configured")]
    Unavailable,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The provider answered 2xx but reported a failed search.
    #[error("provider error: {0}")]
    Provider(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
