//! Speech-to-text for voice search.

use cobalt_core::ProviderState;

use crate::client::OpenAiClient;
use crate::error::AiError;

#[derive(Debug, Clone)]
pub struct Transcriber {
    state: ProviderState<OpenAiClient>,
}

impl Transcriber {
    #[must_use]
    pub fn new(state: ProviderState<OpenAiClient>) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    /// # Errors
    ///
    /// Returns [`AiError::Unavailable`] without credentials, otherwise any
    /// client error.
    pub async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, AiError> {
        let client = self.state.handle().ok_or(AiError::Unavailable)?;
        let text = client.transcribe(audio, file_name).await?;
        tracing::debug!(chars = text.chars().count(), "transcribed audio");
        Ok(text)
    }
}
