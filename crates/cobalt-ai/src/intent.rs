//! Free-text query to structured search intent.

use cobalt_core::{ProviderState, SearchIntent};
use serde::Deserialize;

use crate::client::OpenAiClient;
use crate::error::AiError;

const SYSTEM_PROMPT: &str = "You are a Google Maps search assistant. Based on the user's query, \
determine what type of service or business they're looking for. Return a JSON object with: \
'type' (business type like 'hair salon', 'massage', 'repair shop'), 'keyword' (main search \
keyword), and 'location' (if mentioned).";
const MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.3;

/// The object the model is asked to produce.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct MapsFilters {
    #[serde(default, rename = "type")]
    pub business_type: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl MapsFilters {
    /// Folds the filters into an intent, keeping `query` as keyword when the
    /// model did not supply one.
    #[must_use]
    pub fn into_intent(self, query: &str) -> SearchIntent {
        SearchIntent {
            business_type: non_blank(self.business_type),
            keyword: non_blank(self.keyword).unwrap_or_else(|| query.to_string()),
            location: non_blank(self.location),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryIntentResolver {
    state: ProviderState<OpenAiClient>,
}

impl QueryIntentResolver {
    #[must_use]
    pub fn new(state: ProviderState<OpenAiClient>) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn unconfigured() -> Self {
        Self::new(ProviderState::Unconfigured)
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    /// Asks the model for search filters.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Unavailable`] without credentials,
    /// [`AiError::Deserialize`] when the reply is not the expected object, or
    /// any client error.
    pub async fn extract_filters(&self, query: &str) -> Result<MapsFilters, AiError> {
        let client = self.state.handle().ok_or(AiError::Unavailable)?;
        let content = client
            .chat_json(SYSTEM_PROMPT, query, MAX_TOKENS, TEMPERATURE)
            .await?;
        parse_filters(&content)
    }

    /// Resolves `query` to an intent, degrading to
    /// [`SearchIntent::passthrough`] on any failure.
    pub async fn resolve(&self, query: &str) -> SearchIntent {
        match self.extract_filters(query).await {
            Ok(filters) => {
                let intent = filters.into_intent(query);
                tracing::debug!(
                    query,
                    keyword = %intent.keyword,
                    business_type = ?intent.business_type,
                    "resolved search intent"
                );
                intent
            }
            Err(AiError::Unavailable) => SearchIntent::passthrough(query),
            Err(e) => {
                tracing::warn!(error = %e, query, "intent resolution failed; using raw query");
                SearchIntent::passthrough(query)
            }
        }
    }
}

/// Parses the model reply, tolerating a surrounding markdown code fence.
fn parse_filters(text: &str) -> Result<MapsFilters, AiError> {
    let json = extract_code_block(text).unwrap_or_else(|| text.trim());
    serde_json::from_str(json).map_err(|e| {
        tracing::warn!(
            error = %e,
            preview = %json.chars().take(200).collect::<String>(),
            "model reply is not a filters object"
        );
        AiError::Deserialize {
            context: "maps filters".to_string(),
            source: e,
        }
    })
}

fn extract_code_block(text: &str) -> Option<&str> {
    let text = text.trim();
    if !text.starts_with("```") {
        return None;
    }
    let first_newline = text.find('\n')?;
    let after_fence = &text[first_newline + 1..];
    let end = after_fence.rfind("```")?;
    Some(after_fence[..end].trim())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
