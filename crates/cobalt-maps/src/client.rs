//! HTTP client for the `SerpApi` search endpoint.
//!
//! Every call targets the same `search.json` URL; the `engine` parameter
//! selects Google Maps search or Google Maps directions.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::MapsError;
use crate::types::{DirectionsResponse, MapsResponse};

const DEFAULT_BASE_URL: &str = "https://serpapi.com/search.json";
const MAPS_ENGINE: &str = "google_maps";
const DIRECTIONS_ENGINE: &str = "google_maps_directions";
/// Zoom level sent with the `ll` location bias.
const LOCATION_ZOOM: &str = "14z";

/// Client for the `SerpApi` REST API.
///
/// Use [`SerpApiClient::new`] for production or
/// [`SerpApiClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl SerpApiClient {
    /// # Errors
    ///
    /// Returns [`MapsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, MapsError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom endpoint URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`MapsError::Provider`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, MapsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("cobalt/0.1 (service-discovery)")
            .build()?;

        let base_url = Url::parse(base_url)
            .map_err(|e| MapsError::Provider(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Free-text Google Maps search, optionally biased towards `near`.
    ///
    /// # Errors
    ///
    /// - [`MapsError::Http`] on network failure.
    /// - [`MapsError::Status`] on a non-2xx response.
    /// - [`MapsError::Provider`] if the provider reports a failed search.
    /// - [`MapsError::Deserialize`] if the body does not match the expected shape.
    pub async fn maps_search(
        &self,
        query: &str,
        near: Option<(f64, f64)>,
    ) -> Result<MapsResponse, MapsError> {
        let ll = near.map(|(lat, lng)| format!("@{lat},{lng},{LOCATION_ZOOM}"));
        let mut params = vec![("q", query)];
        if let Some(ll) = ll.as_deref() {
            params.push(("ll", ll));
        }
        self.get(MAPS_ENGINE, &params, "google_maps search").await
    }

    /// Looks up one place by its provider id.
    ///
    /// # Errors
    ///
    /// Same as [`SerpApiClient::maps_search`].
    pub async fn place(&self, place_id: &str) -> Result<MapsResponse, MapsError> {
        self.get(MAPS_ENGINE, &[("place_id", place_id)], "google_maps place")
            .await
    }

    /// Route between two free-form endpoints (`"lat,lng"` or an address).
    ///
    /// # Errors
    ///
    /// Same as [`SerpApiClient::maps_search`].
    pub async fn directions(
        &self,
        start: &str,
        end: &str,
    ) -> Result<DirectionsResponse, MapsError> {
        self.get(
            DIRECTIONS_ENGINE,
            &[("start_addr", start), ("end_addr", end)],
            "google_maps_directions",
        )
        .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        engine: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T, MapsError> {
        let url = self.build_url(engine, params);
        let body = self.request_json(&url).await?;
        Self::check_api_error(&body)?;
        serde_json::from_value(body).map_err(|e| MapsError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Builds the request URL with `engine`, `api_key` and the extra
    /// parameters percent-encoded via [`Url::query_pairs_mut`].
    fn build_url(&self, engine: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("engine", engine);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("api_key", &self.api_key);
        }
        url
    }

    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, MapsError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(MapsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| MapsError::Deserialize {
            context: "SerpApi response".to_string(),
            source: e,
        })
    }

    /// `SerpApi` reports "no results" as an `error` string on a search whose
    /// metadata status is still `Success`; that case passes through as an
    /// empty result. Any other `error` is a failed search.
    fn check_api_error(body: &serde_json::Value) -> Result<(), MapsError> {
        let Some(message) = body.get("error").and_then(serde_json::Value::as_str) else {
            return Ok(());
        };
        let search_status = body
            .get("search_metadata")
            .and_then(|m| m.get("status"))
            .and_then(serde_json::Value::as_str);
        if search_status == Some("Success") {
            return Ok(());
        }
        Err(MapsError::Provider(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> SerpApiClient {
        SerpApiClient::with_base_url("test-key", 5, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_puts_engine_first_and_key_last() {
        let client = test_client("https://serpapi.com/search.json");
        let url = client.build_url(MAPS_ENGINE, &[("q", "coffee")]);
        assert_eq!(
            url.as_str(),
            "https://serpapi.com/search.json?engine=google_maps&q=coffee&api_key=test-key"
        );
    }

    #[test]
    fn build_url_encodes_location_bias() {
        let client = test_client("https://serpapi.com/search.json");
        let url = client.build_url(MAPS_ENGINE, &[("ll", "@55.75,37.61,14z")]);
        assert!(
            url.as_str().contains("ll=%4055.75%2C37.61%2C14z"),
            "ll should be percent-encoded: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = SerpApiClient::with_base_url("k", 5, "not a url").expect_err("must fail");
        assert!(matches!(err, MapsError::Provider(_)));
    }

    #[test]
    fn no_results_error_passes_through() {
        let body = serde_json::json!({
            "search_metadata": { "status": "Success" },
            "error": "Google hasn't returned any results for this query."
        });
        assert!(SerpApiClient::check_api_error(&body).is_ok());
    }

    #[test]
    fn failed_search_error_is_surfaced() {
        let body = serde_json::json!({
            "search_metadata": { "status": "Error" },
            "error": "Invalid API key."
        });
        let err = SerpApiClient::check_api_error(&body).expect_err("must fail");
        assert!(matches!(err, MapsError::Provider(msg) if msg == "Invalid API key."));
    }
}
