use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Client-supplied ids longer than this are replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request id carried through extensions and echoed as `x-request-id`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    admitted: usize,
}

/// Fixed-window limiter shared by every `/api` route.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    current: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            current: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                admitted: 0,
            })),
        }
    }

    /// Counts one request against the current window.
    ///
    /// Returns the time left until the window resets when the request is
    /// over the limit.
    async fn admit(&self) -> Result<(), Duration> {
        let mut current = self.current.lock().await;
        let elapsed = current.opened_at.elapsed();
        if elapsed >= self.window {
            current.opened_at = Instant::now();
            current.admitted = 0;
        } else if current.admitted >= self.max_requests {
            return Err(self.window - elapsed);
        }
        current.admitted += 1;
        Ok(())
    }
}

fn accepted_request_id(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    let printable = raw.bytes().all(|b| b.is_ascii_graphic());
    (!raw.is_empty() && raw.len() <= MAX_REQUEST_ID_LEN && printable).then_some(raw)
}

/// Tags each request with a [`RequestId`], reusing a sane `x-request-id`
/// header from the client or minting a `UUIDv4`.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(accepted_request_id)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }
    res
}

/// Rejects requests over the window with `429 rate_limited` and a
/// `Retry-After` hint in whole seconds.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let Err(retry_in) = rate_limit.admit().await else {
        return next.run(req).await;
    };

    let rid = req
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();
    let retry_secs = retry_in.as_secs().max(1);
    tracing::warn!(
        request_id = %rid,
        method = %req.method(),
        path = req.uri().path(),
        retry_secs,
        "rate limit exceeded"
    );

    let mut res = ApiError::new(rid, "rate_limited", "rate limit exceeded").into_response();
    res.headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(retry_secs));
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_rejects_blank_long_and_unprintable_values() {
        assert_eq!(accepted_request_id(" abc-123 "), Some("abc-123"));
        assert_eq!(accepted_request_id("   "), None);
        assert_eq!(accepted_request_id(&"x".repeat(MAX_REQUEST_ID_LEN + 1)), None);
        assert_eq!(accepted_request_id("has space"), None);
    }

    #[tokio::test]
    async fn limiter_admits_up_to_the_limit_then_reports_wait() {
        let limiter = RateLimitState::new(2, Duration::from_secs(60));
        assert!(limiter.admit().await.is_ok());
        assert!(limiter.admit().await.is_ok());

        let wait = limiter.admit().await.expect_err("third request is over the limit");
        assert!(wait <= Duration::from_secs(60));
        assert!(wait > Duration::from_secs(55));
    }

    #[tokio::test]
    async fn limiter_reopens_after_the_window() {
        let limiter = RateLimitState::new(1, Duration::from_millis(20));
        assert!(limiter.admit().await.is_ok());
        assert!(limiter.admit().await.is_err());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.admit().await.is_ok());
    }
}
