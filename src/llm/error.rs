use std::{sync::LazyLock, time::Duration};

use async_openai::error::OpenAIError;
use regex::Regex;
use thiserror::Error;

static RETRY_IN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)retry in (\d+(?:\.\d+)?)\s*s").expect("Static regex is valid")
});

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("rate limited by provider (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("provider error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("request to provider timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("unauthorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("bad request (HTTP {status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("Content not found in response: {0}")]
    ContentNotFound(String),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("OpenAI error: {0}")]
    OpenAIError(#[from] OpenAIError),

    #[error("Error: {0}")]
    OtherError(String),

    #[error("gave up after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: Box<LLMError> },
}

impl LLMError {
    /// Whether trying the same request again may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LLMError::RateLimited { .. }
                | LLMError::ServerError { .. }
                | LLMError::Timeout
                | LLMError::Connection(_)
        )
    }

    /// Wait time requested by the provider, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LLMError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Maps a non-success HTTP status and its body to an error.
    ///
    /// `retry_after` comes from the `Retry-After` header; when absent, a
    /// "retry in N s" hint in the error message is used instead.
    pub fn from_status(status: u16, retry_after: Option<Duration>, body: &str) -> Self {
        let message = error_message(body);
        match status {
            429 => LLMError::RateLimited {
                retry_after: retry_after.or_else(|| retry_hint(&message)),
            },
            401 | 403 => LLMError::Unauthorized { status, message },
            408 => LLMError::Timeout,
            400..=499 => LLMError::BadRequest { status, message },
            500..=599 => LLMError::ServerError { status, message },
            _ => LLMError::OtherError(format!("unexpected HTTP {status}: {message}")),
        }
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout
        } else if err.is_connect() || err.is_request() {
            LLMError::Connection(err.to_string())
        } else {
            LLMError::OtherError(err.to_string())
        }
    }
}

/// Pulls `error.message` out of an OpenAI-style error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn retry_hint(message: &str) -> Option<Duration> {
    RETRY_IN_RE
        .captures(message)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        let err = LLMError::from_status(429, Some(Duration::from_secs(7)), "");
        assert!(err.is_transient());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));

        let err = LLMError::from_status(503, None, "upstream overloaded");
        assert!(matches!(err, LLMError::ServerError { status: 503, .. }));
        assert!(err.is_transient());

        let err = LLMError::from_status(
            401,
            None,
            r#"{"error": {"message": "Incorrect API key provided"}}"#,
        );
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "unauthorized (HTTP 401): Incorrect API key provided"
        );

        let err = LLMError::from_status(400, None, "bad");
        assert!(matches!(err, LLMError::BadRequest { status: 400, .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_retry_hint_from_message() {
        let err = LLMError::from_status(
            429,
            None,
            r#"{"error": {"message": "Quota exceeded. Please retry in 12.5s."}}"#,
        );
        assert_eq!(err.retry_after(), Some(Duration::from_millis(12_500)));

        let err = LLMError::from_status(429, None, "slow down");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_retries_exhausted_is_final() {
        let err = LLMError::RetriesExhausted {
            attempts: 3,
            last: Box::new(LLMError::Timeout),
        };
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "gave up after 3 attempt(s): request to provider timed out"
        );
    }
}
