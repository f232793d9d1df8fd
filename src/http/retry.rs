//! Retry policy for repository requests.
//!
//! Client errors from a repository are final; everything else (server
//! errors, connection resets, timeouts) is worth another attempt.

use reqwest::StatusCode;

/// Maximum number of attempts for a repository request.
pub const MAX_RETRIES: usize = 3;

/// Delay between retry attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Errors that should not be retried.
#[derive(Debug)]
pub enum NonRetryableError {
    /// The repository does not host the requested path (HTTP 404 or 410)
    NotFound(String),
    /// Credentials were rejected (HTTP 401)
    Unauthorized(String),
    /// The repository refused access (HTTP 403)
    Forbidden(String),
    /// The repository is throttling requests (HTTP 429)
    TooManyRequests(String),
    /// Other client errors that won't succeed on retry
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::NotFound(url) => write!(f, "Not found: {}", url),
            NonRetryableError::Unauthorized(url) => {
                write!(f, "Repository requires authentication: {}", url)
            }
            NonRetryableError::Forbidden(url) => write!(f, "Access forbidden: {}", url),
            NonRetryableError::TooManyRequests(url) => {
                write!(f, "Repository rate limit exceeded: {}. Try again later.", url)
            }
            NonRetryableError::ClientError(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Classifies an error as retryable or non-retryable.
/// Returns Ok(()) if the error is retryable.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "(unknown url)".to_string());

    match error.status() {
        Some(StatusCode::NOT_FOUND) | Some(StatusCode::GONE) => {
            Err(NonRetryableError::NotFound(url))
        }
        Some(StatusCode::UNAUTHORIZED) => Err(NonRetryableError::Unauthorized(url)),
        Some(StatusCode::FORBIDDEN) => Err(NonRetryableError::Forbidden(url)),
        Some(StatusCode::TOO_MANY_REQUESTS) => Err(NonRetryableError::TooManyRequests(url)),
        Some(s) if s.is_client_error() => Err(NonRetryableError::ClientError(format!(
            "HTTP {} for {}",
            s.as_u16(),
            url
        ))),
        // 5xx, connection errors, timeouts
        _ => Ok(()),
    }
}

/// Checks if an error from `error_for_status()` should be retried.
/// Returns the original error if retryable, or a NonRetryableError if not.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}

/// Whether an error means the requested path simply does not exist.
pub fn is_not_found(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<NonRetryableError>(),
        Some(NonRetryableError::NotFound(_))
    )
}
