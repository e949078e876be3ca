use thiserror::Error;

use crate::model::ErrorResult;

/// Why a lookup produced no weather. Every variant is terminal for the
/// request that raised it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {code}: {raw}")]
    Status { code: u16, raw: String },

    #[error("could not connect: {0}")]
    NoConnection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("too many redirects: {0}")]
    TooManyRedirects(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("weather service reported status {cod}")]
    ApplicationStatus { cod: String, message: Option<String> },

    #[error("could not decode weather payload: {0}")]
    Payload(String),
}

impl FetchError {
    /// Sorts a reqwest failure into the transport categories. Connection
    /// failures take precedence over timeouts, so a connect timeout counts
    /// as "No Internet". The URL is stripped since it carries the API key.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let details = err.to_string();

        if let Some(status) = err.status() {
            FetchError::Status {
                code: status.as_u16(),
                raw: details,
            }
        } else if err.is_connect() {
            FetchError::NoConnection(details)
        } else if err.is_timeout() {
            FetchError::Timeout(details)
        } else if err.is_redirect() {
            FetchError::TooManyRedirects(details)
        } else {
            FetchError::Transport(details)
        }
    }

    pub fn to_error_result(&self) -> ErrorResult {
        match self {
            FetchError::Status { code, raw } => status_message(*code, raw),
            FetchError::NoConnection(_) => ErrorResult::new(
                "No Internet",
                "Check your internet connection and try again!",
            ),
            FetchError::Timeout(_) => ErrorResult::new(
                "Request Timed Out",
                "The server took too long to respond.",
            ),
            FetchError::TooManyRedirects(_) => {
                ErrorResult::new("Too Many Redirects", "Check the URL and try again.")
            }
            FetchError::Transport(details) | FetchError::Payload(details) => {
                ErrorResult::new("An unexpected error occurred:", details.clone())
            }
            FetchError::ApplicationStatus { cod, message } => ErrorResult::new(
                format!("Error: {cod} Unexpected Response"),
                message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "The weather service did not return weather data.".into()),
            ),
        }
    }
}

const STATUS_MESSAGES: &[(u16, &str, &str)] = &[
    (400, "Error: 400 Bad Request", "Please check your input."),
    (
        401,
        "Error: 401 Unauthorized",
        "Authentication is required or failed.",
    ),
    (
        403,
        "Error: 403 Forbidden",
        "You do not have permission to access this resource.",
    ),
    (
        404,
        "Error: 404 Not Found",
        "The requested city could not be found.",
    ),
    (
        500,
        "Error: 500 Internal Server Error",
        "The server encountered an error.",
    ),
    (
        501,
        "Error: 501 Not Implemented",
        "The server does not support the request.",
    ),
    (
        502,
        "Error: 502 Bad Gateway",
        "Invalid response from the upstream server.",
    ),
    (
        504,
        "Error: 504 Gateway Timeout",
        "The server did not receive a timely response.",
    ),
];

/// Fixed message for a known status; anything else passes `raw` through.
pub fn status_message(code: u16, raw: &str) -> ErrorResult {
    match STATUS_MESSAGES.iter().find(|(c, _, _)| *c == code) {
        Some((_, headline, detail)) => ErrorResult::new(*headline, *detail),
        None => ErrorResult::new(format!("{raw} Unknown Error"), "Please try again later."),
    }
}
