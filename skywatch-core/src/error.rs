use thiserror::Error;

/// Failure of the upstream fetch. Always recoverable: the next cycle retries.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error talking to weather provider: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather provider {endpoint} request failed with status {status}: {body}")]
    Upstream {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed {endpoint} response: {reason}")]
    MalformedResponse {
        endpoint: &'static str,
        reason: String,
    },
}

/// A sunrise/sunset string that is not `HH:MM AM|PM`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid time of day '{input}', expected e.g. \"07:15 AM\"")]
pub struct ParseError {
    pub input: String,
}

impl ParseError {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Why a cycle produced no derived view.
#[derive(Debug, Error)]
pub enum Unavailability {
    #[error("Waiting for data")]
    Waiting,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_offending_input() {
        let err = ParseError::new("25:99");
        assert!(err.to_string().contains("'25:99'"));
    }

    #[test]
    fn unavailability_is_transparent_over_fetch_error() {
        let err: Unavailability = FetchError::Upstream {
            endpoint: "current",
            status: 401,
            body: "API key invalid".into(),
        }
        .into();

        let msg = err.to_string();
        assert!(msg.contains("status 401"));
        assert!(msg.contains("API key invalid"));
    }
}
