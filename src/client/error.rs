use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend answered outside 200-299. The body is not decoded.
    #[error("HTTP {status} {status_text}")]
    Http { status: u16, status_text: String },

    /// Success status but the body was not the expected JSON.
    #[error("could not parse response body: {0}")]
    Parse(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid header '{0}'")]
    InvalidHeader(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for an end user. Parse failures read like HTTP failures.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http { status, status_text } if status_text.is_empty() => {
                format!("Request failed ({status})")
            }
            ClientError::Http { status, status_text } => {
                format!("Request failed ({status} {status_text})")
            }
            ClientError::Parse(_) => "Request failed (unexpected response from server)".to_string(),
            ClientError::Transport(_) => "Request failed (server unreachable)".to_string(),
            ClientError::InvalidUrl(_) | ClientError::InvalidHeader(_) => {
                "Request failed (client misconfigured)".to_string()
            }
        }
    }
}
