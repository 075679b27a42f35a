use crate::auth::AuthState;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    #[error("Unexpected content type {found:?}, expected application/json")]
    UnexpectedContentType { found: Option<String> },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Malformed scalar: {0}")]
    MalformedScalar(String),

    #[error("Cookie store error: {0}")]
    StoreIo(#[source] std::io::Error),

    #[error("No credentials available for login")]
    CredentialsMissing,

    #[error("{stage} was not accepted (HTTP {status})")]
    AuthRejected { stage: &'static str, status: u16 },

    #[error("{stage} redirected to unexpected location {location}")]
    UnexpectedRedirect { stage: &'static str, location: String },

    #[error("Invalid auth state: expected {expected:?}, currently {actual:?}")]
    InvalidAuthState { expected: AuthState, actual: AuthState },

    #[error("Input error: {0}")]
    Input(#[source] std::io::Error),
}

impl ClientError {
    /// True for the transport family: network failure, timeout, bad status or bad URL.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::UnexpectedStatus { .. } | ClientError::InvalidUrl(_)
        )
    }
}
