// src/auth.rs
//! Authentication state machine pieces.
//!
//! The companion service does not say "credentials accepted" with a status
//! code. It says it with **where it redirects**:
//!
//! | request                | redirect target   | meaning                          |
//! |------------------------|-------------------|----------------------------------|
//! | `POST /user/login`     | `/user/confirm`   | credentials ok, code was emailed |
//! | `POST /user/login`     | `/`               | credentials ok, device trusted   |
//! | `POST /user/confirm`   | `/`               | code ok, session established     |
//!
//! Anything that re-renders the form (a 2xx) means the input was rejected.
//! [`RedirectSignal`] recognises those hops; the session transport stops on
//! them instead of following, and
//! [`CompanionClient`](crate::CompanionClient) turns them into
//! [`AuthState`] transitions.
use serde::Serialize;
use url::Url;

pub const LOGIN_PATH: &str = "/user/login";
pub const CONFIRM_PATH: &str = "/user/confirm";
pub const ROOT_PATH: &str = "/";

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No session cookie is held.
    Unauthenticated,
    /// Credentials were accepted; a verification code must be submitted.
    AwaitingVerification,
    /// A confirmed session cookie is held.
    Authenticated,
}

/// What a successful [`login`](crate::CompanionClient::login) reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A one-time code was sent; call `verify` next.
    VerificationRequired,
    /// The service skipped verification; the session is ready.
    Authenticated,
}

impl From<LoginOutcome> for AuthState {
    fn from(outcome: LoginOutcome) -> Self {
        match outcome {
            LoginOutcome::VerificationRequired => AuthState::AwaitingVerification,
            LoginOutcome::Authenticated => AuthState::Authenticated,
        }
    }
}

/// A redirect hop that carries meaning for the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectSignal {
    /// Login endpoint → verification endpoint.
    VerificationRequired,
    /// Login or verification endpoint → root.
    SessionConfirmed,
}

impl RedirectSignal {
    /// Classifies the hop `from` → `to`. Paths are taken relative to
    /// `base_url`, and both ends must be on the base origin.
    pub fn classify(base_url: &Url, from: &Url, to: &Url) -> Option<Self> {
        let origin = base_url.origin();
        if from.origin() != origin || to.origin() != origin {
            return None;
        }

        let from = relative_path(base_url, from);
        let to = relative_path(base_url, to);

        match (from, to) {
            (LOGIN_PATH, CONFIRM_PATH) => Some(RedirectSignal::VerificationRequired),
            (LOGIN_PATH | CONFIRM_PATH, ROOT_PATH) => Some(RedirectSignal::SessionConfirmed),
            _ => None,
        }
    }
}

/// `url`'s path with the base URL's path prefix removed; `/` when nothing is left.
fn relative_path<'a>(base_url: &Url, url: &'a Url) -> &'a str {
    let prefix = base_url.path().trim_end_matches('/');
    let path = url.path().strip_prefix(prefix).unwrap_or(url.path());
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        ROOT_PATH
    } else {
        path
    }
}

#[derive(Serialize)]
pub(crate) struct LoginForm<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct VerifyForm<'a> {
    pub code: &'a str,
}
