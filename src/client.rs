// src/client.rs
//! [`CompanionClient`]: the session handle a caller threads through all calls.
//!
//! It owns the [`SessionClient`] (and through it the cookie jar) and drives
//! the [`AuthState`] machine:
//!
//! ```text
//! Unauthenticated --login--> AwaitingVerification --verify--> Authenticated
//!        \______________________login_____________________________/
//! ```
//!
//! Every transition either completes or leaves the state as it was, so a
//! failed call can simply be repeated.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sedr::{ClientConfig, CompanionClient, LoginOutcome};
//! use sedr::cookies::PersistentCookieJar;
//!
//! # async fn run() -> Result<(), sedr::ClientError> {
//! let config = ClientConfig::from_env()?;
//! let jar = Arc::new(PersistentCookieJar::open_file(&config.cookie_file)?);
//! let mut client = CompanionClient::new(&config, jar)?;
//!
//! if client.need_login() {
//!     if client.login("cmdr@example.com", "hunter2").await? == LoginOutcome::VerificationRequired {
//!         client.verify("12345").await?;
//!     }
//!     client.save_session()?;
//! }
//!
//! let profile = client.get_profile().await?;
//! println!("{} has {} credits", profile.commander.name, profile.commander.credits);
//! # Ok(())
//! # }
//! ```
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthState, LoginForm, LoginOutcome, RedirectSignal, VerifyForm, CONFIRM_PATH, LOGIN_PATH};
use crate::config::ClientConfig;
use crate::cookies::PersistentCookieJar;
use crate::errors::ClientError;
use crate::net::{HttpDebugger, Response, SessionClient};
use crate::profile::{fetch_profile, Profile};

pub struct CompanionClient {
    /// Transport and cookie jar
    session: SessionClient,
    /// Current position in the login flow
    state: AuthState,
    /// Name of the cookie holding the session credential
    session_cookie_name: String,
    /// Lifetime given to that cookie when it arrives without expiry
    session_cookie_lifetime: Duration,
}

impl CompanionClient {
    /// Builds a client around an opened cookie jar.
    ///
    /// Starts as [`AuthState::Authenticated`] when the jar already holds a
    /// cookie for the login endpoint, [`AuthState::Unauthenticated`] otherwise.
    pub fn new(config: &ClientConfig, cookie_jar: Arc<PersistentCookieJar>) -> Result<Self, ClientError> {
        let mut client = Self {
            session: SessionClient::new(config, cookie_jar)?,
            state: AuthState::Unauthenticated,
            session_cookie_name: config.session_cookie_name.clone(),
            session_cookie_lifetime: config.session_cookie_lifetime,
        };

        if !client.need_login() {
            log::info!("Reusing stored session");
            client.state = AuthState::Authenticated;
        }
        Ok(client)
    }

    pub fn with_debugger(mut self, debugger: HttpDebugger) -> Self {
        self.session.set_debugger(Some(debugger));
        self
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionClient {
        &mut self.session
    }

    /// True when no stored cookie matches the login URL. Purely local.
    pub fn need_login(&self) -> bool {
        match self.session.url_for(LOGIN_PATH) {
            Ok(url) => self.session.cookie_jar().cookies_for(&url).is_empty(),
            Err(_) => true,
        }
    }

    /// Submits credentials to the login endpoint.
    ///
    /// On success the state becomes [`AuthState::AwaitingVerification`] or,
    /// if the service trusts this device already, [`AuthState::Authenticated`].
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginOutcome, ClientError> {
        log::info!("Logging in as {email}");
        let res = self
            .session
            .post_form("Login", LOGIN_PATH, &LoginForm { email, password })
            .await?;

        let outcome = match self.redirect_signal("Login", &res)? {
            RedirectSignal::VerificationRequired => LoginOutcome::VerificationRequired,
            RedirectSignal::SessionConfirmed => LoginOutcome::Authenticated,
        };

        self.patch_session_cookie();
        self.state = outcome.into();
        log::info!("Login accepted, now {:?}", self.state);
        Ok(outcome)
    }

    /// Submits the one-time verification code.
    pub async fn verify(&mut self, code: &str) -> Result<(), ClientError> {
        if self.state != AuthState::AwaitingVerification {
            return Err(ClientError::InvalidAuthState {
                expected: AuthState::AwaitingVerification,
                actual: self.state,
            });
        }

        let res = self
            .session
            .post_form("Verify", CONFIRM_PATH, &VerifyForm { code })
            .await?;

        match self.redirect_signal("Verify", &res)? {
            RedirectSignal::SessionConfirmed => {}
            RedirectSignal::VerificationRequired => {
                return Err(ClientError::UnexpectedRedirect {
                    stage: "Verify",
                    location: CONFIRM_PATH.to_string(),
                })
            }
        }

        self.patch_session_cookie();
        self.state = AuthState::Authenticated;
        log::info!("Verification accepted, session established");
        Ok(())
    }

    /// Asks `prompt` for the verification code, then [`verify`](Self::verify)s it.
    pub async fn verify_interactive<F>(&mut self, prompt: F) -> Result<(), ClientError>
    where
        F: FnOnce() -> io::Result<String>,
    {
        let code = prompt().map_err(ClientError::Input)?;
        self.verify(code.trim()).await
    }

    /// Persists the cookie jar. Call after reaching [`AuthState::Authenticated`].
    pub fn save_session(&self) -> Result<(), ClientError> {
        self.session.cookie_jar().save()
    }

    /// Forgets all cookies in memory and returns to [`AuthState::Unauthenticated`].
    /// Call [`save_session`](Self::save_session) to make it stick.
    pub fn logout(&mut self) {
        self.session.cookie_jar().clear();
        self.state = AuthState::Unauthenticated;
    }

    pub async fn get_profile(&self) -> Result<Profile, ClientError> {
        fetch_profile(&self.session).await
    }

    /// Reads the redirect signal out of a login-flow response.
    fn redirect_signal(&self, stage: &'static str, res: &Response) -> Result<RedirectSignal, ClientError> {
        let Some(target) = res.redirect_target() else {
            log::warn!("{stage} not accepted: HTTP {} without redirect", res.status);
            return Err(ClientError::AuthRejected {
                stage,
                status: res.status,
            });
        };

        RedirectSignal::classify(self.session.base_url(), &res.url, &target).ok_or_else(|| {
            ClientError::UnexpectedRedirect {
                stage,
                location: target.to_string(),
            }
        })
    }

    fn patch_session_cookie(&self) {
        let patched = self
            .session
            .cookie_jar()
            .patch_session_cookie(&self.session_cookie_name, self.session_cookie_lifetime);
        if patched == 0 {
            log::debug!("No {} cookie to patch", self.session_cookie_name);
        }
    }
}
