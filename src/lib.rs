//! Client for the Elite: Dangerous companion web service.
//!
//! The crate logs in the way the official companion app does (credentials,
//! then an emailed verification code), keeps the resulting session cookie on
//! disk, and fetches the commander profile document.
//!
//! - [`scalar`]: decoding for fields the service sends as string or number
//! - [`cookies`]: the cookie jar and its file-backed store
//! - [`net`]: the HTTP session transport
//! - [`auth`] and [`client`]: the login state machine
//! - [`profile`]: the profile document model

pub mod auth;
pub mod client;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod net;
pub mod profile;
pub mod scalar;

pub use auth::{AuthState, LoginOutcome};
pub use client::CompanionClient;
pub use config::ClientConfig;
pub use errors::ClientError;
pub use profile::Profile;
