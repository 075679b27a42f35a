//! Cookie store infrastructure.
//!
//! A **cookie store** is the persistence layer behind a
//! [`PersistentCookieJar`](crate::cookies::PersistentCookieJar). The jar keeps
//! the live state in memory; the store only reads it once at open time and
//! writes a full snapshot whenever the caller asks for a save.
//!
//! This module exports two implementations:
//! - [`JsonCookieStore`]: single JSON file, rewritten atomically on save.
//! - [`InMemoryCookieStore`]: keeps the last snapshot in memory (tests, throwaway sessions).
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use sedr::cookies::{JsonCookieStore, PersistentCookieJar};
//!
//! let store = Arc::new(JsonCookieStore::new(".sedr-cookies".into()));
//! let jar = PersistentCookieJar::open(store)?;
//! // ... log in ...
//! jar.save()?;
//! # Ok::<(), sedr::ClientError>(())
//! ```
mod in_memory;
mod json;

use std::sync::Arc;

use crate::cookies::Cookie;
use crate::errors::ClientError;

/// File-backed JSON cookie store.
pub use json::JsonCookieStore;
/// Memory-only cookie store.
pub use in_memory::InMemoryCookieStore;

/// A handle to a type-erased cookie store.
pub type CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>;

/// Durable storage for a set of cookie records.
///
/// Implementations must be `Send + Sync`; they are called with `&self` and
/// manage their own synchronization.
pub trait CookieStore: Send + Sync {
    /// Reads all persisted records. A store that was never saved yields an empty list.
    fn load(&self) -> Result<Vec<Cookie>, ClientError>;

    /// Replaces the persisted records with `cookies`.
    ///
    /// Either the full snapshot is stored or the previous one is left intact.
    fn save(&self, cookies: &[Cookie]) -> Result<(), ClientError>;
}
