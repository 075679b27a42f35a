use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use http::HeaderValue;
use time::OffsetDateTime;
use url::Url;

use crate::cookies::cookie_jar::DefaultCookieJar;
use crate::cookies::{Cookie, CookieJar, CookieStoreHandle, InMemoryCookieStore, JsonCookieStore};
use crate::errors::ClientError;

/// A [`DefaultCookieJar`] bound to a [`CookieStore`](crate::cookies::CookieStore).
///
/// This is the cookie store of the session: loaded once when opened, mutated
/// in memory as responses arrive, and written back **only** when
/// [`save`](Self::save) is called. A login handshake sets cookies on several
/// responses in a row; none of them touch the disk.
///
/// The jar is internally synchronized so it can be shared with the HTTP
/// transport, which reads and writes it on every redirect hop through
/// [`reqwest::cookie::CookieStore`].
pub struct PersistentCookieJar {
    /// Live cookie state.
    inner: RwLock<DefaultCookieJar>,
    /// Backend that receives snapshots on save.
    store_handle: CookieStoreHandle,
}

impl PersistentCookieJar {
    /// Loads the records held by `store_handle`. Records that expired while
    /// persisted are dropped.
    pub fn open(store_handle: CookieStoreHandle) -> Result<Self, ClientError> {
        let cookies = store_handle.load()?;
        Ok(Self {
            inner: RwLock::new(DefaultCookieJar::from_cookies(cookies, OffsetDateTime::now_utc())),
            store_handle,
        })
    }

    /// Opens a JSON cookie file. A missing file gives an empty jar.
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        Self::open(Arc::new(JsonCookieStore::new(path.into())))
    }

    /// An empty jar whose saves go nowhere durable.
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(DefaultCookieJar::new()),
            store_handle: Arc::new(InMemoryCookieStore::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, DefaultCookieJar> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DefaultCookieJar> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Live records matching `url`, longest path first.
    pub fn cookies_for(&self, url: &Url) -> Vec<Cookie> {
        self.read().cookies_for(url)
    }

    /// Merges `cookies` (same name+domain+path overwrites, otherwise appends).
    pub fn set_cookies(&self, url: &Url, cookies: Vec<Cookie>) {
        self.write().set_cookies(url, cookies);
    }

    /// Parses and stores `Set-Cookie` header values received from `url`.
    pub fn store_response_cookies(&self, url: &Url, headers: &mut dyn Iterator<Item = &HeaderValue>) {
        self.write().store_response_cookies(url, headers);
    }

    /// `Cookie` header value for a request to `url`.
    pub fn get_request_cookies(&self, url: &Url) -> Option<String> {
        self.read().get_request_cookies(url)
    }

    /// See [`DefaultCookieJar::patch_session_cookie`].
    pub fn patch_session_cookie(&self, name: &str, lifetime: std::time::Duration) -> usize {
        self.write().patch_session_cookie(name, lifetime, OffsetDateTime::now_utc())
    }

    pub fn remove_cookie(&self, url: &Url, cookie_name: &str) {
        self.write().remove_cookie(url, cookie_name);
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn all_cookies(&self) -> Vec<Cookie> {
        self.read().all_cookies()
    }

    /// Writes the current cookie set to the backing store.
    ///
    /// Session-only cookies are left out: they end with the process, like a
    /// browser session. Patch the ones that must survive first.
    ///
    /// The snapshot is taken under the lock and written after releasing it, so
    /// concurrent `set_cookies` calls land either wholly before or wholly
    /// after the saved state.
    pub fn save(&self) -> Result<(), ClientError> {
        let snapshot: Vec<Cookie> = self.all_cookies().into_iter().filter(|c| !c.is_session()).collect();
        self.store_handle.save(&snapshot)
    }
}

impl reqwest::cookie::CookieStore for PersistentCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.store_response_cookies(url, cookie_headers);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self.get_request_cookies(url)?;
        match HeaderValue::from_str(&header) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Cannot send cookies to {url}: {e}");
                None
            }
        }
    }
}
