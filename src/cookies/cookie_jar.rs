//! Cookie jar abstraction and a simple in-memory implementation.
//!
//! A **cookie jar** holds the cookies of the one account this client talks
//! for. The session client passes request/response metadata to the jar so it
//! can update and query cookies.
//!
//! This module defines the [`CookieJar`] trait and [`DefaultCookieJar`],
//! which stores cookies **in memory only**, in insertion order. Persistence
//! is layered on top by
//! [`PersistentCookieJar`](crate::cookies::PersistentCookieJar).
//!
//! ## Notes
//! - Matching follows RFC 6265: domain-match (host-only cookies need the exact
//!   host), path-match on segment boundaries, `Secure` only over HTTPS.
//! - Expired records are never returned; they are dropped on the next write.
//! - This type is **not** internally synchronized.
//!
use http::HeaderValue;
use time::OffsetDateTime;
use url::Url;

use crate::cookies::Cookie;

/// A cookie jar keeps the cookies for one session.
pub trait CookieJar: Send + Sync {
    /// Stores cookies found in `Set-Cookie` header values received from `url`.
    ///
    /// Records with the same name, domain and path are replaced; an already
    /// expired record deletes its counterpart.
    fn store_response_cookies(&mut self, url: &Url, headers: &mut dyn Iterator<Item = &HeaderValue>);

    /// Returns the `Cookie` request header value to send for `url`, if any.
    fn get_request_cookies(&self, url: &Url) -> Option<String>;

    /// Returns the live records that match `url`, longest path first.
    fn cookies_for(&self, url: &Url) -> Vec<Cookie>;

    /// Merges `cookies` into the jar. Missing domain/path are taken from `url`.
    fn set_cookies(&mut self, url: &Url, cookies: Vec<Cookie>);

    /// Removes a single cookie named `cookie_name` that matches `url`.
    fn remove_cookie(&mut self, url: &Url, cookie_name: &str);

    /// Removes all cookies from the jar.
    fn clear(&mut self);

    /// All live records in insertion order.
    fn all_cookies(&self) -> Vec<Cookie>;
}

/// Default cookie jar: an ordered, in-memory list of cookie records.
#[derive(Debug, Clone, Default)]
pub struct DefaultCookieJar {
    pub entries: Vec<Cookie>,
}

impl DefaultCookieJar {
    /// Creates an empty in-memory cookie jar.
    pub fn new() -> Self {
        DefaultCookieJar { entries: Vec::new() }
    }

    /// Builds a jar from previously persisted records, dropping the ones that expired meanwhile.
    pub fn from_cookies(cookies: Vec<Cookie>, now: OffsetDateTime) -> Self {
        let mut jar = DefaultCookieJar { entries: cookies };
        let dropped = jar.purge_expired(now);
        if dropped > 0 {
            log::debug!("Dropped {dropped} expired cookie(s) while loading");
        }
        jar
    }

    /// Inserts or replaces `cookie`. An expired cookie only removes its counterpart.
    pub fn insert(&mut self, cookie: Cookie, now: OffsetDateTime) {
        let existing = self.entries.iter().position(|c| c.same_identity(&cookie));

        if cookie.is_expired_at(now) {
            if let Some(idx) = existing {
                log::debug!("Cookie {} deleted by server", cookie.name);
                self.entries.remove(idx);
            }
            return;
        }

        match existing {
            Some(idx) => self.entries[idx] = cookie,
            None => self.entries.push(cookie),
        }
    }

    pub fn cookies_for_at(&self, url: &Url, now: OffsetDateTime) -> Vec<Cookie> {
        let mut matching: Vec<Cookie> = self
            .entries
            .iter()
            .filter(|c| !c.is_expired_at(now) && c.matches_url(url))
            .cloned()
            .collect();

        // Stable sort keeps insertion order among equal path lengths
        matching.sort_by_key(|c| std::cmp::Reverse(c.path.as_deref().map_or(0, str::len)));
        matching
    }

    /// Removes expired records and returns how many were dropped.
    pub fn purge_expired(&mut self, now: OffsetDateTime) -> usize {
        let before = self.entries.len();
        self.entries.retain(|c| !c.is_expired_at(now));
        before - self.entries.len()
    }

    /// Gives every session-only cookie called `name` an expiry of `now + lifetime`
    /// and forces its secure flag. Returns the number of records touched.
    pub fn patch_session_cookie(&mut self, name: &str, lifetime: std::time::Duration, now: OffsetDateTime) -> usize {
        let expires = time::Duration::try_from(lifetime)
            .ok()
            .and_then(|lifetime| now.checked_add(lifetime))
            .unwrap_or(now + time::Duration::days(365));

        let mut patched = 0;
        for cookie in self.entries.iter_mut().filter(|c| c.name == name) {
            if cookie.expires.is_none() {
                cookie.expires = Some(expires);
            }
            cookie.secure = true;
            patched += 1;
        }
        patched
    }
}

impl CookieJar for DefaultCookieJar {
    fn store_response_cookies(&mut self, url: &Url, headers: &mut dyn Iterator<Item = &HeaderValue>) {
        let now = OffsetDateTime::now_utc();
        for header in headers {
            let Ok(header_str) = header.to_str() else {
                log::warn!("Skipping non-ASCII Set-Cookie header from {url}");
                continue;
            };
            if let Some(cookie) = Cookie::parse(header_str, url, now) {
                log::debug!("Received cookie {} for {:?}", cookie.name, cookie.domain);
                self.insert(cookie, now);
            }
        }
        self.purge_expired(now);
    }

    fn get_request_cookies(&self, url: &Url) -> Option<String> {
        let header = self
            .cookies_for(url)
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            None
        } else {
            Some(header)
        }
    }

    fn cookies_for(&self, url: &Url) -> Vec<Cookie> {
        self.cookies_for_at(url, OffsetDateTime::now_utc())
    }

    fn set_cookies(&mut self, url: &Url, cookies: Vec<Cookie>) {
        let now = OffsetDateTime::now_utc();
        for mut cookie in cookies {
            cookie.scope_to(url);
            self.insert(cookie, now);
        }
    }

    fn remove_cookie(&mut self, url: &Url, cookie_name: &str) {
        self.entries.retain(|c| !(c.name == cookie_name && c.matches_url(url)));
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn all_cookies(&self) -> Vec<Cookie> {
        let now = OffsetDateTime::now_utc();
        self.entries.iter().filter(|c| !c.is_expired_at(now)).cloned().collect()
    }
}
