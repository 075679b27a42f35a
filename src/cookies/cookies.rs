//! Cookie record and `Set-Cookie` parsing.
//!
//! The [`Cookie`] struct is used both for matching requests and for
//! persistence, and is (de)serialized via `serde`. Expiry is kept as an
//! absolute UTC time; `None` marks a session-only cookie.
//!
//! ```rust
//! use sedr::cookies::Cookie;
//! use time::OffsetDateTime;
//! use url::Url;
//!
//! let url = Url::parse("https://companion.orerve.net/user/login").unwrap();
//! let now = OffsetDateTime::now_utc();
//! let c = Cookie::parse("mid=abc123; Path=/; Secure; HttpOnly", &url, now).unwrap();
//!
//! assert_eq!(c.name, "mid");
//! assert_eq!(c.domain.as_deref(), Some("companion.orerve.net"));
//! assert!(c.host_only);
//! assert!(c.secure);
//! assert!(c.expires.is_none());
//! ```

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use url::Url;

/// A cookie as stored/serialized by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping (e.g., `"/"`). If `None` when handed to a jar, the default
    /// path of the request URL is filled in.
    pub path: Option<String>,

    /// Domain scoping, lowercase and without a leading dot. If `None` when
    /// handed to a jar, the request host is filled in and the cookie becomes
    /// host-only.
    pub domain: Option<String>,

    /// Only the exact host in `domain` matches; no subdomains.
    #[serde(default)]
    pub host_only: bool,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// If `true`, cookie is hidden from client-side scripts. Kept for fidelity only.
    #[serde(default)]
    pub http_only: bool,

    /// Absolute expiry. Session cookies have `None`.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,

    /// SameSite policy (`"Strict"`, `"Lax"`, or `"None"`).
    #[serde(default)]
    pub same_site: Option<String>,
}

impl Cookie {
    /// Creates a session cookie with no scoping; a jar fills in domain and path from the URL.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            host_only: false,
            secure: false,
            http_only: false,
            expires: None,
            same_site: None,
        }
    }

    /// Parses a single `Set-Cookie` header value received from `url`.
    ///
    /// Handles `Path`, `Domain` (leading dot stripped), `Expires`, `Max-Age`
    /// (wins over `Expires`), `SameSite`, `Secure` and `HttpOnly`. The result
    /// may already be expired, which callers treat as a deletion.
    ///
    /// Returns `None` for headers without a `name=value` pair and for cookies
    /// whose `Domain` does not cover the request host.
    pub fn parse(header: &str, url: &Url, now: OffsetDateTime) -> Option<Cookie> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));
        let mut max_age = None;

        for part in parts {
            let part = part.trim();
            match part.split_once('=') {
                Some((k, v)) => {
                    let v = v.trim();
                    match k.trim().to_ascii_lowercase().as_str() {
                        "path" if v.starts_with('/') => cookie.path = Some(v.to_string()),
                        "domain" if !v.is_empty() => {
                            cookie.domain = Some(v.trim_start_matches('.').to_ascii_lowercase())
                        }
                        "expires" => match parse_http_date(v) {
                            Some(at) => cookie.expires = Some(at),
                            None => log::warn!("Ignoring unparsable expiry {v:?} on cookie {}", cookie.name),
                        },
                        "max-age" => max_age = v.parse::<i64>().ok(),
                        "samesite" => {
                            // normalize to "Lax" | "Strict" | "None"
                            cookie.same_site = Some(if v.eq_ignore_ascii_case("lax") {
                                "Lax".to_string()
                            } else if v.eq_ignore_ascii_case("strict") {
                                "Strict".to_string()
                            } else if v.eq_ignore_ascii_case("none") {
                                "None".to_string()
                            } else {
                                v.to_string()
                            });
                        }
                        _ => {}
                    }
                }
                None => {
                    if part.eq_ignore_ascii_case("secure") {
                        cookie.secure = true;
                    } else if part.eq_ignore_ascii_case("httponly") {
                        cookie.http_only = true;
                    }
                }
            }
        }

        if let Some(seconds) = max_age {
            cookie.expires = Some(if seconds <= 0 {
                OffsetDateTime::UNIX_EPOCH
            } else {
                now.checked_add(Duration::seconds(seconds)).unwrap_or(now)
            });
        }

        let host = url.host_str()?.to_ascii_lowercase();
        match &cookie.domain {
            Some(domain) if !domain_matches(&host, domain) => {
                log::debug!("Rejecting cookie {} for domain {domain} set by {host}", cookie.name);
                return None;
            }
            Some(_) => {}
            None => {
                cookie.domain = Some(host);
                cookie.host_only = true;
            }
        }

        if cookie.path.is_none() {
            cookie.path = Some(default_path(url));
        }

        Some(cookie)
    }

    /// True when the cookie has an expiry at or before `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }

    /// True for cookies without an explicit expiry.
    pub fn is_session(&self) -> bool {
        self.expires.is_none()
    }

    /// Two records are the same cookie when name, domain and path agree.
    pub fn same_identity(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    /// Checks domain, path and the secure flag against `url`. Expiry is not considered.
    pub fn matches_url(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        let domain_ok = match &self.domain {
            Some(domain) if self.host_only => host == *domain,
            Some(domain) => domain_matches(&host, domain),
            None => true,
        };

        let path_ok = match &self.path {
            Some(cookie_path) => path_matches(url.path(), cookie_path),
            None => true,
        };

        domain_ok && path_ok && (!self.secure || url.scheme() == "https")
    }

    /// Fills in domain and path from `url` for records built without them.
    pub(crate) fn scope_to(&mut self, url: &Url) {
        if self.domain.is_none() {
            self.domain = url.host_str().map(str::to_ascii_lowercase);
            self.host_only = true;
        } else if let Some(domain) = &mut self.domain {
            *domain = domain.trim_start_matches('.').to_ascii_lowercase();
        }
        if self.path.is_none() {
            self.path = Some(default_path(url));
        }
    }
}

/// RFC 6265 §5.1.3 domain-match (`host` and `domain` already lowercase).
fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain || (host.ends_with(domain) && host[..host.len() - domain.len()].ends_with('.'))
}

/// RFC 6265 §5.1.4 path-match.
fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

/// RFC 6265 §5.1.4 default-path: the request path up to, not including, its last `/`.
fn default_path(url: &Url) -> String {
    url.path()
        .rsplit_once('/')
        .map_or("/", |(a, _)| if a.is_empty() { "/" } else { a })
        .to_string()
}

/// Parses `Wed, 21 Oct 2015 07:28:00 GMT` and the dashed `21-Oct-2015` variant.
fn parse_http_date(value: &str) -> Option<OffsetDateTime> {
    let spaced = format_description!("[day] [month repr:short] [year] [hour]:[minute]:[second] GMT");
    let dashed = format_description!("[day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT");

    // The weekday is redundant and sometimes wrong, so it is dropped before parsing
    let date = value.split_once(',').map_or(value, |(_, rest)| rest).trim();

    PrimitiveDateTime::parse(date, &spaced)
        .or_else(|_| PrimitiveDateTime::parse(date, &dashed))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
