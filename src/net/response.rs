//! Minimal HTTP response model.
//!
//! This struct represents a **fully buffered** HTTP response returned by the
//! session client. It contains the URL that produced it, status code +
//! reason, response headers, and the raw body bytes.
//!
//! ## Notes
//! - When the redirect policy stops at a signal hop, the response is the 3xx
//!   itself: `url` is the endpoint that redirected and
//!   [`redirect_target`](Response::redirect_target) is where it pointed.
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names.
//!
use http::header::{CONTENT_TYPE, LOCATION};
use http::HeaderMap;
use url::Url;

/// Simple structure for HTTP responses.
#[derive(Debug)]
pub struct Response {
    /// URL of the response (after any redirects that were followed).
    pub url: Url,

    /// Numeric HTTP status code (e.g., `200`, `302`).
    pub status: u16,

    /// Human-readable reason phrase. May be `"Unknown"` for non-standard codes.
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// The `Location` header resolved against [`url`](Self::url), for 3xx responses.
    pub fn redirect_target(&self) -> Option<Url> {
        if !self.is_redirect() {
            return None;
        }
        let location = self.headers.get(LOCATION)?.to_str().ok()?;
        self.url.join(location).ok()
    }

    /// Media type of the body without parameters, lowercased (`application/json`).
    pub fn media_type(&self) -> Option<String> {
        let value = self.headers.get(CONTENT_TYPE)?.to_str().ok()?;
        let media = value.split(';').next()?.trim();
        Some(media.to_ascii_lowercase())
    }
}
