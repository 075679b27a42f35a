//! Session client: the one HTTP transport of the process.
//!
//! [`SessionClient`] owns a `reqwest` client configured with
//! - the fixed per-request timeout,
//! - a redirect policy that follows ordinary redirects but **stops** on the
//!   hops the companion service uses as signals (see
//!   [`RedirectSignal`](crate::auth::RedirectSignal)), handing the 3xx back to
//!   the caller,
//! - the session's [`PersistentCookieJar`] as cookie provider, so cookies are
//!   captured and sent on every hop.
//!
//! Every request carries the device-identity user agent. Every exchange is
//! offered to the optional [`HttpDebugger`].
use std::sync::Arc;

use http::header::USER_AGENT;
use http::HeaderValue;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::RedirectSignal;
use crate::config::ClientConfig;
use crate::cookies::PersistentCookieJar;
use crate::errors::ClientError;
use crate::net::{HttpDebugger, HttpExchange, Response};
use crate::scalar::MALFORMED_SCALAR_PREFIX;

const JSON_MEDIA_TYPE: &str = "application/json";

pub struct SessionClient {
    /// Scheme, host and optional path prefix every request path is appended to
    base_url: Url,
    /// Underlying transport
    http: reqwest::Client,
    /// Device identity sent on every request
    user_agent: HeaderValue,
    /// Cookies for this session (shared with the transport)
    cookie_jar: Arc<PersistentCookieJar>,
    /// Receives every request/response pair when set
    debugger: Option<HttpDebugger>,
}

impl SessionClient {
    pub fn new(config: &ClientConfig, cookie_jar: Arc<PersistentCookieJar>) -> Result<Self, ClientError> {
        let user_agent = HeaderValue::from_str(&config.user_agent)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(signal_aware_policy(config.base_url.clone(), config.max_redirects))
            .cookie_provider(cookie_jar.clone())
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http,
            user_agent,
            cookie_jar,
            debugger: None,
        })
    }

    pub fn with_debugger(mut self, debugger: HttpDebugger) -> Self {
        self.debugger = Some(debugger);
        self
    }

    pub fn set_debugger(&mut self, debugger: Option<HttpDebugger>) {
        self.debugger = debugger;
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn cookie_jar(&self) -> &Arc<PersistentCookieJar> {
        &self.cookie_jar
    }

    /// `base + path`, concatenated so a base with a path prefix keeps it.
    pub fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// GET `base + path`.
    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        let url = self.url_for(path)?;
        self.execute(&format!("GET {path}"), self.http.get(url)).await
    }

    /// POST `values` as `application/x-www-form-urlencoded` to `base + path`.
    ///
    /// `what` labels the exchange for the debug observer and the logs.
    pub async fn post_form<T>(&self, what: &str, path: &str, values: &T) -> Result<Response, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.url_for(path)?;
        self.execute(what, self.http.post(url).form(values)).await
    }

    /// GET `base + path` and decode the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let res = self.get(path).await?;

        let media_type = res.media_type();
        if media_type.as_deref() != Some(JSON_MEDIA_TYPE) {
            log::warn!("{} answered with {:?} instead of JSON", res.url, media_type);
            return Err(ClientError::UnexpectedContentType { found: media_type });
        }

        decode_json(&res.body)
    }

    async fn execute(&self, what: &str, builder: reqwest::RequestBuilder) -> Result<Response, ClientError> {
        let request = builder.header(USER_AGENT, self.user_agent.clone()).build()?;
        let method = request.method().clone();
        let request_headers = request.headers().clone();
        log::debug!("{what}: {method} {}", request.url());

        let res = self.http.execute(request).await.map_err(|e| {
            log::warn!("{what} failed: {e}");
            ClientError::Transport(e)
        })?;

        // Fetch results
        let url = res.url().clone();
        let status = res.status();
        let status_text = status.canonical_reason().unwrap_or("Unknown").to_string();
        let headers = res.headers().clone();

        // Fetch body. We don't do streaming
        let body = res.bytes().await?.to_vec();

        if let Some(debugger) = &self.debugger {
            debugger(&HttpExchange {
                what,
                method: &method,
                url: &url,
                status: status.as_u16(),
                status_text: &status_text,
                request_headers: &request_headers,
                response_headers: &headers,
            });
        }

        if !(status.is_success() || status.is_redirection()) {
            log::warn!("{what}: HTTP {status} from {url}");
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(Response {
            url,
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}

/// Follows redirects up to `max_redirects`, except that a redirect-signal hop
/// is not followed: the 3xx is returned so the caller sees which stage was reached.
fn signal_aware_policy(base_url: Url, max_redirects: usize) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error(format!("too many redirects (more than {max_redirects})"));
        }

        let signal = attempt
            .previous()
            .last()
            .and_then(|from| RedirectSignal::classify(&base_url, from, attempt.url()));

        match signal {
            Some(signal) => {
                log::debug!("Stopping at redirect signal {signal:?} -> {}", attempt.url());
                attempt.stop()
            }
            None => attempt.follow(),
        }
    })
}

/// Decodes a JSON document.
///
/// A string-or-number field that held neither surfaces as
/// [`ClientError::MalformedScalar`]; any other failure as [`ClientError::Decode`].
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| {
        let message = e.to_string();
        if e.is_data() && message.starts_with(MALFORMED_SCALAR_PREFIX) {
            ClientError::MalformedScalar(message)
        } else {
            ClientError::Decode(e)
        }
    })
}
