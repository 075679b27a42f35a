use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, Method};
use url::Url;

/// One request/response pair as seen by the session client.
#[derive(Debug)]
pub struct HttpExchange<'a> {
    /// Label for the operation that issued the request (`"Login"`, `"GET /profile"`).
    pub what: &'a str,
    pub method: &'a Method,
    pub url: &'a Url,
    pub status: u16,
    /// Reason phrase for `status`
    pub status_text: &'a str,
    pub request_headers: &'a HeaderMap,
    pub response_headers: &'a HeaderMap,
}

/// Observer that receives every exchange. It has no say over the outcome.
pub type HttpDebugger = Arc<dyn Fn(&HttpExchange<'_>) + Send + Sync>;

/// Dumps an exchange through `log::debug!`.
pub fn log_exchange(exchange: &HttpExchange<'_>) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("{exchange}");
}

impl fmt::Display for HttpExchange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HTTP {} {} {}", self.status, self.what, self.url)?;
        writeln!(f, "Request {} {}:", self.method, self.url)?;
        for (name, value) in self.request_headers {
            writeln!(f, "    {}: {}", name, value.to_str().unwrap_or("<binary>"))?;
        }
        writeln!(f, "Response {} {}:", self.status, self.status_text)?;
        for (name, value) in self.response_headers {
            writeln!(f, "    {}: {}", name, value.to_str().unwrap_or("<binary>"))?;
        }
        write!(f, "****")
    }
}
