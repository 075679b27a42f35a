use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// The companion servers refuse connections from anything that does not look like the iOS app.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 7_1_2 like Mac OS X) AppleWebKit/537.51.2 (KHTML, like Gecko) Mobile/11D257";
pub const DEFAULT_BASE_URL: &str = "https://companion.orerve.net";
pub const DEFAULT_COOKIE_FILE: &str = ".sedr-cookies";
pub const DEFAULT_SESSION_COOKIE: &str = "CompanionApp";

/// Environment variable that overrides the base URL (useful to point at a debugging proxy).
pub const BASE_URL_ENV: &str = "SEDR_BASEURL";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_SESSION_COOKIE_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);
const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host all endpoint paths are joined onto
    pub base_url: Url,
    /// Device identity sent as the user agent on every request
    pub user_agent: String,
    /// Deadline for every single request
    pub timeout: Duration,
    /// Where the cookie store lives on disk
    pub cookie_file: PathBuf,
    /// Name of the cookie carrying the session credential
    pub session_cookie_name: String,
    /// Lifetime given to the session cookie when the server sends it without expiry
    pub session_cookie_lifetime: Duration,
    /// Maximum number of redirects followed before giving up
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cookie_file: PathBuf::from(DEFAULT_COOKIE_FILE),
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            session_cookie_lifetime: DEFAULT_SESSION_COOKIE_LIFETIME,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl ClientConfig {
    /// Default configuration with the base URL taken from `SEDR_BASEURL` when set.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let mut config = Self::default();
        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            log::info!("Using base URL override {base}");
            config.base_url = Url::parse(&base)?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = path.into();
        self
    }
}
