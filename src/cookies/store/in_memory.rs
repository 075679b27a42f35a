use std::sync::{PoisonError, RwLock};

use crate::cookies::store::CookieStore;
use crate::cookies::Cookie;
use crate::errors::ClientError;

/// Keeps the last saved snapshot in memory only.
#[derive(Debug, Default)]
pub struct InMemoryCookieStore {
    cookies: RwLock<Vec<Cookie>>,
}

impl InMemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `cookies`, as if they had been saved earlier.
    pub fn with_cookies(cookies: Vec<Cookie>) -> Self {
        Self {
            cookies: RwLock::new(cookies),
        }
    }

    /// The most recently saved snapshot.
    pub fn snapshot(&self) -> Vec<Cookie> {
        self.cookies.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CookieStore for InMemoryCookieStore {
    fn load(&self) -> Result<Vec<Cookie>, ClientError> {
        Ok(self.snapshot())
    }

    fn save(&self, cookies: &[Cookie]) -> Result<(), ClientError> {
        *self.cookies.write().unwrap_or_else(PoisonError::into_inner) = cookies.to_vec();
        Ok(())
    }
}
