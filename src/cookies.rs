// src/cookies.rs
//! Cookies: [`Cookie`], [`CookieJar`], [`PersistentCookieJar`] and storage backends.

mod cookies;
mod cookie_jar;
mod store;
mod persistent_cookie_jar;

pub use cookies::Cookie;

pub use cookie_jar::CookieJar;
pub use cookie_jar::DefaultCookieJar;
pub use persistent_cookie_jar::PersistentCookieJar;

pub use store::CookieStore;
pub use store::CookieStoreHandle;
pub use store::InMemoryCookieStore;
pub use store::JsonCookieStore;
