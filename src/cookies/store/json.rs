//! JSON-backed cookie store.
//!
//! `JsonCookieStore` persists the cookie set in a single JSON file on disk.
//!
//! ### Design
//! - One file, `{ "version": 1, "cookies": [...] }`, pretty-printed.
//! - A missing file is an empty store; nothing is created until the first save.
//! - Saves write a temporary sibling file and rename it over the target, so a
//!   crash mid-save leaves the previous file untouched.
//! - Unreadable or unparsable files surface as [`ClientError::StoreIo`]; a
//!   corrupt file is never silently replaced by an empty store.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::cookies::store::CookieStore;
use crate::cookies::Cookie;
use crate::errors::ClientError;

const FILE_VERSION: u32 = 1;

/// On-disk representation of the cookie set.
#[derive(Debug, Serialize, Deserialize)]
struct CookieStoreFile {
    version: u32,
    cookies: Vec<Cookie>,
}

/// A JSON-based cookie store that persists cookies across process runs.
#[derive(Debug, Clone)]
pub struct JsonCookieStore {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,
}

impl JsonCookieStore {
    /// Creates a store for `path`. The file is not touched until [`load`](CookieStore::load)
    /// or [`save`](CookieStore::save).
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(&self, contents: &[u8]) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl CookieStore for JsonCookieStore {
    fn load(&self) -> Result<Vec<Cookie>, ClientError> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No cookie file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(ClientError::StoreIo(e)),
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let file: CookieStoreFile = serde_json::from_slice(&contents)
            .map_err(|e| ClientError::StoreIo(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        if file.version != FILE_VERSION {
            return Err(ClientError::StoreIo(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported cookie file version {}", file.version),
            )));
        }

        log::debug!("Loaded {} cookie(s) from {}", file.cookies.len(), self.path.display());
        Ok(file.cookies)
    }

    fn save(&self, cookies: &[Cookie]) -> Result<(), ClientError> {
        let file = CookieStoreFile {
            version: FILE_VERSION,
            cookies: cookies.to_vec(),
        };
        let contents = serde_json::to_vec_pretty(&file)
            .map_err(|e| ClientError::StoreIo(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        self.write_atomically(&contents).map_err(ClientError::StoreIo)?;
        log::debug!("Saved {} cookie(s) to {}", cookies.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::OffsetDateTime;

    fn cookie(name: &str) -> Cookie {
        let mut c = Cookie::new(name, "v");
        c.domain = Some("example.com".into());
        c.path = Some("/".into());
        c.expires = Some(OffsetDateTime::now_utc() + time::Duration::days(2));
        c
    }

    #[test]
    fn missing_file_is_empty_and_not_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let store = JsonCookieStore::new(path.clone());

        assert!(store.load().unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = JsonCookieStore::new(dir.path().join("cookies.json"));
        let cookies = vec![cookie("a"), cookie("b")];

        store.save(&cookies).unwrap();
        let loaded = JsonCookieStore::new(dir.path().join("cookies.json")).load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "a");
        assert_eq!(loaded[1].name, "b");
        assert_eq!(loaded[0].domain, cookies[0].domain);
        assert!(loaded[0].expires.unwrap() > OffsetDateTime::now_utc());
    }

    #[test]
    fn save_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let store = JsonCookieStore::new(dir.path().join("cookies.json"));

        store.save(&[cookie("a"), cookie("b")]).unwrap();
        store.save(&[cookie("c")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "c");

        // Only the target file remains; the temporary file was renamed over it
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, b"{ not json").unwrap();

        let err = JsonCookieStore::new(path).load().unwrap_err();
        match err {
            ClientError::StoreIo(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = JsonCookieStore::new(dir.path().join("nope").join("cookies.json"));
        assert!(matches!(store.save(&[cookie("a")]), Err(ClientError::StoreIo(_))));
    }
}
