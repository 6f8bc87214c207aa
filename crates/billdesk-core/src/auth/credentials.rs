//! Durable storage for the credential hint.
//!
//! Exactly one opaque token lives under one well-known slot. Its presence at
//! boot only means a verification is worth making; it is never proof of a
//! session.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};

/// Keychain service name.
const SERVICE_NAME: &str = "billdesk";

/// The single named slot holding the token.
pub const CREDENTIAL_SLOT: &str = "session-token";

/// File name of the file-backed slot in the cache directory.
const CREDENTIAL_FILE: &str = "credential.json";

pub trait CredentialCache: Send {
    fn put(&mut self, token: &str) -> Result<()>;

    fn get(&self) -> Result<Option<String>>;

    fn clear(&mut self) -> Result<()>;
}

/// Token kept in memory only; gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCredentialCache {
    token: Option<String>,
}

impl MemoryCredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
        }
    }
}

impl CredentialCache for MemoryCredentialCache {
    fn put(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn get(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.token = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    stored_at: DateTime<Utc>,
}

/// Token stored as JSON in the cache directory.
pub struct FileCredentialCache {
    cache_dir: PathBuf,
}

impl FileCredentialCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn credential_path(&self) -> PathBuf {
        self.cache_dir.join(CREDENTIAL_FILE)
    }
}

impl CredentialCache for FileCredentialCache {
    fn put(&mut self, token: &str) -> Result<()> {
        let path = self.credential_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredCredential {
            token: token.to_string(),
            stored_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(path, contents).context("Failed to write credential file")?;
        Ok(())
    }

    fn get(&self) -> Result<Option<String>> {
        let path = self.credential_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read credential file")?;
        let stored: StoredCredential =
            serde_json::from_str(&contents).context("Failed to parse credential file")?;
        Ok(Some(stored.token).filter(|t| !t.is_empty()))
    }

    fn clear(&mut self) -> Result<()> {
        let path = self.credential_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove credential file")?;
        }
        Ok(())
    }
}

/// Token stored in the OS keychain.
pub struct KeyringCredentialCache {
    slot: String,
}

impl KeyringCredentialCache {
    pub fn new() -> Self {
        Self {
            slot: CREDENTIAL_SLOT.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.slot).context("Failed to create keyring entry")
    }
}

impl Default for KeyringCredentialCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialCache for KeyringCredentialCache {
    fn put(&mut self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn get(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn clear(&mut self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_put_get_clear() {
        let mut cache = MemoryCredentialCache::new();
        assert_eq!(cache.get().unwrap(), None);
        cache.put("tok").unwrap();
        assert_eq!(cache.get().unwrap().as_deref(), Some("tok"));
        cache.clear().unwrap();
        assert_eq!(cache.get().unwrap(), None);
    }

    #[test]
    fn test_file_cache_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCredentialCache::new(dir.path().to_path_buf());
        cache.put("tok-1").unwrap();
        cache.put("tok-2").unwrap();

        let reopened = FileCredentialCache::new(dir.path().to_path_buf());
        assert_eq!(reopened.get().unwrap().as_deref(), Some("tok-2"));
    }

    #[test]
    fn test_file_cache_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCredentialCache::new(dir.path().join("nested"));
        cache.clear().unwrap();
        cache.put("tok").unwrap();
        cache.clear().unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.get().unwrap(), None);
    }

    #[test]
    fn test_file_cache_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CREDENTIAL_FILE), "not json").unwrap();
        let cache = FileCredentialCache::new(dir.path().to_path_buf());
        assert!(cache.get().is_err());
    }
}
