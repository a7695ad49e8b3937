//! Session cookie persistence in the OS keychain, one entry per profile.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use quill_core::auth::SessionPersistence;
use quill_core::{ApiClient, AuthSession, ClientConfig, Error, NotesApi, Result};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "quill-cli";

#[derive(Clone)]
pub struct KeychainSessionStore {
    username: String,
}

impl KeychainSessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("session_cookies:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| Error::SessionStorage(error.to_string()))
    }
}

impl SessionPersistence for KeychainSessionStore {
    #[cfg(not(test))]
    fn load_cookies(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SessionStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_cookies(&self) -> Result<Option<String>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        Ok(guard.get(&self.username).cloned())
    }

    #[cfg(not(test))]
    fn save_cookies(&self, cookie_header: &str) -> Result<()> {
        self.entry()?
            .set_password(cookie_header)
            .map_err(|error| Error::SessionStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save_cookies(&self, cookie_header: &str) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        guard.insert(self.username.clone(), cookie_header.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_cookies(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SessionStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_cookies(&self) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

/// Backend session for `profile_name`, with cookies restored from the
/// keychain.
pub fn open_session(
    profile_name: &str,
    config: &ClientConfig,
) -> Result<AuthSession<KeychainSessionStore>> {
    let api = NotesApi::new(ApiClient::new(config)?);
    AuthSession::new(api, KeychainSessionStore::new(profile_name))
}
