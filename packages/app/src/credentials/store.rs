//! Secret stores that sit in front of the encrypted file

use super::errors::{CredentialsError, CredentialsResult};

const PROBE_USER: &str = "__conjugar_probe__";
const PROBE_VALUE: &str = "probe";

/// A backend keyed by `(service, user)` that stores plaintext secrets itself
pub trait SecretStore: Send + Sync {
    fn backend_name(&self) -> String;

    fn get(&self, service: &str, user: &str) -> CredentialsResult<Option<String>>;

    fn set(&self, service: &str, user: &str, secret: &str) -> CredentialsResult<()>;

    /// Returns whether an entry was removed
    fn delete(&self, service: &str, user: &str) -> CredentialsResult<bool>;
}

/// The operating system keyring
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringStore;

impl KeyringStore {
    /// The keyring when a write/read/delete round trip works, `None` otherwise
    pub fn probe(service: &str) -> Option<Self> {
        let store = Self;
        let ok = store
            .set(service, PROBE_USER, PROBE_VALUE)
            .and_then(|()| store.get(service, PROBE_USER))
            .map(|value| value.as_deref() == Some(PROBE_VALUE));
        let _ = store.delete(service, PROBE_USER);

        match ok {
            Ok(true) => Some(store),
            Ok(false) => {
                tracing::debug!("keyring round trip returned a different value");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "keyring unavailable");
                None
            }
        }
    }

    fn entry(service: &str, user: &str) -> CredentialsResult<keyring::Entry> {
        keyring::Entry::new(service, user).map_err(|e| CredentialsError::Keyring(e.to_string()))
    }
}

impl SecretStore for KeyringStore {
    fn backend_name(&self) -> String {
        if cfg!(target_os = "macos") {
            "macOS Keychain".to_string()
        } else if cfg!(target_os = "windows") {
            "Windows Credential Manager".to_string()
        } else {
            "Linux kernel keyutils".to_string()
        }
    }

    fn get(&self, service: &str, user: &str) -> CredentialsResult<Option<String>> {
        match Self::entry(service, user)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialsError::Keyring(e.to_string())),
        }
    }

    fn set(&self, service: &str, user: &str, secret: &str) -> CredentialsResult<()> {
        Self::entry(service, user)?
            .set_password(secret)
            .map_err(|e| CredentialsError::Keyring(e.to_string()))
    }

    fn delete(&self, service: &str, user: &str) -> CredentialsResult<bool> {
        match Self::entry(service, user)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(CredentialsError::Keyring(e.to_string())),
        }
    }
}
