//! Credential storage across the keyring, the encrypted file and the environment

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use zeroize::Zeroizing;

use super::crypto::{
    decrypt_json, encrypt_json, fingerprint, generate_master_key, open_master_key, seal_master_key,
};
use super::errors::{CredentialsError, CredentialsResult};
use super::models::{
    Argon2Params, BackupManifest, CredentialVault, CredentialsConfig, EncryptedContainer, MasterKey,
    MasterKeyFile, StorageBackend, StorageInfo, StoragePreference, StoredCredential,
};
use super::store::{KeyringStore, SecretStore};
use super::validator::{self, Provider, ValidationLevel, ValidationResult};

/// Keyring service prefix; entries are named `conjugar.<key>`
pub const SERVICE_NAME: &str = "conjugar";

pub const DEFAULT_USERNAME: &str = "default";

const CONFIG_FILE: &str = "credentials_config.json";
const ENCRYPTED_FILE: &str = "credentials.enc";
const KEY_FILE: &str = "master.key";
const BACKUP_DIR: &str = "backups";
const BACKUP_PREFIX: &str = "credentials_backup_";

/// Environment variables listed even when nothing is stored locally
const ENV_PATTERNS: [&str; 2] = ["OPENAI_API_KEY", "CONJUGAR_API_KEY"];

pub struct CredentialsManager {
    config_dir: PathBuf,
    config: CredentialsConfig,
    store: Option<Box<dyn SecretStore>>,
    password: Option<Zeroizing<String>>,
    argon2: Argon2Params,
}

impl CredentialsManager {
    /// Open the store in `config_dir`, probing the OS keyring
    pub fn open(config_dir: impl Into<PathBuf>) -> CredentialsResult<Self> {
        let store = KeyringStore::probe(SERVICE_NAME).map(|s| Box::new(s) as Box<dyn SecretStore>);
        Self::with_store(config_dir, store)
    }

    /// Open the store with an explicit secret backend (or none)
    pub fn with_store(
        config_dir: impl Into<PathBuf>,
        store: Option<Box<dyn SecretStore>>,
    ) -> CredentialsResult<Self> {
        let config_dir = config_dir.into();
        fs::create_dir_all(&config_dir)?;

        let mut manager = Self {
            config: CredentialsConfig::default(),
            config_dir,
            store,
            password: None,
            argon2: Argon2Params::default(),
        };
        manager.config = manager.load_config()?;

        tracing::debug!(
            dir = %manager.config_dir.display(),
            keyring = manager.store.is_some(),
            "credentials manager ready"
        );
        Ok(manager)
    }

    /// Password that protects (or will protect) `master.key`
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.map(Zeroizing::new);
        self
    }

    pub fn with_argon2_params(mut self, params: Argon2Params) -> Self {
        self.argon2 = params;
        self
    }

    pub fn config(&self) -> &CredentialsConfig {
        &self.config
    }

    pub fn set_storage_preference(&mut self, preference: StoragePreference) -> CredentialsResult<()> {
        self.config.storage_preference = preference;
        self.touch_config()
    }

    // ========================
    // Operations
    // ========================

    /// Store a secret, returning the backend that accepted it
    pub fn store_credential(
        &mut self,
        key: &str,
        value: &str,
        username: Option<&str>,
        preference: Option<StoragePreference>,
    ) -> CredentialsResult<StorageBackend> {
        let username = username.unwrap_or(DEFAULT_USERNAME);
        let preference = preference.unwrap_or(self.config.storage_preference);

        let mut backend = None;
        if preference.allows_keyring() {
            if let Some(store) = &self.store {
                match store.set(&service_for(key), username, value) {
                    Ok(()) => backend = Some(StorageBackend::Keyring),
                    Err(e) => tracing::warn!(key, error = %e, "keyring write failed, falling back"),
                }
            }
        }

        if backend.is_none() && preference.allows_file() && self.config.encryption_enabled {
            let master = self.master_key()?;
            let mut vault = self.load_vault(&master)?;
            vault.credentials.insert(
                key.to_string(),
                StoredCredential {
                    value: value.to_string(),
                    username: username.to_string(),
                    stored_at: Utc::now(),
                    hash: fingerprint(value),
                },
            );
            self.save_vault(&mut vault, &master)?;
            backend = Some(StorageBackend::EncryptedFile);
        }

        let backend = backend.ok_or_else(|| CredentialsError::NoBackend(key.to_string()))?;
        self.touch_config()?;
        self.audit("stored", key, Some(backend));
        Ok(backend)
    }

    /// Look a secret up in the keyring, then the encrypted file, then the environment
    pub fn retrieve_credential(&self, key: &str, username: Option<&str>) -> CredentialsResult<Option<String>> {
        let username = username.unwrap_or(DEFAULT_USERNAME);
        let preference = self.config.storage_preference;

        if preference != StoragePreference::EnvOnly {
            if let Some(store) = &self.store {
                match store.get(&service_for(key), username) {
                    Ok(Some(value)) => {
                        self.audit("retrieved", key, Some(StorageBackend::Keyring));
                        return Ok(Some(value));
                    }
                    Ok(None) => {}
                    Err(e) => tracing::debug!(key, error = %e, "keyring read failed"),
                }
            }

            if self.encrypted_file().exists() {
                let master = self.master_key()?;
                let vault = self.load_vault(&master)?;
                if let Some(stored) = vault.credentials.get(key) {
                    self.audit("retrieved", key, Some(StorageBackend::EncryptedFile));
                    return Ok(Some(stored.value.clone()));
                }
            }
        }

        for name in env_candidates(key) {
            if let Ok(value) = std::env::var(&name) {
                if !value.is_empty() {
                    tracing::debug!(key, var = %name, "credential taken from environment");
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }

    /// Names in the encrypted file plus well-known environment variables
    ///
    /// Keyring entries cannot be enumerated and are not listed.
    pub fn list_credentials(&self) -> CredentialsResult<Vec<String>> {
        let mut names = Vec::new();
        if self.encrypted_file().exists() {
            let master = self.master_key()?;
            names.extend(self.load_vault(&master)?.credentials.keys().cloned());
        }
        for pattern in ENV_PATTERNS {
            if std::env::var(pattern).is_ok_and(|v| !v.is_empty()) {
                names.push(pattern.to_lowercase());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Remove a secret from every writable backend
    pub fn delete_credential(&mut self, key: &str, username: Option<&str>) -> CredentialsResult<bool> {
        let username = username.unwrap_or(DEFAULT_USERNAME);
        let mut deleted = false;

        if let Some(store) = &self.store {
            match store.delete(&service_for(key), username) {
                Ok(removed) => deleted |= removed,
                Err(e) => tracing::warn!(key, error = %e, "keyring delete failed"),
            }
        }

        if self.encrypted_file().exists() {
            let master = self.master_key()?;
            let mut vault = self.load_vault(&master)?;
            if vault.credentials.remove(key).is_some() {
                deleted = true;
                if vault.credentials.is_empty() {
                    fs::remove_file(self.encrypted_file())?;
                } else {
                    self.save_vault(&mut vault, &master)?;
                }
            }
        }

        if deleted {
            self.audit("deleted", key, None);
        }
        Ok(deleted)
    }

    /// Validate a value against the provider its name suggests
    pub fn validate_credential(&self, key: &str, value: &str) -> ValidationResult {
        let level = if self.config.validation_enabled {
            ValidationLevel::Standard
        } else {
            ValidationLevel::Basic
        };
        match Provider::from_credential_name(key) {
            Some(provider) => validator::validate_key(value, Some(provider), level),
            None => validator::validate_generic(value),
        }
    }

    pub fn storage_info(&self) -> StorageInfo {
        let mut supported_methods = vec!["environment".to_string()];
        if self.store.is_some() {
            supported_methods.push("keyring".to_string());
        }
        if self.config.encryption_enabled {
            supported_methods.push("encrypted_file".to_string());
        }

        StorageInfo {
            keyring_available: self.store.is_some(),
            keyring_backend: self.store.as_ref().map(|s| s.backend_name()),
            encryption_available: self.config.encryption_enabled,
            config_dir: self.config_dir.clone(),
            encrypted_file_exists: self.encrypted_file().exists(),
            master_key_password_protected: self
                .read_key_file()
                .ok()
                .flatten()
                .is_some_and(|file| file.is_password_protected()),
            config: self.config.clone(),
            supported_methods,
        }
    }

    /// Write a manifest of credential names and settings (no values)
    ///
    /// Older manifests beyond `backup_copies` are removed.
    pub fn backup_credentials(&self, backup_dir: Option<&Path>) -> CredentialsResult<PathBuf> {
        let backup_dir = backup_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config_dir.join(BACKUP_DIR));
        fs::create_dir_all(&backup_dir)?;

        let now = Utc::now();
        let manifest = BackupManifest {
            created_at: now,
            app_name: SERVICE_NAME.to_string(),
            config: self.config.clone(),
            credential_list: self.list_credentials()?,
            storage_info: self.storage_info(),
        };

        let path = backup_dir.join(format!("{}{}.json", BACKUP_PREFIX, now.format("%Y%m%d_%H%M%S")));
        write_private(&path, serde_json::to_string_pretty(&manifest)?.as_bytes())?;
        prune_backups(&backup_dir, self.config.backup_copies)?;

        tracing::info!(path = %path.display(), "credentials backup written");
        Ok(path)
    }

    /// Re-encrypt the vault under a fresh master key
    ///
    /// `old_password` opens the current `master.key`; `new_password`, when set,
    /// protects the new one.
    pub fn rotate_master_key(
        &mut self,
        old_password: Option<&str>,
        new_password: Option<&str>,
    ) -> CredentialsResult<()> {
        self.backup_credentials(None)?;

        let vault = match self.read_key_file()? {
            Some(file) => {
                let old_key = open_master_key(&file, old_password)?;
                if self.encrypted_file().exists() {
                    Some(self.load_vault(&old_key)?)
                } else {
                    None
                }
            }
            None => None,
        };

        let new_key = generate_master_key();
        let sealed = seal_master_key(&new_key, new_password, &self.argon2)?;

        // Stage the vault and the new key side by side, then swap the vault in before the key.
        let staged_vault = staged_path(&self.encrypted_file());
        let staged_key = staged_path(&self.key_file());
        let has_vault = vault.is_some();
        if let Some(mut vault) = vault {
            vault.encrypted_at = Utc::now();
            let container = encrypt_json(&vault, &new_key)?;
            write_private(&staged_vault, container.to_json()?.as_bytes())?;
        }
        write_private(&staged_key, serde_json::to_string_pretty(&sealed)?.as_bytes())?;

        if has_vault {
            fs::rename(&staged_vault, self.encrypted_file())?;
        }
        fs::rename(&staged_key, self.key_file())?;

        self.password = new_password.map(|p| Zeroizing::new(p.to_string()));
        self.config.last_key_rotation = Some(Utc::now());
        self.touch_config()?;

        tracing::info!(password_protected = new_password.is_some(), "master key rotated");
        Ok(())
    }

    /// Whether `key_rotation_days` have passed since the last rotation
    pub fn key_rotation_due(&self, now: DateTime<Utc>) -> bool {
        let since = self.config.last_key_rotation.unwrap_or(self.config.created_at);
        now - since >= Duration::days(i64::from(self.config.key_rotation_days))
    }

    // ========================
    // Files
    // ========================

    fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    fn encrypted_file(&self) -> PathBuf {
        self.config_dir.join(ENCRYPTED_FILE)
    }

    fn key_file(&self) -> PathBuf {
        self.config_dir.join(KEY_FILE)
    }

    fn load_config(&self) -> CredentialsResult<CredentialsConfig> {
        let path = self.config_file();
        if !path.exists() {
            let config = CredentialsConfig::default();
            write_private(&path, serde_json::to_string_pretty(&config)?.as_bytes())?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable credentials config, using defaults");
                Ok(CredentialsConfig::default())
            }
        }
    }

    fn touch_config(&mut self) -> CredentialsResult<()> {
        self.config.last_updated = Utc::now();
        write_private(
            &self.config_file(),
            serde_json::to_string_pretty(&self.config)?.as_bytes(),
        )
    }

    fn read_key_file(&self) -> CredentialsResult<Option<MasterKeyFile>> {
        let path = self.key_file();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Open `master.key`, creating it on first use
    fn master_key(&self) -> CredentialsResult<MasterKey> {
        let password = self.password.as_ref().map(|p| p.as_str());
        if let Some(file) = self.read_key_file()? {
            return open_master_key(&file, password);
        }

        let key = generate_master_key();
        let sealed = seal_master_key(&key, password, &self.argon2)?;
        write_private(&self.key_file(), serde_json::to_string_pretty(&sealed)?.as_bytes())?;
        tracing::info!(password_protected = password.is_some(), "master key created");
        Ok(key)
    }

    fn load_vault(&self, key: &MasterKey) -> CredentialsResult<CredentialVault> {
        let path = self.encrypted_file();
        if !path.exists() {
            return Ok(CredentialVault::default());
        }
        let container = EncryptedContainer::from_json(&fs::read_to_string(&path)?)?;
        decrypt_json(&container, key)
    }

    fn save_vault(&self, vault: &mut CredentialVault, key: &MasterKey) -> CredentialsResult<()> {
        vault.encrypted_at = Utc::now();
        let container = encrypt_json(vault, key)?;
        write_private(&self.encrypted_file(), container.to_json()?.as_bytes())
    }

    fn audit(&self, action: &str, key: &str, backend: Option<StorageBackend>) {
        if self.config.audit_logging {
            match backend {
                Some(backend) => tracing::info!(target: "conjugar::audit", action, key, %backend, "credential access"),
                None => tracing::info!(target: "conjugar::audit", action, key, "credential access"),
            }
        }
    }
}

fn service_for(key: &str) -> String {
    format!("{}.{}", SERVICE_NAME, key)
}

/// `KEY`, `CONJUGAR_KEY`, then `KEY` without underscores
fn env_candidates(key: &str) -> Vec<String> {
    let upper = key.to_uppercase();
    let mut names = vec![upper.clone(), format!("CONJUGAR_{}", upper)];
    let compact = upper.replace('_', "");
    if compact != upper {
        names.push(compact);
    }
    names
}

/// `credentials.enc` → `credentials.enc.tmp`
fn staged_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a secret file readable by the owner only
///
/// New files are created with mode 0600; an existing file is tightened
/// before the new contents go in.
fn write_private(path: &Path, contents: &[u8]) -> CredentialsResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(())
}

fn prune_backups(dir: &Path, keep: usize) -> CredentialsResult<()> {
    let mut backups: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(BACKUP_PREFIX) && name.ends_with(".json"))
        })
        .collect();

    // Timestamped names sort chronologically.
    backups.sort();
    let excess = backups.len().saturating_sub(keep.max(1));
    for path in backups.into_iter().take(excess) {
        fs::remove_file(&path)?;
        tracing::debug!(path = %path.display(), "old backup removed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<(String, String), String>>,
    }

    impl SecretStore for MemoryStore {
        fn backend_name(&self) -> String {
            "memory".to_string()
        }

        fn get(&self, service: &str, user: &str) -> CredentialsResult<Option<String>> {
            let entries = self.entries.lock().unwrap();
            Ok(entries.get(&(service.to_string(), user.to_string())).cloned())
        }

        fn set(&self, service: &str, user: &str, secret: &str) -> CredentialsResult<()> {
            let mut entries = self.entries.lock().unwrap();
            entries.insert((service.to_string(), user.to_string()), secret.to_string());
            Ok(())
        }

        fn delete(&self, service: &str, user: &str) -> CredentialsResult<bool> {
            let mut entries = self.entries.lock().unwrap();
            Ok(entries.remove(&(service.to_string(), user.to_string())).is_some())
        }
    }

    fn fast_params() -> Argon2Params {
        Argon2Params {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn file_manager(dir: &Path) -> CredentialsManager {
        CredentialsManager::with_store(dir, None)
            .unwrap()
            .with_argon2_params(fast_params())
    }

    #[test]
    fn keyring_is_preferred_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let store: Box<dyn SecretStore> = Box::new(MemoryStore::default());
        let mut manager = CredentialsManager::with_store(dir.path(), Some(store)).unwrap();

        let backend = manager.store_credential("openai_api_key", "sk-abc", None, None).unwrap();
        assert_eq!(backend, StorageBackend::Keyring);
        assert!(!dir.path().join(ENCRYPTED_FILE).exists());
        assert_eq!(
            manager.retrieve_credential("openai_api_key", None).unwrap().as_deref(),
            Some("sk-abc")
        );

        assert!(manager.delete_credential("openai_api_key", None).unwrap());
        assert_eq!(manager.retrieve_credential("openai_api_key", None).unwrap(), None);
    }

    #[test]
    fn explicit_file_preference_skips_keyring() {
        let dir = tempfile::tempdir().unwrap();
        let store: Box<dyn SecretStore> = Box::new(MemoryStore::default());
        let mut manager = CredentialsManager::with_store(dir.path(), Some(store))
            .unwrap()
            .with_argon2_params(fast_params());

        let backend = manager
            .store_credential("deepl_key", "abc123", None, Some(StoragePreference::EncryptedFile))
            .unwrap();
        assert_eq!(backend, StorageBackend::EncryptedFile);
        assert!(dir.path().join(ENCRYPTED_FILE).exists());
    }

    #[test]
    fn encrypted_file_round_trip_without_keyring() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = file_manager(dir.path());

        assert_eq!(
            manager.store_credential("conj_test_alpha", "v1", None, None).unwrap(),
            StorageBackend::EncryptedFile
        );
        manager.store_credential("conj_test_beta", "v2", None, None).unwrap();

        let raw = fs::read_to_string(dir.path().join(ENCRYPTED_FILE)).unwrap();
        assert!(!raw.contains("v1"));
        assert!(raw.contains("CONJUGAR_ENC"));

        let reopened = file_manager(dir.path());
        assert_eq!(reopened.retrieve_credential("conj_test_alpha", None).unwrap().as_deref(), Some("v1"));
        let names = reopened.list_credentials().unwrap();
        assert!(names.contains(&"conj_test_alpha".to_string()));
        assert!(names.contains(&"conj_test_beta".to_string()));
    }

    #[test]
    fn deleting_last_credential_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = file_manager(dir.path());
        manager.store_credential("conj_test_only", "v", None, None).unwrap();

        assert!(manager.delete_credential("conj_test_only", None).unwrap());
        assert!(!dir.path().join(ENCRYPTED_FILE).exists());
        assert!(!manager.delete_credential("conj_test_only", None).unwrap());
    }

    #[test]
    fn env_only_refuses_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = file_manager(dir.path());
        manager.set_storage_preference(StoragePreference::EnvOnly).unwrap();
        let result = manager.store_credential("conj_test_env_only", "v", None, None);
        assert!(matches!(result, Err(CredentialsError::NoBackend(_))));
    }

    #[test]
    fn environment_fallback_uses_alternative_names() {
        let dir = tempfile::tempdir().unwrap();
        let manager = file_manager(dir.path());
        std::env::set_var("CONJUGAR_CONJ_TEST_ENV_FALLBACK", "from-env");
        assert_eq!(
            manager.retrieve_credential("conj_test_env_fallback", None).unwrap().as_deref(),
            Some("from-env")
        );
        std::env::remove_var("CONJUGAR_CONJ_TEST_ENV_FALLBACK");
    }

    #[test]
    fn env_candidate_order() {
        assert_eq!(
            env_candidates("openai_api_key"),
            vec!["OPENAI_API_KEY", "CONJUGAR_OPENAI_API_KEY", "OPENAIAPIKEY"]
        );
        assert_eq!(env_candidates("token"), vec!["TOKEN", "CONJUGAR_TOKEN"]);
    }

    #[test]
    fn password_protected_master_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = file_manager(dir.path()).with_password(Some("pw".into()));
        manager.store_credential("conj_test_pw", "secret", None, None).unwrap();
        assert!(manager.storage_info().master_key_password_protected);

        let without = file_manager(dir.path());
        assert!(matches!(
            without.retrieve_credential("conj_test_pw", None),
            Err(CredentialsError::PasswordRequired)
        ));
        let wrong = file_manager(dir.path()).with_password(Some("nope".into()));
        assert!(matches!(
            wrong.retrieve_credential("conj_test_pw", None),
            Err(CredentialsError::InvalidPassword)
        ));
    }

    #[test]
    fn rotation_re_encrypts_and_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = file_manager(dir.path());
        manager.store_credential("conj_test_rot", "keep-me", None, None).unwrap();
        let before = fs::read_to_string(dir.path().join(KEY_FILE)).unwrap();

        manager.rotate_master_key(None, Some("new-pw")).unwrap();

        let after = fs::read_to_string(dir.path().join(KEY_FILE)).unwrap();
        assert_ne!(before, after);
        assert!(manager.config().last_key_rotation.is_some());
        assert_eq!(manager.retrieve_credential("conj_test_rot", None).unwrap().as_deref(), Some("keep-me"));

        let reopened = file_manager(dir.path()).with_password(Some("new-pw".into()));
        assert_eq!(reopened.retrieve_credential("conj_test_rot", None).unwrap().as_deref(), Some("keep-me"));
        assert!(dir.path().join(BACKUP_DIR).exists());
    }

    #[test]
    fn rotation_leaves_no_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = file_manager(dir.path());
        manager.store_credential("conj_test_stage", "v", None, None).unwrap();
        manager.rotate_master_key(None, None).unwrap();

        assert!(!dir.path().join(format!("{}.tmp", KEY_FILE)).exists());
        assert!(!dir.path().join(format!("{}.tmp", ENCRYPTED_FILE)).exists());
        assert!(dir.path().join(KEY_FILE).exists());
        assert_eq!(manager.retrieve_credential("conj_test_stage", None).unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn failed_rotation_keeps_the_old_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = file_manager(dir.path()).with_password(Some("old-pw".into()));
        manager.store_credential("conj_test_keep", "v", None, None).unwrap();
        let before = fs::read_to_string(dir.path().join(KEY_FILE)).unwrap();

        assert!(manager.rotate_master_key(Some("not-it"), None).is_err());

        assert_eq!(fs::read_to_string(dir.path().join(KEY_FILE)).unwrap(), before);
        assert!(!dir.path().join(format!("{}.tmp", KEY_FILE)).exists());
        assert_eq!(manager.retrieve_credential("conj_test_keep", None).unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn staged_path_appends_suffix() {
        assert_eq!(
            staged_path(Path::new("/tmp/x/master.key")),
            PathBuf::from("/tmp/x/master.key.tmp")
        );
    }

    #[test]
    fn backups_hold_names_only_and_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = file_manager(dir.path());
        manager.store_credential("conj_test_backup", "top-secret", None, None).unwrap();

        let backup_dir = dir.path().join("manifests");
        fs::create_dir_all(&backup_dir).unwrap();
        for stamp in ["20200101_000000", "20200102_000000", "20200103_000000"] {
            fs::write(backup_dir.join(format!("{}{}.json", BACKUP_PREFIX, stamp)), "{}").unwrap();
        }

        let path = manager.backup_credentials(Some(&backup_dir)).unwrap();
        let manifest = fs::read_to_string(&path).unwrap();
        assert!(manifest.contains("conj_test_backup"));
        assert!(!manifest.contains("top-secret"));

        let remaining = fs::read_dir(&backup_dir).unwrap().count();
        assert_eq!(remaining, manager.config().backup_copies);
        assert!(!backup_dir.join(format!("{}20200101_000000.json", BACKUP_PREFIX)).exists());
    }

    #[test]
    fn config_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"storage_preference": "encrypted_file", "backup_copies": 5}"#,
        )
        .unwrap();
        let manager = file_manager(dir.path());
        assert_eq!(manager.config().storage_preference, StoragePreference::EncryptedFile);
        assert_eq!(manager.config().backup_copies, 5);
        assert_eq!(manager.config().key_rotation_days, 90);
    }

    #[test]
    fn validation_dispatches_on_name() {
        let dir = tempfile::tempdir().unwrap();
        let manager = file_manager(dir.path());
        let result = manager.validate_credential("openai_api_key", "sk-short");
        assert_eq!(result.provider, Some(Provider::OpenAi));
        assert!(!result.is_valid());
        assert!(manager.validate_credential("db_token", "whatever").is_valid());
    }

    #[test]
    fn rotation_due_after_configured_days() {
        let dir = tempfile::tempdir().unwrap();
        let manager = file_manager(dir.path());
        let created = manager.config().created_at;
        assert!(!manager.key_rotation_due(created + Duration::days(89)));
        assert!(manager.key_rotation_due(created + Duration::days(90)));
    }

    #[cfg(unix)]
    #[test]
    fn secret_files_are_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let mut manager = file_manager(dir.path());
        manager.store_credential("conj_test_mode", "v", None, None).unwrap();
        for file in [KEY_FILE, ENCRYPTED_FILE] {
            let mode = fs::metadata(dir.path().join(file)).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600, "{}", file);
        }
    }

    #[cfg(unix)]
    #[test]
    fn write_private_tightens_existing_files() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loose.json");
        fs::write(&path, b"old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, b"new").unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
        assert_eq!(fs::read(&path).unwrap(), b"new");

        let fresh = dir.path().join("fresh.json");
        write_private(&fresh, b"x").unwrap();
        assert_eq!(fs::metadata(&fresh).unwrap().permissions().mode() & 0o777, 0o600);
    }
}
