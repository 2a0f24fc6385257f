//! On-disk formats and settings for the credentials store

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Magic identifier of encrypted credential files
pub const ENCRYPTED_MAGIC: &str = "CONJUGAR_ENC";

/// Current container format version
pub const ALGORITHM_VERSION: u32 = 1;

/// Version tag written inside the decrypted vault
pub const VAULT_VERSION: &str = "1.0";

/// Metadata stored next to each ciphertext
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptionMetadata {
    pub version: u32,
    /// Base64 nonce
    pub nonce: String,
    pub original_size: u64,
    pub content_type: String,
}

/// JSON container written to `credentials.enc`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedContainer {
    pub magic: String,
    pub metadata: EncryptionMetadata,
    /// Base64 ciphertext without the tag
    pub ciphertext: String,
    /// Base64 Poly1305 tag
    pub tag: String,
}

impl EncryptedContainer {
    pub fn new(
        nonce: String,
        ciphertext: String,
        tag: String,
        original_size: u64,
        content_type: &str,
    ) -> Self {
        Self {
            magic: ENCRYPTED_MAGIC.to_string(),
            metadata: EncryptionMetadata {
                version: ALGORITHM_VERSION,
                nonce,
                original_size,
                content_type: content_type.to_string(),
            },
            ciphertext,
            tag,
        }
    }

    pub fn is_valid_magic(&self) -> bool {
        self.magic == ENCRYPTED_MAGIC
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// 256-bit master key, wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; 32],
}

impl MasterKey {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Contents of `master.key`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protection", rename_all = "snake_case")]
pub enum MasterKeyFile {
    /// Raw key, protected only by file permissions
    Plain { version: u32, key: String },
    /// Key encrypted with an Argon2id-derived wrapping key
    Password {
        version: u32,
        salt: String,
        params: Argon2Params,
        verification_hash: String,
        wrapped: EncryptedContainer,
    },
}

impl MasterKeyFile {
    pub fn is_password_protected(&self) -> bool {
        matches!(self, Self::Password { .. })
    }
}

/// One stored secret inside the vault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub value: String,
    pub username: String,
    pub stored_at: DateTime<Utc>,
    /// First 16 hex chars of the SHA-256 of the value
    pub hash: String,
}

impl Drop for StoredCredential {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// Decrypted payload of `credentials.enc`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialVault {
    pub credentials: BTreeMap<String, StoredCredential>,
    pub encrypted_at: DateTime<Utc>,
    pub version: String,
}

impl Default for CredentialVault {
    fn default() -> Self {
        Self {
            credentials: BTreeMap::new(),
            encrypted_at: Utc::now(),
            version: VAULT_VERSION.to_string(),
        }
    }
}

/// Where new credentials go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoragePreference {
    /// Keyring when available, encrypted file otherwise
    #[default]
    Auto,
    Keyring,
    EncryptedFile,
    /// Read from environment variables only
    EnvOnly,
}

impl StoragePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Keyring => "keyring",
            Self::EncryptedFile => "encrypted_file",
            Self::EnvOnly => "env_only",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "auto" => Some(Self::Auto),
            "keyring" => Some(Self::Keyring),
            "encrypted_file" | "file" => Some(Self::EncryptedFile),
            "env_only" | "env" => Some(Self::EnvOnly),
            _ => None,
        }
    }

    pub fn allows_keyring(&self) -> bool {
        matches!(self, Self::Auto | Self::Keyring)
    }

    pub fn allows_file(&self) -> bool {
        matches!(self, Self::Auto | Self::EncryptedFile)
    }
}

/// Backend that holds (or produced) a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Keyring,
    EncryptedFile,
    Environment,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Keyring => "keyring",
            Self::EncryptedFile => "encrypted_file",
            Self::Environment => "environment",
        })
    }
}

/// `credentials_config.json`; missing keys take their defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub storage_preference: StoragePreference,
    pub encryption_enabled: bool,
    pub key_rotation_days: u32,
    pub validation_enabled: bool,
    pub audit_logging: bool,
    /// Number of backup manifests kept
    pub backup_copies: usize,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub last_key_rotation: Option<DateTime<Utc>>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            storage_preference: StoragePreference::Auto,
            encryption_enabled: true,
            key_rotation_days: 90,
            validation_enabled: true,
            audit_logging: true,
            backup_copies: 3,
            created_at: now,
            last_updated: now,
            last_key_rotation: None,
        }
    }
}

/// Snapshot of the available backends
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub keyring_available: bool,
    pub keyring_backend: Option<String>,
    pub encryption_available: bool,
    pub config_dir: PathBuf,
    pub encrypted_file_exists: bool,
    pub master_key_password_protected: bool,
    pub config: CredentialsConfig,
    pub supported_methods: Vec<String>,
}

/// Backup manifest: credential names and settings, never values
#[derive(Debug, Clone, Serialize)]
pub struct BackupManifest {
    pub created_at: DateTime<Utc>,
    pub app_name: String,
    pub config: CredentialsConfig,
    pub credential_list: Vec<String>,
    pub storage_info: StorageInfo,
}
