//! API key storage
//!
//! This module provides:
//! - OS keyring storage when a working backend is found
//! - A ChaCha20-Poly1305 encrypted file keyed by `master.key`
//! - Read-only environment variable fallback
//! - Offline key validation and reports

pub mod crypto;
pub mod errors;
pub mod manager;
pub mod models;
pub mod store;
pub mod validator;

pub use errors::{CredentialsError, CredentialsResult};
pub use manager::{CredentialsManager, DEFAULT_USERNAME, SERVICE_NAME};
pub use models::{
    Argon2Params, BackupManifest, CredentialsConfig, StorageBackend, StorageInfo, StoragePreference,
};
pub use store::{KeyringStore, SecretStore};
pub use validator::{
    create_report, detect_provider, validate_key, Provider, ValidationLevel, ValidationReport,
    ValidationResult, ValidationStatus,
};
