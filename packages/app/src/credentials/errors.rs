//! Credentials error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Invalid master password")]
    InvalidPassword,

    #[error("The master key is password protected. Please supply the password.")]
    PasswordRequired,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid magic bytes - not an encrypted credentials file")]
    InvalidMagic,

    #[error("Unsupported encryption version: {0}")]
    UnsupportedVersion(u32),

    #[error("Master key file is corrupt: {0}")]
    InvalidMasterKey(String),

    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("No storage backend accepted credential '{0}'")]
    NoBackend(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type CredentialsResult<T> = Result<T, CredentialsError>;
