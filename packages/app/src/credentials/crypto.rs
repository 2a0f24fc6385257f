//! Cryptographic primitives for the credentials store

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::errors::{CredentialsError, CredentialsResult};
use super::models::{
    Argon2Params, EncryptedContainer, MasterKey, MasterKeyFile, ALGORITHM_VERSION,
};

const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;
const TAG_SIZE: usize = 16;

const VERIFY_DOMAIN: &[u8] = b"CONJUGAR_VERIFY";

/// Random salt, base64 encoded
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    BASE64.encode(salt)
}

pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

pub fn generate_master_key() -> MasterKey {
    let mut key = [0u8; KEY_SIZE];
    rand::thread_rng().fill_bytes(&mut key);
    let master = MasterKey::new(key);
    zeroize::Zeroize::zeroize(&mut key);
    master
}

/// Derive a wrapping key from a password with Argon2id
pub fn derive_key(password: &str, salt_b64: &str, params: &Argon2Params) -> CredentialsResult<MasterKey> {
    let salt = BASE64.decode(salt_b64)?;

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| CredentialsError::KeyDerivationFailed(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(password.as_bytes(), &salt, &mut key[..])
        .map_err(|e| CredentialsError::KeyDerivationFailed(e.to_string()))?;

    Ok(MasterKey::new(*key))
}

/// Hash that proves a derived key is right without storing the key
pub fn verification_hash(key: &MasterKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(VERIFY_DOMAIN);
    BASE64.encode(hasher.finalize())
}

/// Short fingerprint of a secret for listings and change detection
pub fn fingerprint(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest)[..16].to_string()
}

pub fn encrypt(plaintext: &[u8], key: &MasterKey) -> CredentialsResult<(Vec<u8>, [u8; NONCE_SIZE])> {
    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CredentialsError::EncryptionFailed(e.to_string()))?;

    let nonce_bytes = generate_nonce();
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CredentialsError::EncryptionFailed(e.to_string()))?;

    Ok((ciphertext, nonce_bytes))
}

pub fn decrypt(ciphertext: &[u8], key: &MasterKey, nonce_bytes: &[u8]) -> CredentialsResult<Vec<u8>> {
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(CredentialsError::DecryptionFailed(format!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }

    let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CredentialsError::DecryptionFailed(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CredentialsError::DecryptionFailed("authentication failed".to_string()))
}

pub fn encrypt_to_container(
    plaintext: &[u8],
    key: &MasterKey,
    content_type: &str,
) -> CredentialsResult<EncryptedContainer> {
    let (ciphertext, nonce) = encrypt(plaintext, key)?;

    // The AEAD output ends with the tag; the container keeps it separately.
    let (body, tag) = ciphertext.split_at(ciphertext.len().saturating_sub(TAG_SIZE));

    Ok(EncryptedContainer::new(
        BASE64.encode(nonce),
        BASE64.encode(body),
        BASE64.encode(tag),
        plaintext.len() as u64,
        content_type,
    ))
}

pub fn decrypt_from_container(container: &EncryptedContainer, key: &MasterKey) -> CredentialsResult<Vec<u8>> {
    if !container.is_valid_magic() {
        return Err(CredentialsError::InvalidMagic);
    }
    if container.metadata.version != ALGORITHM_VERSION {
        return Err(CredentialsError::UnsupportedVersion(container.metadata.version));
    }

    let nonce = BASE64.decode(&container.metadata.nonce)?;
    let mut ciphertext = BASE64.decode(&container.ciphertext)?;
    ciphertext.extend_from_slice(&BASE64.decode(&container.tag)?);

    decrypt(&ciphertext, key, &nonce)
}

pub fn encrypt_json<T: serde::Serialize>(value: &T, key: &MasterKey) -> CredentialsResult<EncryptedContainer> {
    let json = Zeroizing::new(serde_json::to_vec(value)?);
    encrypt_to_container(&json, key, "application/json")
}

pub fn decrypt_json<T: serde::de::DeserializeOwned>(
    container: &EncryptedContainer,
    key: &MasterKey,
) -> CredentialsResult<T> {
    let plaintext = Zeroizing::new(decrypt_from_container(container, key)?);
    Ok(serde_json::from_slice(&plaintext)?)
}

// ==================== master.key ====================

/// Serialize the master key, wrapping it when a password is given
pub fn seal_master_key(
    key: &MasterKey,
    password: Option<&str>,
    params: &Argon2Params,
) -> CredentialsResult<MasterKeyFile> {
    let Some(password) = password else {
        return Ok(MasterKeyFile::Plain {
            version: ALGORITHM_VERSION,
            key: BASE64.encode(key.as_bytes()),
        });
    };

    let salt = generate_salt();
    let wrapping_key = derive_key(password, &salt, params)?;
    let wrapped = encrypt_to_container(key.as_bytes(), &wrapping_key, "application/octet-stream")?;

    Ok(MasterKeyFile::Password {
        version: ALGORITHM_VERSION,
        salt,
        params: *params,
        verification_hash: verification_hash(&wrapping_key),
        wrapped,
    })
}

/// Recover the master key from its file representation
pub fn open_master_key(file: &MasterKeyFile, password: Option<&str>) -> CredentialsResult<MasterKey> {
    match file {
        MasterKeyFile::Plain { key, .. } => {
            let bytes = Zeroizing::new(BASE64.decode(key)?);
            key_from_slice(&bytes)
        }
        MasterKeyFile::Password {
            salt,
            params,
            verification_hash: expected,
            wrapped,
            ..
        } => {
            let password = password.ok_or(CredentialsError::PasswordRequired)?;
            let wrapping_key = derive_key(password, salt, params)?;
            if verification_hash(&wrapping_key) != *expected {
                return Err(CredentialsError::InvalidPassword);
            }
            let bytes = Zeroizing::new(decrypt_from_container(wrapped, &wrapping_key)?);
            key_from_slice(&bytes)
        }
    }
}

fn key_from_slice(bytes: &[u8]) -> CredentialsResult<MasterKey> {
    let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
        CredentialsError::InvalidMasterKey(format!("expected {} bytes, got {}", KEY_SIZE, bytes.len()))
    })?;
    Ok(MasterKey::new(key))
}
