//! Credential commands over a file-only manager

use std::path::Path;

use conjugar::commands::credentials::{self as cmd, SetRequest};
use conjugar::commands::{Console, OutputFormat};
use conjugar::credentials::{Argon2Params, CredentialsManager, StoragePreference};

const OPENAI_KEY: &str = "sk-Q7vLm2RtX9pWc4NbZ8kHdJ3sFg6YaE1uTqVr5oMiKxBnCl0P";

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

fn manager(dir: &Path, password: Option<&str>) -> CredentialsManager {
    CredentialsManager::with_store(dir, None)
        .unwrap()
        .with_argon2_params(fast_params())
        .with_password(password.map(str::to_string))
}

fn set(manager: &mut CredentialsManager, key: &str, value: &str, force: bool) -> String {
    let mut console = Console::new(&b""[..], Vec::new());
    let request = SetRequest {
        key,
        value: Some(value.to_string()),
        username: None,
        storage: None,
        force,
    };
    cmd::run_set(manager, &mut console, request).unwrap();
    String::from_utf8(console.into_output()).unwrap()
}

#[test]
fn set_get_and_delete_through_the_encrypted_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager(dir.path(), None);

    let output = set(&mut manager, "openai_api_key", OPENAI_KEY, false);
    assert!(output.contains("Stored 'openai_api_key' in encrypted_file"));

    let mut out = Vec::new();
    cmd::run_get(&manager, &mut out, "openai_api_key", None, false).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim(), "sk-Q…0P");

    let mut out = Vec::new();
    cmd::run_get(&manager, &mut out, "openai_api_key", None, true).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim(), OPENAI_KEY);

    let mut out = Vec::new();
    cmd::run_list(&manager, &mut out, OutputFormat::Json).unwrap();
    let names: Vec<String> = serde_json::from_slice(&out).unwrap();
    assert!(names.contains(&"openai_api_key".to_string()));

    let mut out = Vec::new();
    cmd::run_delete(&mut manager, &mut out, "openai_api_key", None).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("Deleted"));
    assert!(!dir.path().join("credentials.enc").exists());
}

#[test]
fn invalid_keys_need_force() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager(dir.path(), None);

    let mut console = Console::new(&b""[..], Vec::new());
    let request = SetRequest {
        key: "openai_api_key",
        value: Some("sk-short".to_string()),
        username: None,
        storage: None,
        force: false,
    };
    assert!(cmd::run_set(&mut manager, &mut console, request).is_err());
    let output = String::from_utf8(console.into_output()).unwrap();
    assert!(output.contains("invalid"));

    let output = set(&mut manager, "openai_api_key", "sk-short", true);
    assert!(output.contains("Stored"));
}

#[test]
fn value_is_prompted_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager(dir.path(), None);

    let input = format!("{}\n", OPENAI_KEY);
    let mut console = Console::new(input.as_bytes(), Vec::new());
    let request = SetRequest {
        key: "openai_api_key",
        value: None,
        username: None,
        storage: Some(StoragePreference::EncryptedFile),
        force: false,
    };
    cmd::run_set(&mut manager, &mut console, request).unwrap();
    assert_eq!(
        manager.retrieve_credential("openai_api_key", None).unwrap().as_deref(),
        Some(OPENAI_KEY)
    );
}

#[test]
fn password_protected_vault_needs_the_password() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut manager = manager(dir.path(), Some("correct horse"));
        set(&mut manager, "service_token", "Zr8Kq2Lm9Vx4Pt7Nw3Hy", false);
    }

    let locked = manager(dir.path(), Some("wrong"));
    assert!(locked.retrieve_credential("service_token", None).is_err());

    let unlocked = manager(dir.path(), Some("correct horse"));
    assert_eq!(
        unlocked.retrieve_credential("service_token", None).unwrap().as_deref(),
        Some("Zr8Kq2Lm9Vx4Pt7Nw3Hy")
    );

    let mut out = Vec::new();
    cmd::run_info(&unlocked, &mut out, OutputFormat::Json).unwrap();
    let info: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(info["master_key_password_protected"], true);
    assert_eq!(info["encrypted_file_exists"], true);
}

#[test]
fn rotation_keeps_secrets_readable() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager(dir.path(), None);
    set(&mut manager, "openai_api_key", OPENAI_KEY, false);

    let mut out = Vec::new();
    cmd::run_rotate(&mut manager, &mut out, None, Some("new secret")).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("rotated"));
    assert!(manager.config().last_key_rotation.is_some());

    let reopened = self::manager(dir.path(), Some("new secret"));
    assert_eq!(
        reopened.retrieve_credential("openai_api_key", None).unwrap().as_deref(),
        Some(OPENAI_KEY)
    );
    assert!(dir.path().join("backups").is_dir());
}

#[test]
fn validate_report_covers_stored_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = manager(dir.path(), None);
    set(&mut manager, "openai_api_key", OPENAI_KEY, false);
    set(&mut manager, "demo_token", "test-demo-example", true);

    let mut out = Vec::new();
    cmd::run_validate(&manager, &mut out, None, None, OutputFormat::Json).unwrap();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert!(report["total_keys"].as_u64().unwrap() >= 2);
    assert!(report["summary"]["valid"].as_u64().unwrap() >= 1);

    let mut out = Vec::new();
    cmd::run_validate(&manager, &mut out, Some("openai_api_key"), None, OutputFormat::Plain).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[openai] valid"));
}

#[test]
fn backup_lists_names_without_values() {
    let dir = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();
    let mut manager = manager(dir.path(), None);
    set(&mut manager, "openai_api_key", OPENAI_KEY, false);

    let mut out = Vec::new();
    cmd::run_backup(&manager, &mut out, Some(backups.path())).unwrap();

    let entry = std::fs::read_dir(backups.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let manifest = std::fs::read_to_string(entry.path()).unwrap();
    assert!(manifest.contains("openai_api_key"));
    assert!(!manifest.contains(OPENAI_KEY));
}

#[test]
fn missing_credentials_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(dir.path(), None);

    let mut out = Vec::new();
    assert!(cmd::run_get(&manager, &mut out, "conjugar_missing_entry", None, false).is_err());

    let mut out = Vec::new();
    let mut manager = manager;
    cmd::run_delete(&mut manager, &mut out, "conjugar_missing_entry", None).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("was not stored"));
}

#[test]
fn preference_is_saved_in_the_config_file() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut manager = manager(dir.path(), None);
        let mut out = Vec::new();
        cmd::run_prefer(&mut manager, &mut out, StoragePreference::EnvOnly).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("env_only"));
    }

    let reopened = manager(dir.path(), None);
    assert_eq!(reopened.config().storage_preference, StoragePreference::EnvOnly);
}
