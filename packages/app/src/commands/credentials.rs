use std::io::{BufRead, Write};
use std::path::Path;

use super::{print_json, Console, OutputFormat};
use crate::credentials::{
    create_report, CredentialsManager, StoragePreference, ValidationResult, ValidationStatus,
};
use crate::error::{AppError, AppResult};

/// `sk-a…yz` style preview that never shows the middle of a secret
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}…{}", head, tail)
}

fn write_validation<W: Write>(out: &mut W, result: &ValidationResult) -> AppResult<()> {
    let status = match result.status() {
        ValidationStatus::Valid => "valid",
        ValidationStatus::Warning => "valid with warnings",
        ValidationStatus::Invalid => "invalid",
    };
    let provider = result.provider.map(|p| p.as_str()).unwrap_or("generic");
    writeln!(out, "{} [{}] {}", result.key_id, provider, status)?;
    for error in &result.errors {
        writeln!(out, "  error: {}", error)?;
    }
    for warning in &result.warnings {
        writeln!(out, "  warning: {}", warning)?;
    }
    Ok(())
}

pub struct SetRequest<'a> {
    pub key: &'a str,
    pub value: Option<String>,
    pub username: Option<&'a str>,
    pub storage: Option<StoragePreference>,
    /// Store even when validation fails
    pub force: bool,
}

pub fn run_set<R: BufRead, W: Write>(
    manager: &mut CredentialsManager,
    console: &mut Console<R, W>,
    request: SetRequest<'_>,
) -> AppResult<()> {
    let value = match request.value {
        Some(value) => value,
        None => console
            .ask(&format!("Value for {}: ", request.key))?
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::InvalidInput("no value given".to_string()))?,
    };

    if manager.config().validation_enabled {
        let result = manager.validate_credential(request.key, &value);
        if result.status() != ValidationStatus::Valid {
            write_validation(console.out(), &result)?;
        }
        if !result.is_valid() && !request.force {
            return Err(AppError::InvalidInput(format!(
                "'{}' failed validation; pass --force to store it anyway",
                request.key
            )));
        }
    }

    let backend = manager.store_credential(request.key, &value, request.username, request.storage)?;
    writeln!(console.out(), "Stored '{}' in {}", request.key, backend)?;
    Ok(())
}

pub fn run_get<W: Write>(
    manager: &CredentialsManager,
    out: &mut W,
    key: &str,
    username: Option<&str>,
    show: bool,
) -> AppResult<()> {
    let value = manager
        .retrieve_credential(key, username)?
        .ok_or_else(|| AppError::InvalidInput(format!("credential '{}' not found", key)))?;
    let shown = if show { value } else { mask_secret(&value) };
    writeln!(out, "{}", shown)?;
    Ok(())
}

pub fn run_list<W: Write>(manager: &CredentialsManager, out: &mut W, format: OutputFormat) -> AppResult<()> {
    let names = manager.list_credentials()?;
    if format == OutputFormat::Json {
        return print_json(out, &names);
    }
    if names.is_empty() {
        writeln!(out, "No stored credentials.")?;
    }
    for name in &names {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

pub fn run_delete<W: Write>(
    manager: &mut CredentialsManager,
    out: &mut W,
    key: &str,
    username: Option<&str>,
) -> AppResult<()> {
    if manager.delete_credential(key, username)? {
        writeln!(out, "Deleted '{}'", key)?;
    } else {
        writeln!(out, "'{}' was not stored", key)?;
    }
    Ok(())
}

/// Validate one credential, or every stored one as a report when `key` is `None`
pub fn run_validate<W: Write>(
    manager: &CredentialsManager,
    out: &mut W,
    key: Option<&str>,
    value: Option<String>,
    format: OutputFormat,
) -> AppResult<()> {
    if let Some(key) = key {
        let value = match value {
            Some(value) => value,
            None => manager
                .retrieve_credential(key, None)?
                .ok_or_else(|| AppError::InvalidInput(format!("credential '{}' not found", key)))?,
        };
        let result = manager.validate_credential(key, &value);
        if format == OutputFormat::Json {
            return print_json(out, &result);
        }
        return write_validation(out, &result);
    }

    let mut results = Vec::new();
    for name in manager.list_credentials()? {
        if let Some(value) = manager.retrieve_credential(&name, None)? {
            results.push(manager.validate_credential(&name, &value));
        }
    }
    let report = create_report(results);
    if format == OutputFormat::Json {
        return print_json(out, &report);
    }

    writeln!(
        out,
        "{} key(s): {} valid, {} with warnings, {} invalid",
        report.total_keys, report.summary.valid, report.summary.warnings, report.summary.invalid
    )?;
    for result in &report.results {
        write_validation(out, result)?;
    }
    for recommendation in &report.recommendations {
        writeln!(out, "→ {}", recommendation)?;
    }
    Ok(())
}

pub fn run_info<W: Write>(manager: &CredentialsManager, out: &mut W, format: OutputFormat) -> AppResult<()> {
    let info = manager.storage_info();
    if format == OutputFormat::Json {
        return print_json(out, &info);
    }
    writeln!(out, "Config dir:        {}", info.config_dir.display())?;
    writeln!(
        out,
        "Keyring:           {}",
        info.keyring_backend.as_deref().unwrap_or("unavailable")
    )?;
    writeln!(out, "Encrypted file:    {}", if info.encrypted_file_exists { "present" } else { "none" })?;
    writeln!(out, "Password on key:   {}", info.master_key_password_protected)?;
    writeln!(out, "Preference:        {}", info.config.storage_preference.as_str())?;
    writeln!(out, "Methods:           {}", info.supported_methods.join(", "))?;
    if manager.key_rotation_due(chrono::Utc::now()) {
        writeln!(
            out,
            "Master key is older than {} days; consider `credentials rotate`.",
            info.config.key_rotation_days
        )?;
    }
    Ok(())
}

/// Persist the default backend for `credentials set`
pub fn run_prefer<W: Write>(
    manager: &mut CredentialsManager,
    out: &mut W,
    preference: StoragePreference,
) -> AppResult<()> {
    manager.set_storage_preference(preference)?;
    writeln!(out, "Storage preference set to {}", preference.as_str())?;
    Ok(())
}

pub fn run_backup<W: Write>(manager: &CredentialsManager, out: &mut W, dir: Option<&Path>) -> AppResult<()> {
    let path = manager.backup_credentials(dir)?;
    writeln!(out, "Backup manifest written to {}", path.display())?;
    Ok(())
}

pub fn run_rotate<W: Write>(
    manager: &mut CredentialsManager,
    out: &mut W,
    old_password: Option<&str>,
    new_password: Option<&str>,
) -> AppResult<()> {
    manager.rotate_master_key(old_password, new_password)?;
    writeln!(out, "Master key rotated")?;
    Ok(())
}
