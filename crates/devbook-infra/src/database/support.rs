//! Helpers shared by the PostgreSQL and in-memory repositories.

use devbook_core::RepoError;
use devbook_core::domain::{FieldMap, UserField};
use devbook_core::ports::PasswordService;

/// Mask an email for logging to avoid PII in logs.
pub(crate) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}@{domain}")
        }
        None => "***".to_string(),
    }
}

pub(crate) fn hash_password(
    passwords: &dyn PasswordService,
    plain: &str,
) -> Result<String, RepoError> {
    passwords
        .hash(plain)
        .map_err(|e| RepoError::Hashing(e.to_string()))
}

/// Replace a plaintext password in a change set with its hash.
pub(crate) fn hash_password_change(
    passwords: &dyn PasswordService,
    mut changes: FieldMap<UserField>,
) -> Result<FieldMap<UserField>, RepoError> {
    if let Some(plain) = changes.get(UserField::Password) {
        let hashed = hash_password(passwords, plain)?;
        changes.insert(UserField::Password, hashed);
    }
    Ok(changes)
}

/// Escape LIKE wildcards so the needle matches literally.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring match used by the in-memory repositories.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
