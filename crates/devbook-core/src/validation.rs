//! Input validation, constructed once and injected where needed.

use crate::domain::{FieldMap, NewPost, NewUser, PostField, UserField};
use crate::error::DomainError;

/// Minimum plaintext password length accepted by default.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Validates request input before it reaches a repository.
#[derive(Debug, Clone)]
pub struct Validator {
    min_password_length: usize,
}

impl Validator {
    pub fn new(min_password_length: usize) -> Self {
        Self {
            min_password_length,
        }
    }

    /// Require a non-blank value.
    pub fn require(&self, field: &str, value: &str) -> Result<(), DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::Validation(format!("{field} is required")));
        }
        Ok(())
    }

    pub fn email(&self, email: &str) -> Result<(), DomainError> {
        if is_valid_email(email) {
            Ok(())
        } else {
            Err(DomainError::Validation("Invalid email address".to_string()))
        }
    }

    pub fn password(&self, password: &str) -> Result<(), DomainError> {
        if password.chars().count() < self.min_password_length {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        Ok(())
    }

    /// Login input: both fields present, email well formed.
    pub fn credentials(&self, email: &str, password: &str) -> Result<(), DomainError> {
        self.email(email)?;
        self.require("password", password)
    }

    pub fn new_user(&self, user: &NewUser) -> Result<(), DomainError> {
        self.email(&user.email)?;
        self.password(&user.password)
    }

    pub fn new_post(&self, post: &NewPost) -> Result<(), DomainError> {
        self.require("title", &post.title)?;
        self.require("content", &post.content)
    }

    pub fn user_changes(&self, changes: &FieldMap<UserField>) -> Result<(), DomainError> {
        for (field, value) in changes.iter() {
            match field {
                UserField::Name => {}
                UserField::Email => self.email(value)?,
                UserField::Password => self.password(value)?,
            }
        }
        Ok(())
    }

    pub fn post_changes(&self, changes: &FieldMap<PostField>) -> Result<(), DomainError> {
        for (field, value) in changes.iter() {
            match field {
                PostField::Title => self.require("title", value)?,
                PostField::Content => self.require("content", value)?,
            }
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
