//! Allow-listed entity fields for dynamic filters and partial updates.
//!
//! Callers name fields by their external (JSON / query string) names. Only the
//! names enumerated here are accepted; anything else is a validation error and
//! never reaches a query builder.

use std::fmt;

use serde_json::Value;

use crate::error::DomainError;

/// A column that callers may address by name.
pub trait Field: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every permitted field, in declaration order.
    const ALL: &'static [Self];

    /// External name of the field.
    fn name(self) -> &'static str;

    /// Whether the field may be used as a substring filter.
    fn filterable(self) -> bool {
        true
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }
}

/// User columns addressable by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Name,
    Email,
    Password,
}

impl Field for UserField {
    const ALL: &'static [Self] = &[UserField::Name, UserField::Email, UserField::Password];

    fn name(self) -> &'static str {
        match self {
            UserField::Name => "name",
            UserField::Email => "email",
            UserField::Password => "password",
        }
    }

    fn filterable(self) -> bool {
        !matches!(self, UserField::Password)
    }
}

/// Post columns addressable by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    Title,
    Content,
}

impl Field for PostField {
    const ALL: &'static [Self] = &[PostField::Title, PostField::Content];

    fn name(self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::Content => "content",
        }
    }
}

/// Ordered mapping from field to text value, at most one entry per field.
///
/// Used both as a filter set (each entry is a case-insensitive substring
/// match, ANDed together) and as a change set for partial updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap<F> {
    entries: Vec<(F, String)>,
}

impl<F: Field> FieldMap<F> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set `field` to `value`, replacing any previous value.
    pub fn insert(&mut self, field: F, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn with(mut self, field: F, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.entries.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Build a filter set from raw `(name, value)` pairs.
    ///
    /// Empty values are skipped. Unknown or non-filterable names are rejected.
    pub fn filters<I, K, V>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let field = F::parse(key)
                .filter(|f| f.filterable())
                .ok_or_else(|| DomainError::Validation(format!("unknown filter field `{key}`")))?;

            let value = value.into();
            if !value.is_empty() {
                map.insert(field, value);
            }
        }
        Ok(map)
    }

    /// Build a change set from a JSON object body.
    ///
    /// Every key must be an allow-listed field and every value a string.
    pub fn changes(body: &Value) -> Result<Self, DomainError> {
        let object = body
            .as_object()
            .ok_or_else(|| DomainError::Validation("expected a JSON object".to_string()))?;

        let mut map = Self::new();
        for (key, value) in object {
            let field = F::parse(key)
                .ok_or_else(|| DomainError::Validation(format!("unknown field `{key}`")))?;
            let text = value.as_str().ok_or_else(|| {
                DomainError::Validation(format!("field `{key}` must be a string"))
            })?;
            map.insert(field, text);
        }
        Ok(map)
    }
}

impl<F: Field> Default for FieldMap<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> IntoIterator for FieldMap<F> {
    type Item = (F, String);
    type IntoIter = std::vec::IntoIter<(F, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
