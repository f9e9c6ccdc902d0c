//! Field validation for client-supplied feature data.
//!
//! Titles and descriptions are trimmed before they are checked or stored.
//! Title length counts characters, not bytes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 200;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_DUPLICATE_TITLE: &str = "A feature with this title already exists.";

pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";

/// Field-level validation failures, keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single error on a single field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(value)` if no errors were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Raw title/description as received from a client.
///
/// Unknown fields, including the read-only `id`, `votes`, `created_at` and
/// `updated_at`, are ignored during deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl FeatureInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            title: None,
            description: Some(description.into()),
        }
    }

    /// Validate as a complete record: both fields are required.
    pub fn into_draft(self) -> Result<FeatureDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = required(FIELD_TITLE, self.title, check_title, &mut errors);
        let description = required(FIELD_DESCRIPTION, self.description, check_description, &mut errors);

        match (title, description) {
            (Some(title), Some(description)) => errors.into_result(FeatureDraft { title, description }),
            _ => Err(errors),
        }
    }

    /// Validate as a partial update: absent fields are left unchanged.
    pub fn into_changes(self) -> Result<FeatureChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = self
            .title
            .and_then(|raw| record(FIELD_TITLE, check_title(&raw), &mut errors));
        let description = self
            .description
            .and_then(|raw| record(FIELD_DESCRIPTION, check_description(&raw), &mut errors));
        errors.into_result(FeatureChanges { title, description })
    }
}

/// A validated create request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureDraft {
    pub title: String,
    pub description: String,
}

/// A validated update. `None` fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl FeatureChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

impl From<FeatureDraft> for FeatureChanges {
    fn from(draft: FeatureDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
        }
    }
}

/// Trim and check a title, returning the stored form.
pub fn check_title(raw: &str) -> Result<String, String> {
    let title = raw.trim();
    let chars = title.chars().count();
    if chars == 0 {
        return Err(MSG_BLANK.to_string());
    }
    if chars < TITLE_MIN_CHARS {
        return Err(format!("Ensure this field has at least {TITLE_MIN_CHARS} characters."));
    }
    if chars > TITLE_MAX_CHARS {
        return Err(format!("Ensure this field has no more than {TITLE_MAX_CHARS} characters."));
    }
    Ok(title.to_string())
}

/// Trim and check a description, returning the stored form.
pub fn check_description(raw: &str) -> Result<String, String> {
    let description = raw.trim();
    if description.is_empty() {
        return Err(MSG_BLANK.to_string());
    }
    Ok(description.to_string())
}

fn required(
    field: &str,
    raw: Option<String>,
    check: fn(&str) -> Result<String, String>,
    errors: &mut FieldErrors,
) -> Option<String> {
    match raw {
        Some(raw) => record(field, check(&raw), errors),
        None => {
            errors.add(field, MSG_REQUIRED);
            None
        }
    }
}

fn record(field: &str, checked: Result<String, String>, errors: &mut FieldErrors) -> Option<String> {
    checked.map_err(|message| errors.add(field, message)).ok()
}
