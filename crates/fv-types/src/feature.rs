use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::vote::VoteDirection;

/// Store-assigned identifier of a [`Feature`].
///
/// Identifiers are positive and never reused by a store instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(u64);

impl FeatureId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The identifier following this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({})", self.0)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeatureId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u64>() {
            Ok(0) | Err(_) => Err(TypeError::InvalidId(s.to_string())),
            Ok(raw) => Ok(Self(raw)),
        }
    }
}

/// Case-folded form of a title, used for uniqueness comparisons.
pub fn fold_title(title: &str) -> String {
    title.to_lowercase()
}

/// A proposed product feature.
///
/// `id`, `votes`, `created_at` and `updated_at` are owned by the system;
/// clients only ever supply `title` and `description`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub title: String,
    pub description: String,
    pub votes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feature {
    /// A freshly created feature: zero votes and equal timestamps.
    pub fn new(
        id: FeatureId,
        title: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            votes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn folded_title(&self) -> String {
        fold_title(&self.title)
    }

    /// Returns `true` if the title or description contains `needle`.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }

    /// Apply one vote and stamp the mutation time.
    pub fn apply_vote(&mut self, direction: VoteDirection, now: DateTime<Utc>) {
        self.votes = direction.apply(self.votes);
        self.updated_at = now;
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} votes)", self.title, self.votes)
    }
}
