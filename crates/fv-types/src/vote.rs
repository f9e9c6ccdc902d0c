use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of a single vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// The vote count after applying this vote to `votes`.
    ///
    /// Downvotes floor at zero.
    pub fn apply(self, votes: u64) -> u64 {
        match self {
            Self::Up => votes.saturating_add(1),
            Self::Down => votes.saturating_sub(1),
        }
    }

    /// Past-tense verb used in client acknowledgements.
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Up => "upvoted",
            Self::Down => "downvoted",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}
