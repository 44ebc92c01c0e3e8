//! Like targets and toggle outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a like points at. A like has exactly one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeTarget {
    Video,
    Comment,
    Tweet,
}

impl LikeTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Comment => "comment",
            Self::Tweet => "tweet",
        }
    }

    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "video" => Ok(Self::Video),
            "comment" => Ok(Self::Comment),
            "tweet" => Ok(Self::Tweet),
            other => Err(crate::Error::UnknownLikeTarget(other.to_string())),
        }
    }

    /// The identifier kind used when validating a target id.
    pub fn entity(&self) -> crate::EntityKind {
        match self {
            Self::Video => crate::EntityKind::Video,
            Self::Comment => crate::EntityKind::Comment,
            Self::Tweet => crate::EntityKind::Tweet,
        }
    }
}

impl fmt::Display for LikeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of flipping a join record (like or subscription).
///
/// `Added` carries the newly inserted record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome<T> {
    Added(T),
    Removed,
}

impl<T> ToggleOutcome<T> {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    /// Label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::Removed => "removed",
        }
    }
}
