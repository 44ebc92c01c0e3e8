//! Record identifiers.
//!
//! Every record is keyed by a UUID. Identifiers arriving from paths or bodies
//! are validated here so that a malformed value is rejected before any store
//! lookup happens.

use std::fmt;
use uuid::Uuid;

/// The kind of record an identifier refers to. Used for error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Channel,
    Video,
    Comment,
    Tweet,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Channel => "channel",
            Self::Video => "video",
            Self::Comment => "comment",
            Self::Tweet => "tweet",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an identifier of the given kind.
///
/// Surrounding whitespace is ignored; anything else that is not a
/// hyphenated or simple UUID is rejected.
pub fn parse_id(entity: EntityKind, raw: &str) -> crate::Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| crate::Error::InvalidId {
        entity,
        value: raw.to_string(),
    })
}
