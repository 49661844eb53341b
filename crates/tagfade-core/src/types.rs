//! Core engine types: reader/tag identities, events, tracker actions.
//!
//! Reader and tag ids are opaque strings. A tag id is unique within one
//! reader's namespace only; the same physical tag can be wired to different
//! CCs on different readers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::ABSENT_SENTINEL;

/// Identity of a physical reader.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ReaderId(pub String);

impl ReaderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReaderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identity of a tag (e.g. `04:94:6a:5a:a3:11:90`).
///
/// Readers differ in how they print hex uids; conversions from strings
/// produce the canonical form (trimmed, ASCII lowercase), so one physical
/// tag always has one identity.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TagId(pub String);

impl TagId {
    /// Canonical identity of a raw uid.
    pub fn canonical(raw: &str) -> Self {
        Self(raw.trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TagId {
    fn from(id: &str) -> Self {
        Self::canonical(id)
    }
}

impl From<String> for TagId {
    fn from(id: String) -> Self {
        Self::canonical(&id)
    }
}

/// A normalized inbound event: a tag arrived on a reader, or the reader's
/// field went empty (`tag == None`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagEvent {
    pub reader: ReaderId,
    pub tag: Option<TagId>,
}

impl TagEvent {
    /// A tag was detected on `reader`.
    pub fn present(reader: impl Into<ReaderId>, tag: impl Into<TagId>) -> Self {
        Self {
            reader: reader.into(),
            tag: Some(tag.into()),
        }
    }

    /// Every tag left `reader`.
    pub fn absent(reader: impl Into<ReaderId>) -> Self {
        Self {
            reader: reader.into(),
            tag: None,
        }
    }

    /// Build an event from the raw uid a reader reports.
    ///
    /// The [`ABSENT_SENTINEL`] uid (and an empty uid) mean "no tag".
    pub fn from_raw(reader: &str, uid: &str) -> Self {
        let uid = uid.trim();
        if uid.is_empty() || uid == ABSENT_SENTINEL {
            Self::absent(reader)
        } else {
            Self::present(reader, uid)
        }
    }
}

/// Why the presence tracker declined to start a fade.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// No CC mapping exists for the tag on this reader.
    UndefinedTag,
    /// The tag is already in the reader's active set.
    AlreadyActive,
}

/// Command returned by the presence tracker for a presence event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    StartFade { tag: TagId, cc: u8, target: u8 },
    Ignore(IgnoreReason),
}

/// How Fade Records are keyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FadeScope {
    /// One record per `(reader, tag)`; readers sharing a tag id fade
    /// independently.
    #[default]
    PerReader,
    /// One record per raw tag id, shared by every reader that knows it.
    SharedTag,
}

impl FadeScope {
    /// The record key for `tag` seen on `reader` under this scope.
    pub fn key(&self, reader: &ReaderId, tag: &TagId) -> FadeKey {
        match self {
            Self::PerReader => FadeKey {
                reader: Some(reader.clone()),
                tag: tag.clone(),
            },
            Self::SharedTag => FadeKey {
                reader: None,
                tag: tag.clone(),
            },
        }
    }
}

/// Identity of a Fade Record.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FadeKey {
    /// `None` when records are shared across readers.
    pub reader: Option<ReaderId>,
    pub tag: TagId,
}

impl FadeKey {
    pub fn new(reader: impl Into<ReaderId>, tag: impl Into<TagId>) -> Self {
        Self {
            reader: Some(reader.into()),
            tag: tag.into(),
        }
    }

    pub fn shared(tag: impl Into<TagId>) -> Self {
        Self {
            reader: None,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for FadeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reader {
            Some(reader) => write!(f, "{reader}/{}", self.tag),
            None => write!(f, "*/{}", self.tag),
        }
    }
}
