//! Error and advisory types for the fade engine.
use thiserror::Error;

use crate::types::IgnoreReason;

/// Non-fatal outcomes of event handling. Logged, never propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    #[error("undefined tag {tag} on reader {reader}")] UndefinedTag { reader: String, tag: String },
    #[error("tag {tag} already active on reader {reader}")] AlreadyActive { reader: String, tag: String },
    #[error("departure on reader {0} with no active tags")] UnknownReaderOnDeparture(String),
}

impl Advisory {
    /// Advisory for a presence event the tracker ignored.
    pub fn ignored(reason: IgnoreReason, reader: &str, tag: &str) -> Self {
        let (reader, tag) = (reader.to_string(), tag.to_string());
        match reason {
            IgnoreReason::UndefinedTag => Self::UndefinedTag { reader, tag },
            IgnoreReason::AlreadyActive => Self::AlreadyActive { reader, tag },
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("cc {cc} out of range for tag {tag} on reader {reader}")] CcOutOfRange { reader: String, tag: String, cc: u32 },
    #[error("empty reader id")] EmptyReader,
    #[error("empty tag id on reader {0}")] EmptyTag(String),
    #[error("table load: {0}")] Load(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("no output port matching '{0}'")] PortNotFound(String),
    #[error("no output ports available")] NoPorts,
    #[error("connection: {0}")] Connection(String),
}
