//! Collaborator contracts at the edge of the engine.
//!
//! - [`LookupTable`] — static `reader → tag → cc` wiring (read-only)
//! - [`CcSink`] — where control-change values end up (MIDI port, log, test)

use std::sync::Arc;

use crate::types::{ReaderId, TagId};

/// Read-only mapping from a tag seen on a reader to the CC it drives.
pub trait LookupTable: Send + Sync {
    /// The CC number wired to `tag` on `reader`, or `None` if unmapped.
    fn resolve(&self, reader: &ReaderId, tag: &TagId) -> Option<u8>;

    /// Readers known to the table, for status reporting.
    ///
    /// Default implementation returns an empty list.
    fn readers(&self) -> Vec<ReaderId> {
        Vec::new()
    }
}

/// Destination of control-change writes.
///
/// Sends are best effort: implementations log their own transport failures
/// and never report them to the fade engine.
pub trait CcSink: Send + Sync {
    /// Transmit `value` on control-change number `cc`.
    fn send(&self, cc: u8, value: u8);
}

impl<T: LookupTable + ?Sized> LookupTable for Arc<T> {
    fn resolve(&self, reader: &ReaderId, tag: &TagId) -> Option<u8> {
        (**self).resolve(reader, tag)
    }

    fn readers(&self) -> Vec<ReaderId> {
        (**self).readers()
    }
}

impl<T: CcSink + ?Sized> CcSink for Arc<T> {
    fn send(&self, cc: u8, value: u8) {
        (**self).send(cc, value)
    }
}
