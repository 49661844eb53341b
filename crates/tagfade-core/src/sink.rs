//! In-process [`CcSink`] implementations.
//!
//! [`RecordingSink`] keeps every write for inspection; [`LogSink`] turns
//! writes into log events for running without a MIDI port.

use parking_lot::Mutex;
use tracing::info;

use crate::constants::MIDI_CHANNEL;
use crate::traits::CcSink;

/// Records every `(cc, value)` write in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(u8, u8)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write so far, oldest first.
    pub fn sent(&self) -> Vec<(u8, u8)> {
        self.sent.lock().clone()
    }

    /// Values written to `cc`, oldest first.
    pub fn values_for(&self, cc: u8) -> Vec<u8> {
        self.sent
            .lock()
            .iter()
            .filter(|(c, _)| *c == cc)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn last_value(&self, cc: u8) -> Option<u8> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|(c, _)| *c == cc)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl CcSink for RecordingSink {
    fn send(&self, cc: u8, value: u8) {
        self.sent.lock().push((cc, value));
    }
}

/// Logs each write instead of transmitting it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl CcSink for LogSink {
    fn send(&self, cc: u8, value: u8) {
        info!(channel = MIDI_CHANNEL, cc, value, "cc");
    }
}
