//! MIDI output sink backed by a midir connection.

use midir::{MidiOutput, MidiOutputConnection};
use parking_lot::Mutex;
use tracing::{debug, warn};

use tagfade_core::CcSink;
use tagfade_core::constants::MIDI_CHANNEL;
use tagfade_core::error::SinkError;

const CLIENT_NAME: &str = "tagfade";

/// Raw bytes of a control-change message.
pub fn control_change(channel: u8, cc: u8, value: u8) -> [u8; 3] {
    [0xB0 | channel.min(15), cc & 0x7F, value & 0x7F]
}

/// Names of every MIDI output port, in system order.
pub fn list_ports() -> Result<Vec<String>, SinkError> {
    let output = MidiOutput::new(CLIENT_NAME).map_err(|e| SinkError::Connection(e.to_string()))?;
    Ok(output
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            output
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown port {i}"))
        })
        .collect())
}

/// Sends every CC on [`MIDI_CHANNEL`] through one output port.
pub struct MidiSink {
    conn: Mutex<MidiOutputConnection>,
    port_name: String,
}

impl MidiSink {
    /// Connect to the first port whose name contains `wanted`
    /// (case-insensitive), or the first port when `wanted` is `None`.
    pub fn connect(wanted: Option<&str>) -> Result<Self, SinkError> {
        let output =
            MidiOutput::new(CLIENT_NAME).map_err(|e| SinkError::Connection(e.to_string()))?;
        let ports = output.ports();
        if ports.is_empty() {
            return Err(SinkError::NoPorts);
        }

        let named: Vec<(String, _)> = ports
            .into_iter()
            .map(|port| (output.port_name(&port).unwrap_or_default(), port))
            .collect();
        let (port_name, port) = match wanted {
            Some(wanted) => {
                let needle = wanted.to_lowercase();
                named
                    .into_iter()
                    .find(|(name, _)| name.to_lowercase().contains(&needle))
                    .ok_or_else(|| SinkError::PortNotFound(wanted.to_string()))?
            }
            None => named.into_iter().next().ok_or(SinkError::NoPorts)?,
        };

        let conn = output
            .connect(&port, "tagfade-out")
            .map_err(|e| SinkError::Connection(e.to_string()))?;
        debug!(port = %port_name, "midi: connected");

        Ok(Self {
            conn: Mutex::new(conn),
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl CcSink for MidiSink {
    fn send(&self, cc: u8, value: u8) {
        let bytes = control_change(MIDI_CHANNEL, cc, value);
        if let Err(e) = self.conn.lock().send(&bytes) {
            warn!(cc, value, error = %e, "midi: send failed");
        }
    }
}
