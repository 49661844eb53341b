//! Engine constants. All CC values are 7-bit (0..=127).

use std::time::Duration;

/// Highest value a MIDI control-change data byte can carry.
pub const CC_MAX: u8 = 127;

/// Lowest control-change value; the fade-out target.
pub const CC_MIN: u8 = 0;

/// Value increment per ramp step.
pub const FADE_STEP: u8 = 2;

/// Total ramp duration when the target is [`CC_MAX`] (tag arrived).
pub const FADE_IN_DURATION: Duration = Duration::from_secs(2);

/// Total ramp duration for every other target (tag departed).
pub const FADE_OUT_DURATION: Duration = Duration::from_secs(5);

/// Zero-based MIDI channel every CC is sent on (channel 10 on the wire).
pub const MIDI_CHANNEL: u8 = 9;

/// Tag id readers report when the field is empty.
pub const ABSENT_SENTINEL: &str = "none";

/// Reader id assumed when an event omits it.
pub const DEFAULT_READER: &str = "1";

/// Built-in wiring of the installation: `(reader, tag, cc)`.
///
/// The same physical tag drives a different CC on each reader.
pub const DEFAULT_TABLE: &[(&str, &str, u8)] = &[
    ("1", "04:94:6a:5a:a3:11:90", 21),
    ("1", "04:8d:6a:5a:a3:11:90", 22),
    ("1", "04:19:6a:5a:a3:11:90", 25),
    ("2", "04:94:6a:5a:a3:11:90", 23),
    ("2", "04:8d:6a:5a:a3:11:90", 24),
    ("2", "04:19:6a:5a:a3:11:90", 26),
];
