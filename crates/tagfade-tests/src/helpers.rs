//! Shared fixtures for scenario tests.

use std::sync::Arc;

use tagfade_core::sink::RecordingSink;
use tagfade_core::{EventDispatcher, FadeScope, FadeSettings, StaticLookup};

/// Tag wired to CC 21 on reader "1" and CC 23 on reader "2".
pub const TAG_A: &str = "04:94:6a:5a:a3:11:90";
/// Tag wired to CC 22 on reader "1" and CC 24 on reader "2".
pub const TAG_B: &str = "04:8d:6a:5a:a3:11:90";
/// Tag wired to CC 25 on reader "1" and CC 26 on reader "2".
pub const TAG_C: &str = "04:19:6a:5a:a3:11:90";

/// A dispatcher over the built-in table, recording every CC write.
pub fn rig(scope: FadeScope) -> (EventDispatcher, Arc<RecordingSink>) {
    rig_with(scope, FadeSettings::default())
}

/// Like [`rig`] with custom ramp timing.
pub fn rig_with(scope: FadeScope, settings: FadeSettings) -> (EventDispatcher, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = EventDispatcher::with_options(
        Arc::new(StaticLookup::default_table()),
        sink.clone(),
        settings,
        scope,
    );
    (dispatcher, sink)
}

/// `true` if every adjacent pair satisfies `ok(prev, next)`.
pub fn pairwise(values: &[u8], ok: impl Fn(u8, u8) -> bool) -> bool {
    values.windows(2).all(|w| ok(w[0], w[1]))
}
