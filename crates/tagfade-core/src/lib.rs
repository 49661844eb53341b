//! # tagfade-core
//! Presence tracking and the per-tag fade engine.
//!
//! Turns normalized reader events into smoothly ramped MIDI control-change
//! values:
//! - [`presence::PresenceTracker`] — which tags are active on which reader
//! - [`fade::FadeController`] — independent, supersedable ramp tasks per tag
//! - [`dispatcher::EventDispatcher`] — glue from one event to tracker + fades
//! - [`traits`] — the [`LookupTable`](traits::LookupTable) and
//!   [`CcSink`](traits::CcSink) collaborator contracts

pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod fade;
pub mod lookup;
pub mod presence;
pub mod sink;
pub mod traits;
pub mod types;

pub use dispatcher::{Dispatch, EventDispatcher};
pub use error::Advisory;
pub use fade::{FadeController, FadeOutcome, FadeSettings};
pub use lookup::StaticLookup;
pub use presence::PresenceTracker;
pub use traits::{CcSink, LookupTable};
pub use types::{Action, FadeKey, FadeScope, IgnoreReason, ReaderId, TagEvent, TagId};
