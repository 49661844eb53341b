//! Routes one normalized event through the presence tracker and fade
//! controller.

use std::sync::Arc;

use tracing::{debug, info};

use crate::constants::{CC_MAX, CC_MIN};
use crate::error::Advisory;
use crate::fade::{FadeController, FadeSettings};
use crate::presence::PresenceTracker;
use crate::traits::{CcSink, LookupTable};
use crate::types::{Action, FadeScope, IgnoreReason, TagEvent, TagId};

/// What handling an event did. Advisory only; dispatch never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A fade-in was launched for `tag` on `cc`.
    Started { tag: TagId, cc: u8 },
    /// The presence event changed nothing.
    Ignored(IgnoreReason),
    /// The reader was cleared; a fade-out was launched per entry.
    Departed { fades: Vec<(TagId, u8)> },
}

/// Wires a [`PresenceTracker`] to a [`FadeController`].
pub struct EventDispatcher {
    lookup: Arc<dyn LookupTable>,
    presence: PresenceTracker,
    fades: FadeController,
    scope: FadeScope,
}

impl EventDispatcher {
    /// Dispatcher with default fade settings and per-reader fade records.
    pub fn new(lookup: Arc<dyn LookupTable>, sink: Arc<dyn CcSink>) -> Self {
        Self::with_options(lookup, sink, FadeSettings::default(), FadeScope::default())
    }

    pub fn with_options(
        lookup: Arc<dyn LookupTable>,
        sink: Arc<dyn CcSink>,
        settings: FadeSettings,
        scope: FadeScope,
    ) -> Self {
        Self {
            presence: PresenceTracker::new(Arc::clone(&lookup)),
            lookup,
            fades: FadeController::with_settings(sink, settings),
            scope,
        }
    }

    /// Handle one event. Fades run detached; this returns immediately.
    ///
    /// Each fade's new target is published while the reader's presence entry
    /// is still locked, so concurrent events on one reader leave the fade
    /// targets agreeing with the final membership. Must be called within a
    /// tokio runtime.
    pub fn handle_event(&self, event: &TagEvent) -> Dispatch {
        let reader = &event.reader;
        match &event.tag {
            None => {
                let fades = self.presence.on_tag_absent_with(reader, |departures| {
                    for (tag, cc) in departures {
                        info!(%reader, %tag, cc, "tag left, fading out");
                        self.fades.start_fade(self.scope.key(reader, tag), *cc, CC_MIN);
                    }
                });
                if fades.is_empty() {
                    debug!("{}", Advisory::UnknownReaderOnDeparture(reader.to_string()));
                }
                Dispatch::Departed { fades }
            }
            Some(tag) => {
                let action = self.presence.on_tag_present_with(reader, tag, |tag, cc| {
                    info!(%reader, %tag, cc, "tag detected, fading in");
                    self.fades.start_fade(self.scope.key(reader, tag), cc, CC_MAX);
                });
                match action {
                    Action::StartFade { tag, cc, .. } => Dispatch::Started { tag, cc },
                    Action::Ignore(reason) => {
                        info!("{}", Advisory::ignored(reason, reader.as_str(), tag.as_str()));
                        Dispatch::Ignored(reason)
                    }
                }
            }
        }
    }

    /// The wiring table events are resolved against.
    pub fn lookup(&self) -> &dyn LookupTable {
        self.lookup.as_ref()
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn fades(&self) -> &FadeController {
        &self.fades
    }

    pub fn scope(&self) -> FadeScope {
        self.scope
    }
}
