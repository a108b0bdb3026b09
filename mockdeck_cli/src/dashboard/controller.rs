//! Optimistic resolve/drop protocol for hanging requests

use mockdeck_common::ResolveAction;
use std::collections::HashMap;

/// Where an in-flight action stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Suppression applied locally, network call not yet settled
    ActionSent,
    /// Server confirmed (or the request was already resolved elsewhere)
    Confirmed,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    action: ResolveAction,
    phase: Phase,
}

/// Two-phase state machine for operator actions on hanging requests
///
/// Keyed by hanging-request id. `begin` applies the optimistic suppression
/// before the network call goes out; `confirm`/`roll_back` settle it. While
/// an id is tracked here, its suppression takes precedence over whatever a
/// poll snapshot says about that id, so an entry cannot flicker back
/// mid-flight.
#[derive(Debug, Default)]
pub struct ResolveController {
    pending: HashMap<String, Pending>,
}

impl ResolveController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an action: suppress the entry locally and claim the id
    ///
    /// Returns false when an action for this id is already in flight or
    /// confirmed; the caller must not issue a second network call.
    pub fn begin(&mut self, id: &str, action: ResolveAction) -> bool {
        if self.pending.contains_key(id) {
            return false;
        }
        self.pending.insert(
            id.to_string(),
            Pending {
                action,
                phase: Phase::ActionSent,
            },
        );
        true
    }

    /// Server confirmed the action; the entry stays suppressed until the
    /// poll snapshot stops carrying it
    pub fn confirm(&mut self, id: &str) {
        if let Some(pending) = self.pending.get_mut(id) {
            pending.phase = Phase::Confirmed;
        }
    }

    /// Genuine failure: reverse the optimistic suppression entirely
    pub fn roll_back(&mut self, id: &str) {
        self.pending.remove(id);
    }

    /// True while the network call has not settled
    pub fn in_flight(&self, id: &str) -> bool {
        matches!(
            self.pending.get(id),
            Some(Pending {
                phase: Phase::ActionSent,
                ..
            })
        )
    }

    /// Whole-entry suppression: drop actions hide the entry itself
    pub fn hides_entry(&self, id: &str) -> bool {
        matches!(
            self.pending.get(id),
            Some(Pending {
                action: ResolveAction::Drop,
                ..
            })
        )
    }

    /// Control suppression: any pending action hides the respond/drop
    /// controls so they cannot be pressed twice
    pub fn hides_controls(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Forget confirmed ids the hanging snapshot no longer carries
    ///
    /// Once the server stops reporting a resolved request there is nothing
    /// left to suppress. Unsettled ids are kept regardless, so a poll racing
    /// an in-flight action cannot clear its suppression.
    pub fn prune_settled<'a, I>(&mut self, live_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let live: std::collections::HashSet<&str> = live_ids.into_iter().collect();
        self.pending.retain(|id, pending| {
            pending.phase == Phase::ActionSent || live.contains(id.as_str())
        });
    }
}
