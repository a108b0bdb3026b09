//! Per-entry expansion state that survives re-renders

use super::TimelineId;
use std::collections::HashSet;

/// Which timeline entries have their detail panel open
///
/// Keyed by entry identity, never by rendered position; when a poll removes
/// or reorders entries, every surviving identity keeps its state. Identities
/// that disappear are retained, so an entry that vanishes and later comes
/// back (same identity) comes back expanded.
#[derive(Debug, Default)]
pub struct ViewState {
    expanded: HashSet<TimelineId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unseen identities default to collapsed
    pub fn is_expanded(&self, id: &TimelineId) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle(&mut self, id: &TimelineId) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
    }

    pub fn set_expanded(&mut self, id: TimelineId, expanded: bool) {
        if expanded {
            self.expanded.insert(id);
        } else {
            self.expanded.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> TimelineId {
        // Identities are opaque here; any distinct string works
        use crate::dashboard::timeline::TimelineItem;
        use chrono::{TimeZone, Utc};
        use mockdeck_common::HangingRequest;
        use std::collections::BTreeMap;

        TimelineItem::Hanging(HangingRequest {
            id: s.to_string(),
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
            method: "GET".to_string(),
            path: "/".to_string(),
            headers: BTreeMap::new(),
            direct_ip: String::new(),
        })
        .identity()
    }

    #[test]
    fn test_default_collapsed() {
        let state = ViewState::new();
        assert!(!state.is_expanded(&id("a")));
    }

    #[test]
    fn test_toggle_and_set() {
        let mut state = ViewState::new();
        state.toggle(&id("a"));
        assert!(state.is_expanded(&id("a")));

        state.toggle(&id("a"));
        assert!(!state.is_expanded(&id("a")));

        state.set_expanded(id("b"), true);
        assert!(state.is_expanded(&id("b")));
        state.set_expanded(id("b"), false);
        assert!(!state.is_expanded(&id("b")));
    }

    #[test]
    fn test_state_is_identity_keyed_not_positional() {
        let mut state = ViewState::new();
        state.toggle(&id("second"));

        // Simulated re-render where the entry moved positions: the identity
        // still reports expanded, and nothing else does
        assert!(state.is_expanded(&id("second")));
        assert!(!state.is_expanded(&id("first")));
        assert!(!state.is_expanded(&id("third")));
    }

    #[test]
    fn test_absent_identity_restores_on_return() {
        let mut state = ViewState::new();
        state.toggle(&id("gone-and-back"));

        // Polls that no longer contain the identity do not touch the store;
        // when the identity reappears its state is intact
        assert!(state.is_expanded(&id("gone-and-back")));
    }
}
