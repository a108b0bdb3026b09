//! Dashboard application state and event handling

use crate::api::ApiError;
use crate::dashboard::{merge, PollGate, ResolveController, TimelineItem, ViewState};
use crate::tui::theme::Theme;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mockdeck_common::{constants, HangingRequest, PathResponse, RequestLog, ResolveAction};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Dashboard view modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Timeline,
    Responses,
}

/// Messages the spawned network tasks send back to the dashboard loop
pub enum DashEvent {
    /// A poll of logs + hanging requests settled
    PollDone {
        seq: u64,
        result: Result<(Vec<RequestLog>, Vec<HangingRequest>), ApiError>,
    },
    /// A fetch of the path response configs settled
    ResponsesDone {
        result: Result<BTreeMap<String, PathResponse>, ApiError>,
    },
    /// A resolve/drop action settled
    ResolveDone {
        id: String,
        action: ResolveAction,
        result: Result<(), ApiError>,
    },
    /// A scheduled follow-up refresh is due
    RefreshNow,
}

/// Side effects a key press asks the loop to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Issue the network call for an action already suppressed locally
    Resolve { id: String, action: ResolveAction },
    /// Refresh both remote collections now
    Refresh,
    /// Persist the flipped theme preference
    ToggleTheme,
}

/// Transient auto-dismissing message
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    at: Instant,
}

const NOTICE_TTL: Duration = Duration::from_millis(2500);

/// Dashboard application state
///
/// All mutation happens synchronously inside the event loop; spawned tasks
/// only ever report back through [`DashEvent`].
pub struct DashApp {
    pub view: View,
    pub server_url: String,
    pub theme: Theme,

    pub timeline: Vec<TimelineItem>,
    pub responses: BTreeMap<String, PathResponse>,
    pub view_state: ViewState,
    pub controller: ResolveController,
    pub gate: PollGate,

    pub selected: usize,
    pub resp_selected: usize,
    pub notice: Option<Notice>,
    pub last_refresh: Option<DateTime<Utc>>,
    pub should_quit: bool,
}

impl DashApp {
    pub fn new(server_url: String, theme: Theme) -> Self {
        Self {
            view: View::Timeline,
            server_url,
            theme,
            timeline: Vec::new(),
            responses: BTreeMap::new(),
            view_state: ViewState::new(),
            controller: ResolveController::new(),
            gate: PollGate::new(),
            selected: 0,
            resp_selected: 0,
            notice: None,
            last_refresh: None,
            should_quit: false,
        }
    }

    /// Timeline entries after suppression is applied
    ///
    /// The controller's word wins over the raw poll data: an entry with a
    /// pending or confirmed drop stays hidden even if the latest snapshot
    /// still carries it.
    pub fn visible_items(&self) -> Vec<&TimelineItem> {
        self.timeline
            .iter()
            .filter(|item| match item.hanging_id() {
                Some(id) => !self.controller.hides_entry(id),
                None => true,
            })
            .collect()
    }

    pub fn selected_item(&self) -> Option<&TimelineItem> {
        self.visible_items().get(self.selected).copied()
    }

    /// Count of hanging entries currently shown
    pub fn hanging_count(&self) -> usize {
        self.visible_items().iter().filter(|i| i.is_hanging()).count()
    }

    /// Handle a key press; returns work for the loop to carry out
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UserAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                self.should_quit = true;
                None
            }
            (KeyCode::Tab, _) => {
                self.view = match self.view {
                    View::Timeline => View::Responses,
                    View::Responses => View::Timeline,
                };
                Some(UserAction::Refresh)
            }
            (KeyCode::Char('t'), _) => {
                self.theme = self.theme.toggled();
                Some(UserAction::ToggleTheme)
            }
            (KeyCode::Char('R'), _) => Some(UserAction::Refresh),
            _ => match self.view {
                View::Timeline => self.handle_timeline_key(key),
                View::Responses => self.handle_responses_key(key),
            },
        }
    }

    fn handle_timeline_key(&mut self, key: KeyEvent) -> Option<UserAction> {
        let len = self.visible_items().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < len {
                    self.selected += 1;
                }
                None
            }
            KeyCode::PageUp => {
                self.selected = self.selected.saturating_sub(10);
                None
            }
            KeyCode::PageDown => {
                self.selected = (self.selected + 10).min(len.saturating_sub(1));
                None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.selected = 0;
                None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = len.saturating_sub(1);
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let id = self.selected_item().map(|item| item.identity());
                if let Some(id) = id {
                    self.view_state.toggle(&id);
                }
                None
            }
            KeyCode::Char('r') => self.begin_resolve(ResolveAction::Respond),
            KeyCode::Char('d') => self.begin_resolve(ResolveAction::Drop),
            _ => None,
        }
    }

    fn handle_responses_key(&mut self, key: KeyEvent) -> Option<UserAction> {
        let len = self.responses.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.resp_selected = self.resp_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.resp_selected + 1 < len {
                    self.resp_selected += 1;
                }
            }
            _ => {}
        }
        None
    }

    /// Optimistic phase of a resolve: suppress locally, hand the network
    /// call to the loop
    fn begin_resolve(&mut self, action: ResolveAction) -> Option<UserAction> {
        let id = self
            .selected_item()
            .and_then(|item| item.hanging_id())
            .map(str::to_string)?;

        if !self.controller.begin(&id, action) {
            // An action for this id is already in flight
            return None;
        }
        self.clamp_selection();
        Some(UserAction::Resolve { id, action })
    }

    /// Apply a settled poll
    ///
    /// Stale completions (superseded sequence numbers) are discarded whole;
    /// failures free the gate, surface a notice and leave the current view
    /// untouched so the loop can keep polling.
    pub fn apply_poll(
        &mut self,
        seq: u64,
        result: Result<(Vec<RequestLog>, Vec<HangingRequest>), ApiError>,
    ) {
        match result {
            Ok((logs, hanging)) => {
                if !self.gate.settle_and_check(seq) {
                    return;
                }
                self.controller
                    .prune_settled(hanging.iter().map(|h| h.id.as_str()));
                self.timeline = merge(logs, hanging);
                self.last_refresh = Some(Utc::now());
                self.clamp_selection();
            }
            Err(err) => {
                self.gate.settle(seq);
                self.notify(format!("Refresh failed: {}", err), true);
            }
        }
    }

    pub fn apply_responses(
        &mut self,
        result: Result<BTreeMap<String, PathResponse>, ApiError>,
    ) {
        match result {
            Ok(responses) => {
                self.responses = responses;
                self.resp_selected = self
                    .resp_selected
                    .min(self.responses.len().saturating_sub(1));
            }
            Err(err) => self.notify(format!("Failed to load responses: {}", err), true),
        }
    }

    /// Settle a resolve action; returns the delay before the follow-up
    /// refresh, or None when the action failed and was rolled back
    pub fn handle_resolve_done(
        &mut self,
        id: &str,
        action: ResolveAction,
        result: Result<(), ApiError>,
    ) -> Option<Duration> {
        match result {
            Ok(()) => {
                self.controller.confirm(id);
                let verb = match action {
                    ResolveAction::Respond => "responded to",
                    ResolveAction::Drop => "dropped",
                };
                self.notify(format!("Request {}", verb), false);
                Some(post_resolve_delay(action))
            }
            Err(err) if err.is_benign() => {
                // Another actor got there first; same end state as success
                self.controller.confirm(id);
                self.notify("Request was already resolved".to_string(), false);
                Some(post_resolve_delay(action))
            }
            Err(err) => {
                self.controller.roll_back(id);
                self.notify(format!("Failed to {} request: {}", action, err), true);
                self.clamp_selection();
                None
            }
        }
    }

    pub fn notify(&mut self, text: String, is_error: bool) {
        self.notice = Some(Notice {
            text,
            is_error,
            at: Instant::now(),
        });
    }

    /// Drop the notice once its time is up
    pub fn expire_notice(&mut self) {
        if let Some(notice) = &self.notice {
            if notice.at.elapsed() >= NOTICE_TTL {
                self.notice = None;
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_items().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

/// Drops wait out the server-side connection teardown before refreshing
fn post_resolve_delay(action: ResolveAction) -> Duration {
    match action {
        ResolveAction::Drop => Duration::from_millis(constants::DROP_REFRESH_DELAY_MS),
        ResolveAction::Respond => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn log_at(secs: i64, path: &str) -> RequestLog {
        RequestLog {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            method: "GET".to_string(),
            path: path.to_string(),
            headers: BTreeMap::new(),
            query_params: None,
            body: String::new(),
            direct_ip: "127.0.0.1".to_string(),
            forwarded_ip: String::new(),
            response: String::new(),
            status_code: 200,
        }
    }

    fn hanging_at(secs: i64, id: &str) -> HangingRequest {
        HangingRequest {
            id: id.to_string(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            method: "GET".to_string(),
            path: "/held".to_string(),
            headers: BTreeMap::new(),
            direct_ip: "127.0.0.1".to_string(),
        }
    }

    fn app() -> DashApp {
        DashApp::new("http://localhost:8081".to_string(), Theme::dark())
    }

    fn poll(app: &mut DashApp, logs: Vec<RequestLog>, hanging: Vec<HangingRequest>) {
        let seq = app.gate.begin().expect("gate should be free");
        app.apply_poll(seq, Ok((logs, hanging)));
    }

    #[test]
    fn test_drop_hides_entry_immediately_and_stays_gone() {
        let mut app = app();
        poll(&mut app, vec![log_at(10, "/a")], vec![hanging_at(20, "abc")]);
        assert_eq!(app.visible_items().len(), 2);

        // Hanging entry sorts newest-first, so it is selected at index 0
        let action = app.handle_key(key('d'));
        assert_eq!(
            action,
            Some(UserAction::Resolve {
                id: "abc".to_string(),
                action: ResolveAction::Drop,
            })
        );

        // Optimistic phase: gone before the network call settles
        assert_eq!(app.visible_items().len(), 1);

        // Confirmation schedules the delayed follow-up refresh
        let delay = app.handle_resolve_done("abc", ResolveAction::Drop, Ok(()));
        assert_eq!(
            delay,
            Some(Duration::from_millis(constants::DROP_REFRESH_DELAY_MS))
        );

        // Next poll no longer carries it
        poll(&mut app, vec![log_at(10, "/a")], vec![]);
        assert_eq!(app.visible_items().len(), 1);
        assert!(!app.visible_items()[0].is_hanging());
    }

    #[test]
    fn test_suppression_wins_over_interleaved_poll() {
        let mut app = app();
        poll(&mut app, vec![], vec![hanging_at(20, "abc")]);

        app.handle_key(key('d'));
        assert!(app.visible_items().is_empty());

        // A poll that raced the action still reports the entry; the
        // controller's suppression must take precedence until settled
        poll(&mut app, vec![], vec![hanging_at(20, "abc")]);
        assert!(app.visible_items().is_empty());
    }

    #[test]
    fn test_failed_resolve_rolls_back_exactly() {
        let mut app = app();
        poll(&mut app, vec![], vec![hanging_at(20, "abc")]);

        app.handle_key(key('d'));
        assert!(app.visible_items().is_empty());

        let delay = app.handle_resolve_done(
            "abc",
            ResolveAction::Drop,
            Err(ApiError::Transport {
                status: Some(500),
                message: "boom".to_string(),
            }),
        );
        assert_eq!(delay, None);

        // Entry and controls restored, error surfaced
        assert_eq!(app.visible_items().len(), 1);
        assert!(!app.controller.hides_controls("abc"));
        assert!(app.notice.as_ref().is_some_and(|n| n.is_error));
    }

    #[test]
    fn test_already_resolved_is_success_equivalent() {
        let mut app = app();
        poll(&mut app, vec![], vec![hanging_at(20, "abc")]);

        app.handle_key(key('r'));
        let delay =
            app.handle_resolve_done("abc", ResolveAction::Respond, Err(ApiError::AlreadyResolved));

        assert_eq!(delay, Some(Duration::ZERO));
        assert!(app.notice.as_ref().is_some_and(|n| !n.is_error));
        // Still suppressed, not rolled back
        assert!(app.controller.hides_controls("abc"));
    }

    #[test]
    fn test_respond_keeps_entry_visible_without_controls() {
        let mut app = app();
        poll(&mut app, vec![], vec![hanging_at(20, "abc")]);

        app.handle_key(key('r'));
        assert_eq!(app.visible_items().len(), 1);
        assert!(app.controller.hides_controls("abc"));

        // Second press while in flight does nothing
        assert_eq!(app.handle_key(key('r')), None);
        assert_eq!(app.handle_key(key('d')), None);
    }

    #[test]
    fn test_expansion_follows_identity_across_reorder() {
        let mut app = app();
        let stable = log_at(10, "/stable");
        poll(
            &mut app,
            vec![stable.clone()],
            vec![hanging_at(20, "abc")],
        );

        // Expand the log entry (index 1: hanging sorts first)
        app.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        let id = TimelineItem::Completed(stable.clone()).identity();
        assert!(app.view_state.is_expanded(&id));

        // The hanging request resolves away; the log entry shifts to index 0
        poll(&mut app, vec![stable], vec![]);
        assert!(app.view_state.is_expanded(&id));
    }

    #[test]
    fn test_poll_failure_keeps_current_view_and_notifies() {
        let mut app = app();
        poll(&mut app, vec![log_at(10, "/a")], vec![]);

        let seq = app.gate.begin().unwrap();
        app.apply_poll(
            seq,
            Err(ApiError::Transport {
                status: None,
                message: "connection refused".to_string(),
            }),
        );

        assert_eq!(app.visible_items().len(), 1);
        assert!(app.notice.as_ref().is_some_and(|n| n.is_error));
        // Gate is free again for the next tick
        assert!(app.gate.begin().is_some());
    }

    #[test]
    fn test_selection_clamps_when_entries_vanish() {
        let mut app = app();
        poll(
            &mut app,
            vec![log_at(10, "/a"), log_at(11, "/b")],
            vec![hanging_at(20, "abc")],
        );
        app.handle_key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE));
        assert_eq!(app.selected, 2);

        poll(&mut app, vec![log_at(10, "/a")], vec![]);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(key('q'));
        assert!(app.should_quit);

        let mut app = DashApp::new(String::new(), Theme::dark());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
