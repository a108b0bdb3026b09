//! Mockdeck Common - Shared admin API types for the mock server console
//!
//! This crate contains the wire types exchanged with the mock server's admin
//! API. Field names follow the server's JSON exactly, so everything here is a
//! faithful mirror of what `/api/*` produces and consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors for values that arrive as free-form strings (CLI args, wire fields)
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid action '{0}', expected 'respond' or 'drop'")]
    InvalidAction(String),
}

/// The canned response the server returns for a configured path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResponse {
    /// HTTP status code to reply with
    pub status_code: u16,

    /// Response body; may be empty, which still counts as a configured body
    pub body: String,

    /// Raw advanced behavior flags as the server stores them
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Raw advanced behavior flags on the wire
///
/// The server keeps all four fields independently even though the dashboard
/// treats them as mutually exclusive. `timeout` is a legacy pre-response
/// sleep the console never sets; it is parsed but ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedConfig {
    pub hang_up: bool,
    pub timeout: f64,
    pub reject_request: bool,
    pub delay: f64,
}

/// The radio-exclusive view of [`AdvancedConfig`]
///
/// Exactly one mode is active at a time. Writes always go through this type,
/// so the console can never emit a conflicting flag combination.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AdvancedMode {
    /// Answer normally with the configured status and body
    #[default]
    None,
    /// Hold the request open until an operator responds or drops it
    HangUp,
    /// Sleep this many seconds before answering
    Delay(f64),
    /// Close the connection without any response
    Reject,
}

impl AdvancedMode {
    /// Build the wire flags for this mode
    pub fn to_wire(self) -> AdvancedConfig {
        let mut cfg = AdvancedConfig::default();
        match self {
            AdvancedMode::None => {}
            AdvancedMode::HangUp => cfg.hang_up = true,
            AdvancedMode::Delay(secs) => cfg.delay = secs,
            AdvancedMode::Reject => cfg.reject_request = true,
        }
        cfg
    }

    /// Short human label for tables and badges
    pub fn label(self) -> String {
        match self {
            AdvancedMode::None => "-".to_string(),
            AdvancedMode::HangUp => "hold".to_string(),
            AdvancedMode::Delay(secs) => format!("delay {}s", secs),
            AdvancedMode::Reject => "reject".to_string(),
        }
    }
}

impl AdvancedConfig {
    /// Classify the raw flags into a single mode
    ///
    /// Conflicting combinations from a lax writer resolve by the order the
    /// server checks them when serving a request: reject, then hang-up, then
    /// delay.
    pub fn mode(&self) -> AdvancedMode {
        if self.reject_request {
            AdvancedMode::Reject
        } else if self.hang_up {
            AdvancedMode::HangUp
        } else if self.delay > 0.0 {
            AdvancedMode::Delay(self.delay)
        } else {
            AdvancedMode::None
        }
    }
}

/// A completed request the server has already answered (or dropped)
///
/// Immutable once created. A `status_code` of 0 means the connection was
/// dropped without a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLog {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,

    /// Header name to one-or-many values, as the server captured them
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,

    /// Flattened query parameters; null for logs the server created without
    /// them (e.g. a resolved hanging request)
    #[serde(default)]
    pub query_params: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub body: String,

    #[serde(rename = "directIP", default)]
    pub direct_ip: String,

    #[serde(rename = "forwardedIP", default)]
    pub forwarded_ip: String,

    /// Body the server answered with
    #[serde(default)]
    pub response: String,

    pub status_code: u16,
}

impl RequestLog {
    /// Whether the connection was dropped without a response
    pub fn is_dropped(&self) -> bool {
        self.status_code == 0
    }
}

/// A request the server is holding open, awaiting an operator decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HangingRequest {
    /// Server-assigned stable id
    pub id: String,

    /// Arrival time; hanging requests have no completion time yet
    pub timestamp: DateTime<Utc>,

    pub method: String,
    pub path: String,

    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,

    #[serde(rename = "directIP", default)]
    pub direct_ip: String,
}

/// Operator decision for a hanging request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    /// Answer with the path's configured response
    Respond,
    /// Close the connection without a response
    Drop,
}

impl ResolveAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolveAction::Respond => "respond",
            ResolveAction::Drop => "drop",
        }
    }
}

impl fmt::Display for ResolveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolveAction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "respond" => Ok(ResolveAction::Respond),
            "drop" => Ok(ResolveAction::Drop),
            other => Err(ProtocolError::InvalidAction(other.to_string())),
        }
    }
}

/// POST `/api/response` payload
///
/// The server decodes this with unknown fields disallowed, so the shape must
/// match exactly. Note the body field is named `response` on this endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequest {
    pub path: String,
    pub status_code: u16,
    pub response: String,
    pub advanced: AdvancedConfig,
}

/// POST `/api/hanging-request` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub id: String,
    pub action: ResolveAction,
}

/// Constants shared by the console
pub mod constants {
    /// Default admin API address of a locally running mock server
    pub const DEFAULT_SERVER_URL: &str = "http://localhost:8081";

    /// The one path that always has a response configured and cannot be deleted
    pub const DEFAULT_PATH: &str = "/";

    /// Dashboard poll cadence in seconds
    pub const POLL_INTERVAL_SECONDS: u64 = 5;

    /// Extra wait before refreshing after a drop, covering connection teardown
    pub const DROP_REFRESH_DELAY_MS: u64 = 1000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_log_parses_server_json() {
        // Shape taken from the server's encoder, including the IP field casing
        let json = r#"{
            "timestamp": "2024-03-01T12:30:45Z",
            "method": "POST",
            "path": "/orders",
            "headers": {"Accept": ["*/*"], "X-Forwarded-For": ["10.0.0.9"]},
            "queryParams": {"limit": "10"},
            "body": "{\"item\":1}",
            "directIP": "127.0.0.1",
            "forwardedIP": "10.0.0.9",
            "response": "{\"status\":\"ok\"}",
            "statusCode": 201
        }"#;

        let log: RequestLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.method, "POST");
        assert_eq!(log.path, "/orders");
        assert_eq!(log.direct_ip, "127.0.0.1");
        assert_eq!(log.forwarded_ip, "10.0.0.9");
        let params = log.query_params.as_ref().unwrap();
        assert_eq!(params.get("limit").map(String::as_str), Some("10"));
        assert_eq!(log.status_code, 201);
        assert!(!log.is_dropped());
    }

    #[test]
    fn test_dropped_sentinel_with_null_query_params() {
        // The server emits exactly this shape for a dropped hanging request:
        // queryParams is a nil map, marshaled as null
        let json = r#"{
            "timestamp": "2024-03-01T12:30:45Z",
            "method": "GET",
            "path": "/slow",
            "headers": {},
            "queryParams": null,
            "body": "",
            "directIP": "127.0.0.1",
            "forwardedIP": "",
            "response": "Connection dropped",
            "statusCode": 0
        }"#;

        let log: RequestLog = serde_json::from_str(json).unwrap();
        assert!(log.is_dropped());
        assert!(log.query_params.is_none());
        assert_eq!(log.forwarded_ip, "");
    }

    #[test]
    fn test_hanging_request_parses() {
        let json = r#"{
            "id": "b7f9c2e1",
            "timestamp": "2024-03-01T12:31:00Z",
            "method": "GET",
            "path": "/held",
            "headers": {"User-Agent": ["curl/8.0"]},
            "directIP": "192.168.1.4"
        }"#;

        let req: HangingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.id, "b7f9c2e1");
        assert_eq!(req.direct_ip, "192.168.1.4");
    }

    #[test]
    fn test_advanced_mode_wire_roundtrip() {
        for mode in [
            AdvancedMode::None,
            AdvancedMode::HangUp,
            AdvancedMode::Delay(2.5),
            AdvancedMode::Reject,
        ] {
            assert_eq!(mode.to_wire().mode(), mode);
        }
    }

    #[test]
    fn test_advanced_mode_never_emits_conflicts() {
        let wire = AdvancedMode::Delay(1.5).to_wire();
        assert!(!wire.hang_up);
        assert!(!wire.reject_request);
        assert_eq!(wire.timeout, 0.0);
        assert_eq!(wire.delay, 1.5);
    }

    #[test]
    fn test_conflicting_flags_classify_by_server_precedence() {
        // A lax writer set everything; the server would reject first
        let wire = AdvancedConfig {
            hang_up: true,
            timeout: 3.0,
            reject_request: true,
            delay: 2.0,
        };
        assert_eq!(wire.mode(), AdvancedMode::Reject);

        let wire = AdvancedConfig {
            hang_up: true,
            delay: 2.0,
            ..Default::default()
        };
        assert_eq!(wire.mode(), AdvancedMode::HangUp);
    }

    #[test]
    fn test_upsert_request_field_names() {
        let req = UpsertRequest {
            path: "/ping".to_string(),
            status_code: 200,
            response: "pong".to_string(),
            advanced: AdvancedMode::None.to_wire(),
        };

        let json = serde_json::to_value(&req).unwrap();
        // The admin endpoint decodes with unknown fields disallowed
        assert!(json.get("statusCode").is_some());
        assert!(json.get("response").is_some());
        assert!(json.get("advanced").unwrap().get("rejectRequest").is_some());
        assert!(json.get("body").is_none());
    }

    #[test]
    fn test_resolve_action_strings() {
        assert_eq!(
            serde_json::to_string(&ResolveAction::Respond).unwrap(),
            "\"respond\""
        );
        assert_eq!("drop".parse::<ResolveAction>().unwrap(), ResolveAction::Drop);
        assert!("cancel".parse::<ResolveAction>().is_err());
    }
}
