//! Merging completed logs and hanging requests into one timeline

use chrono::{DateTime, Utc};
use mockdeck_common::{HangingRequest, RequestLog};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Stable identity of a timeline entry, independent of its position
///
/// Hanging requests carry a server-assigned id. Completed logs have none, so
/// theirs derives from content: a hash of timestamp, method and path. Either
/// way the identity is deterministic across polls, which is what lets
/// expansion state survive re-renders without drifting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineId(String);

impl TimelineId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn for_hanging(req: &HangingRequest) -> Self {
        TimelineId(format!("hang:{}", req.id))
    }

    fn for_log(log: &RequestLog) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(log.timestamp.to_rfc3339().as_bytes());
        hasher.update(log.method.as_bytes());
        hasher.update(log.path.as_bytes());
        let digest = hasher.finalize();
        TimelineId(format!("log:{}", hex::encode(&digest[..12])))
    }
}

/// One entry of the merged traffic view
#[derive(Debug, Clone)]
pub enum TimelineItem {
    /// A request the server is holding open, awaiting operator action
    Hanging(HangingRequest),
    /// A completed (answered or dropped) request
    Completed(RequestLog),
}

impl TimelineItem {
    pub fn is_hanging(&self) -> bool {
        matches!(self, TimelineItem::Hanging(_))
    }

    /// Effective timestamp: completion time for logs, arrival time for
    /// hanging requests (they have no completion time yet)
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TimelineItem::Hanging(req) => req.timestamp,
            TimelineItem::Completed(log) => log.timestamp,
        }
    }

    pub fn identity(&self) -> TimelineId {
        match self {
            TimelineItem::Hanging(req) => TimelineId::for_hanging(req),
            TimelineItem::Completed(log) => TimelineId::for_log(log),
        }
    }

    /// The hanging-request id, for entries that have one
    pub fn hanging_id(&self) -> Option<&str> {
        match self {
            TimelineItem::Hanging(req) => Some(&req.id),
            TimelineItem::Completed(_) => None,
        }
    }

    pub fn method(&self) -> &str {
        match self {
            TimelineItem::Hanging(req) => &req.method,
            TimelineItem::Completed(log) => &log.method,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TimelineItem::Hanging(req) => &req.path,
            TimelineItem::Completed(log) => &log.path,
        }
    }

    pub fn headers(&self) -> &BTreeMap<String, Vec<String>> {
        match self {
            TimelineItem::Hanging(req) => &req.headers,
            TimelineItem::Completed(log) => &log.headers,
        }
    }

    pub fn direct_ip(&self) -> &str {
        match self {
            TimelineItem::Hanging(req) => &req.direct_ip,
            TimelineItem::Completed(log) => &log.direct_ip,
        }
    }
}

/// Merge the two remote collections into one chronological view
///
/// Hanging entries come first in the concatenation, matching how the
/// original dashboard assembled the list; the sort is stable, so entries
/// with identical timestamps keep that relative order across polls instead
/// of jittering.
pub fn merge(logs: Vec<RequestLog>, hanging: Vec<HangingRequest>) -> Vec<TimelineItem> {
    let mut items: Vec<TimelineItem> = hanging
        .into_iter()
        .map(TimelineItem::Hanging)
        .chain(logs.into_iter().map(TimelineItem::Completed))
        .collect();

    items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    items
}
