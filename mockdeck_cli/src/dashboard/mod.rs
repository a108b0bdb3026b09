//! Dashboard reconciliation core
//!
//! Everything that keeps the traffic view consistent across polls: merging
//! the two remote collections into one timeline, remembering which entries
//! the operator expanded, driving optimistic resolve actions, and gating the
//! poll cycle to a single flight.

mod controller;
mod poll;
mod timeline;
mod view_state;

pub use controller::ResolveController;
pub use poll::PollGate;
pub use timeline::{merge, TimelineId, TimelineItem};
pub use view_state::ViewState;
