//! Terminal user interface for the traffic dashboard

pub mod app;
pub mod theme;
mod ui;

pub use app::{DashApp, DashEvent, UserAction, View};
pub use theme::Theme;
pub use ui::draw;
