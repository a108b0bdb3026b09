//! Typed client for the mock server's admin API

mod client;
mod error;

pub use client::AdminClient;
pub use error::ApiError;
