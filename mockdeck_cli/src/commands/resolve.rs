//! One-shot hanging request resolution

use crate::api::{AdminClient, ApiError};
use anyhow::Result;
use console::style;
use mockdeck_common::ResolveAction;

/// Respond to or drop a hanging request by id
pub async fn run(client: &AdminClient, id: &str, action: ResolveAction) -> Result<()> {
    match client.resolve_hanging(id, action).await {
        Ok(()) => {
            let verb = match action {
                ResolveAction::Respond => "Responded to",
                ResolveAction::Drop => "Dropped",
            };
            cliclack::log::success(format!("{} request {}", verb, style(id).cyan()))?;
            Ok(())
        }
        Err(ApiError::AlreadyResolved) => {
            cliclack::log::info(format!(
                "Request {} was already resolved",
                style(id).cyan()
            ))?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
