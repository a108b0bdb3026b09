//! Path response management commands (paths, set, rm)

use crate::api::AdminClient;
use anyhow::Result;
use console::style;
use mockdeck_common::AdvancedMode;

/// List all configured path responses
pub async fn list(client: &AdminClient) -> Result<()> {
    let responses = client.list_responses().await?;

    if responses.is_empty() {
        println!("No path responses configured.");
        println!();
        println!("Add one with: mockdeck set /ping --status 200 --body pong");
        return Ok(());
    }

    println!(
        "{:<28} {:<8} {:<12} {}",
        "PATH", "STATUS", "MODE", "BODY"
    );
    println!("{}", "-".repeat(72));

    for (path, cfg) in &responses {
        let body = if cfg.body.trim().is_empty() {
            style("(blank)").dim().to_string()
        } else {
            truncate(cfg.body.lines().next().unwrap_or(""), 40)
        };

        let status = if (200..300).contains(&cfg.status_code) {
            style(cfg.status_code.to_string()).green()
        } else if cfg.status_code >= 400 {
            style(cfg.status_code.to_string()).red()
        } else {
            style(cfg.status_code.to_string()).yellow()
        };

        println!(
            "{:<28} {:<8} {:<12} {}",
            truncate(path, 26),
            status,
            cfg.advanced.mode().label(),
            body
        );
    }

    Ok(())
}

/// Create or update a path's canned response
pub async fn set(
    client: &AdminClient,
    path: &str,
    status_code: u16,
    body: &str,
    mode: AdvancedMode,
) -> Result<()> {
    client.upsert_response(path, status_code, body, mode).await?;
    cliclack::log::success(format!(
        "Saved response for {}",
        style(path).cyan()
    ))?;
    Ok(())
}

/// Delete a path's canned response
pub async fn rm(client: &AdminClient, path: &str) -> Result<()> {
    client.delete_response(path).await?;
    cliclack::log::success(format!("Deleted response for {}", style(path).cyan()))?;
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    } else {
        s.to_string()
    }
}
