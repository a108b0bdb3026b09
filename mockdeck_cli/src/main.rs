//! Mockdeck - operator console for a mock API server
//!
//! Usage:
//!   mockdeck dash                Open the live traffic dashboard
//!   mockdeck paths               List configured path responses
//!   mockdeck set <PATH>          Create or update a path response
//!   mockdeck rm <PATH>           Delete a path response
//!   mockdeck resolve <ID> <ACT>  Respond to or drop a hanging request

mod api;
mod commands;
mod config;
mod dashboard;
mod tui;

use anyhow::Result;
use api::AdminClient;
use clap::{Args, Parser, Subcommand};
use mockdeck_common::{AdvancedMode, ResolveAction};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mockdeck")]
#[command(author = "Mockdeck Team")]
#[command(version)]
#[command(about = "Operator console for a mock API server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Admin API URL of the mock server (overrides the config file)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the live traffic dashboard
    Dash,

    /// List configured path responses
    Paths,

    /// Create or update a path response
    Set {
        /// Request path to configure (e.g. /ping)
        path: String,

        /// HTTP status code to reply with
        #[arg(short = 'c', long, default_value_t = 200)]
        status: u16,

        /// Response body
        #[arg(short, long, default_value = "")]
        body: String,

        #[command(flatten)]
        advanced: AdvancedArgs,
    },

    /// Delete a path response
    Rm {
        /// Request path to remove
        path: String,
    },

    /// Respond to or drop a hanging request
    Resolve {
        /// Hanging request id (shown on the dashboard)
        id: String,

        /// What to do with it: respond or drop
        action: String,
    },
}

/// Advanced behavior for a path; at most one may be set
#[derive(Args)]
#[group(multiple = false)]
struct AdvancedArgs {
    /// Hold requests to this path until resolved from the dashboard
    #[arg(long)]
    hang: bool,

    /// Close the connection without any response
    #[arg(long)]
    reject: bool,

    /// Sleep this many seconds before responding
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,
}

impl AdvancedArgs {
    fn mode(&self) -> AdvancedMode {
        if self.hang {
            AdvancedMode::HangUp
        } else if self.reject {
            AdvancedMode::Reject
        } else if let Some(secs) = self.delay {
            AdvancedMode::Delay(secs)
        } else {
            AdvancedMode::None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},mockdeck_cli=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    config::ensure_dirs()?;
    let mut config = config::Config::load()?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    let client = AdminClient::new(&config.server_url)?;

    match cli.command {
        Commands::Dash => {
            commands::dash::run(config, client).await?;
        }

        Commands::Paths => {
            commands::paths::list(&client).await?;
        }

        Commands::Set {
            path,
            status,
            body,
            advanced,
        } => {
            commands::paths::set(&client, &path, status, &body, advanced.mode()).await?;
        }

        Commands::Rm { path } => {
            commands::paths::rm(&client, &path).await?;
        }

        Commands::Resolve { id, action } => {
            let action = action.parse::<ResolveAction>()?;
            commands::resolve::run(&client, &id, action).await?;
        }
    }

    Ok(())
}
