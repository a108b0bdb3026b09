//! Live traffic dashboard
//!
//! One event loop owns all state. Network calls run in spawned tasks and
//! report back over a channel as [`DashEvent`]s; keyboard input is drained
//! on a fast tick; the poll cadence is gated to a single flight.

use crate::api::AdminClient;
use crate::config::Config;
use crate::tui::{self, DashApp, DashEvent, Theme, UserAction};
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the dashboard until the operator quits
pub async fn run(config: Config, client: AdminClient) -> Result<()> {
    let theme = Theme::named(&config.theme);
    let mut app = DashApp::new(client.base_url().to_string(), theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &client, config).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut DashApp,
    client: &AdminClient,
    mut config: Config,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<DashEvent>(100);

    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));
    let mut poll_interval =
        tokio::time::interval(Duration::from_secs(config.poll_interval_secs.max(1)));

    // The responses view loads once up front; polls cover the timeline
    spawn_responses_fetch(client, &tx);

    loop {
        terminal.draw(|f| tui::draw(f, app))?;

        tokio::select! {
            // Keyboard input and notice expiry
            _ = tick_interval.tick() => {
                app.expire_notice();
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        if let Some(action) = app.handle_key(key) {
                            perform(action, app, client, &tx, &mut config);
                        }
                        if app.should_quit {
                            return Ok(());
                        }
                    }
                }
            }

            // Recurring poll; the gate coalesces ticks while one is in flight
            _ = poll_interval.tick() => {
                spawn_poll(app, client, &tx);
            }

            // Settled network work
            Some(event) = rx.recv() => {
                match event {
                    DashEvent::PollDone { seq, result } => {
                        app.apply_poll(seq, result);
                    }
                    DashEvent::ResponsesDone { result } => {
                        app.apply_responses(result);
                    }
                    DashEvent::ResolveDone { id, action, result } => {
                        if let Some(delay) = app.handle_resolve_done(&id, action, result) {
                            schedule_refresh(&tx, delay);
                        }
                    }
                    DashEvent::RefreshNow => {
                        spawn_poll(app, client, &tx);
                        spawn_responses_fetch(client, &tx);
                    }
                }
            }
        }
    }
}

/// Carry out the side effects a key press asked for
fn perform(
    action: UserAction,
    app: &mut DashApp,
    client: &AdminClient,
    tx: &mpsc::Sender<DashEvent>,
    config: &mut Config,
) {
    match action {
        UserAction::Resolve { id, action } => {
            let client = client.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = client.resolve_hanging(&id, action).await;
                let _ = tx.send(DashEvent::ResolveDone { id, action, result }).await;
            });
        }
        UserAction::Refresh => {
            spawn_poll(app, client, tx);
            spawn_responses_fetch(client, tx);
        }
        UserAction::ToggleTheme => {
            config.theme = app.theme.name.as_str().to_string();
            if let Err(err) = config.save() {
                tracing::warn!("Failed to persist theme preference: {}", err);
            }
        }
    }
}

/// Start a poll of both traffic collections, unless one is already in flight
fn spawn_poll(app: &mut DashApp, client: &AdminClient, tx: &mpsc::Sender<DashEvent>) {
    let Some(seq) = app.gate.begin() else {
        return;
    };
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.fetch_dashboard().await;
        let _ = tx.send(DashEvent::PollDone { seq, result }).await;
    });
}

fn spawn_responses_fetch(client: &AdminClient, tx: &mpsc::Sender<DashEvent>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.list_responses().await;
        let _ = tx.send(DashEvent::ResponsesDone { result }).await;
    });
}

/// Queue a follow-up refresh after the given delay
fn schedule_refresh(tx: &mpsc::Sender<DashEvent>, delay: Duration) {
    let tx = tx.clone();
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let _ = tx.send(DashEvent::RefreshNow).await;
    });
}
