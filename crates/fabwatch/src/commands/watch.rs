//! Live alert streaming.
//!
//! Connects the console's push channel and prints connection transitions
//! and alerts as they arrive, until Ctrl-C or the `--for` duration.

use owo_colors::OwoColorize;

use fabwatch_core::{ChannelState, Console, Toast, ToastKind};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    console: &Console,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let limit = args
        .duration
        .as_deref()
        .map(humantime::parse_duration)
        .transpose()
        .map_err(|e| CliError::Validation {
            field: "--for".into(),
            reason: e.to_string(),
        })?;

    console.connect().await;
    if !global.quiet {
        eprintln!("Watching live alerts (Ctrl-C to stop)");
    }

    let color = output::should_color(&global.color);
    let run = stream_events(console, global, color);
    match limit {
        Some(duration) => {
            // Elapsed just means the watch window closed.
            let _ = tokio::time::timeout(duration, run).await;
        }
        None => run.await,
    }

    console.disconnect().await;
    Ok(())
}

/// Print state transitions and toasts until interrupted.
async fn stream_events(console: &Console, global: &GlobalOpts, color: bool) {
    let mut state_rx = console.connection_state();
    let mut revision = console.feed_revision();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if !global.quiet {
                    print_state(*state_rx.borrow_and_update(), color);
                }
            }
            changed = revision.changed() => {
                if changed.is_err() {
                    break;
                }
                for toast in console.drain_toasts() {
                    print_toast(&toast, color);
                }
            }
        }
    }
}

fn print_state(state: ChannelState, color: bool) {
    let line = match state {
        ChannelState::Connected => {
            if color {
                format!("{} connected", "●".green())
            } else {
                "● connected".to_string()
            }
        }
        ChannelState::Connecting => {
            if color {
                format!("{} connecting...", "◌".yellow())
            } else {
                "◌ connecting...".to_string()
            }
        }
        ChannelState::Disconnected => {
            if color {
                format!("{} disconnected (will retry)", "○".red())
            } else {
                "○ disconnected (will retry)".to_string()
            }
        }
    };
    eprintln!("{line}");
}

fn print_toast(toast: &Toast, color: bool) {
    let label = match toast.kind {
        ToastKind::Warning => "ALERT",
        ToastKind::Success => "RESOLVED",
        ToastKind::Info => "INFO",
    };

    let label = if color {
        match toast.kind {
            ToastKind::Warning => label.red().bold().to_string(),
            ToastKind::Success => label.green().to_string(),
            ToastKind::Info => label.cyan().to_string(),
        }
    } else {
        label.to_string()
    };

    println!("{label:>9}  {}  [{}]", toast.body, toast.alert_id);
}
