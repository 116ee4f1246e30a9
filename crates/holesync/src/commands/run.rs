//! `holesync run`: the long-running sync loop.
//!
//! Commands arrive on stdin as `<slot> <On|Off> [level]`, one per line.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use holesync_config::Config;
use holesync_core::{ControllerHandle, DeviceCommand};

use crate::cli::RunArgs;
use crate::error::CliError;

pub async fn handle(args: &RunArgs, cfg: &Config) -> Result<(), CliError> {
    let mut sync = super::sync_config(cfg)?;
    if let Some(secs) = args.interval {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1".into(),
            });
        }
        sync.interval = Duration::from_secs(secs);
    }
    let store = super::open_store(cfg)?;
    let mut controller = holesync_core::Controller::new(sync, store)?;

    match controller.start().await {
        Ok(report) => info!(
            mutations = report.mutations(),
            errors = report.error_count(),
            "initial sync complete"
        ),
        // The heartbeat retries the login on every tick.
        Err(e) if e.is_auth_expired() || e.is_transport() => {
            warn!(error = %e, "initial sync failed, continuing");
        }
        Err(e) => return Err(e.into()),
    }

    let cancel = CancellationToken::new();
    let (handle, rx) = ControllerHandle::channel();

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, shutting down");
            }
            cancel.cancel();
        }
    });

    if args.no_stdin {
        drop(handle);
    } else {
        tokio::spawn(read_commands(handle, cancel.clone()));
    }

    info!(
        url = %controller.config().url,
        interval_secs = controller.config().interval.as_secs(),
        "sync loop running"
    );
    controller.run(rx, &cancel).await;
    Ok(())
}

/// Forward stdin lines to the controller until EOF or shutdown.
async fn read_commands(handle: ControllerHandle, cancel: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let command: DeviceCommand = match line.parse() {
            Ok(command) => command,
            Err(e) => {
                warn!(input = %line, error = %e, "ignoring malformed command");
                continue;
            }
        };
        match handle.execute(command).await {
            Ok(outcome) => info!(?outcome, "command handled"),
            Err(e) => warn!(error = %e, "command failed"),
        }
    }
}
