// ── Sync controller ──
//
// Owns the client, identity map, and device store for one appliance and
// drives them: startup, the periodic heartbeat, and inbound commands.
// Everything runs on a single task so a command and a tick never overlap.

use std::time::Duration;

use holesync_api::PiholeClient;
use strum::IntoEnumIterator;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::command::{CommandOutcome, CommandRouter, DeviceCommand};
use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::identity::IdentityMap;
use crate::model::CollectionKind;
use crate::projector::{RefreshReport, StateProjector, ensure_statistics};
use crate::reconcile::{Reconciler, SyncReport};
use crate::store::DeviceStore;

const COMMAND_CHANNEL_SIZE: usize = 64;

/// A command plus the channel its outcome is returned on.
pub struct CommandEnvelope {
    pub command: DeviceCommand,
    pub response_tx: oneshot::Sender<Result<CommandOutcome, CoreError>>,
}

/// Sending half of a running controller's command channel.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<CommandEnvelope>,
}

impl ControllerHandle {
    /// Create a handle and the receiver to pass to [`Controller::run`].
    pub fn channel() -> (Self, mpsc::Receiver<CommandEnvelope>) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        (Self { tx }, rx)
    }

    /// Queue `command` and wait until the controller has handled it.
    pub async fn execute(&self, command: DeviceCommand) -> Result<CommandOutcome, CoreError> {
        let (response_tx, rx) = oneshot::channel();
        self.tx
            .send(CommandEnvelope {
                command,
                response_tx,
            })
            .await
            .map_err(|_| CoreError::ControllerStopped)?;
        rx.await.map_err(|_| CoreError::ControllerStopped)?
    }
}

/// Outcome of one sync-and-refresh pass.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Set when re-authentication failed and nothing else ran.
    pub skipped: bool,
    pub syncs: Vec<SyncReport>,
    pub refresh: Option<RefreshReport>,
    pub errors: Vec<CoreError>,
}

impl CycleReport {
    fn skipped(err: CoreError) -> Self {
        Self {
            skipped: true,
            errors: vec![err],
            ..Self::default()
        }
    }

    /// Device mutations made by the reconcilers plus value writes.
    pub fn mutations(&self) -> usize {
        let synced: usize = self.syncs.iter().map(SyncReport::mutations).sum();
        synced + self.refresh.as_ref().map_or(0, |r| r.writes)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len() + self.refresh.as_ref().map_or(0, |r| r.errors.len())
    }
}

pub struct Controller<S> {
    config: SyncConfig,
    client: PiholeClient,
    identity: IdentityMap,
    store: S,
    ticks: u32,
    session_stale: bool,
}

impl<S: DeviceStore> Controller<S> {
    pub fn new(config: SyncConfig, store: S) -> Result<Self, CoreError> {
        let client = PiholeClient::new(config.url.clone(), &config.transport())?;
        Ok(Self::with_client(config, client, store))
    }

    /// Build around an existing client (tests point this at a mock server).
    pub fn with_client(config: SyncConfig, client: PiholeClient, store: S) -> Self {
        Self {
            config,
            client,
            identity: IdentityMap::new(),
            store,
            ticks: 0,
            session_stale: true,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn identity(&self) -> &IdentityMap {
        &self.identity
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Prepare local state, log in, and run the first sync pass.
    ///
    /// Local preparation always happens; an authentication failure is
    /// returned after it so the caller can keep the heartbeat running.
    pub async fn start(&mut self) -> Result<CycleReport, CoreError> {
        let created = ensure_statistics(&mut self.store)?;
        if created > 0 {
            debug!(created, "statistics devices created");
        }
        self.identity = IdentityMap::rebuild(&self.store);
        info!(bindings = self.identity.len(), "identity map rebuilt");

        self.authenticate().await?;
        Ok(self.sync_pass().await)
    }

    /// One heartbeat. Re-authenticates on the fixed cadence or when the
    /// session is known bad; a failed login skips the tick.
    pub async fn tick(&mut self) -> CycleReport {
        self.ticks = self.ticks.wrapping_add(1);
        let cadence = self.ticks % self.config.reauth_every.max(1) == 0;
        if cadence || self.session_stale || self.client.session().is_none() {
            debug!(tick = self.ticks, cadence, "re-authenticating");
            if let Err(e) = self.authenticate().await {
                return CycleReport::skipped(e);
            }
        }
        self.sync_pass().await
    }

    /// Sync lists, sync groups, then refresh every value.
    ///
    /// A fetch failure for one collection does not stop the others. An
    /// authentication failure marks the session stale and ends the pass.
    pub async fn sync_pass(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        for kind in CollectionKind::iter() {
            let result = Reconciler::new(&mut self.identity, &mut self.store)
                .sync(&self.client, kind)
                .await;
            match result {
                Ok(sync) => report.syncs.push(sync),
                Err(e) => {
                    warn!(%kind, error = %e, "sync failed");
                    let stop = e.is_auth_expired();
                    report.errors.push(e);
                    if stop {
                        self.session_stale = true;
                        return report;
                    }
                }
            }
        }

        let refresh = self.refresh().await;
        report.refresh = Some(refresh);
        debug!(
            mutations = report.mutations(),
            errors = report.error_count(),
            "cycle complete"
        );
        report
    }

    async fn refresh(&mut self) -> RefreshReport {
        let refresh = StateProjector::new(&self.identity, &mut self.store)
            .refresh_all(&self.client)
            .await;
        if refresh.auth_expired() {
            self.session_stale = true;
        }
        refresh
    }

    async fn authenticate(&mut self) -> Result<(), CoreError> {
        match self.client.authenticate(&self.config.password).await {
            Ok(_) => {
                self.session_stale = false;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "authentication failed");
                self.session_stale = true;
                Err(e.into())
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Route one host command, then refresh every value before returning.
    pub async fn handle_command(
        &mut self,
        command: &DeviceCommand,
    ) -> Result<CommandOutcome, CoreError> {
        if command.switch_state().is_some() && self.session_stale {
            self.authenticate().await?;
        }
        let result = CommandRouter::new(&self.client, &self.identity, &mut self.store)
            .dispatch(command)
            .await;
        match &result {
            Ok(CommandOutcome::Applied { .. }) => {
                self.refresh().await;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(slot = %command.slot, error = %e, "command failed");
                if e.is_auth_expired() {
                    self.session_stale = true;
                }
            }
        }
        result
    }

    // ── Event loop ───────────────────────────────────────────────

    /// Serve ticks and commands until `cancel` fires.
    ///
    /// The first tick is consumed on entry; call [`start`](Self::start)
    /// beforehand for the initial pass. A closed command channel leaves
    /// the heartbeat running.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<CommandEnvelope>,
        cancel: &CancellationToken,
    ) {
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // consume the immediate first tick

        let mut commands_open = true;
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                envelope = commands.recv(), if commands_open => match envelope {
                    Some(envelope) => {
                        let result = self.handle_command(&envelope.command).await;
                        let _ = envelope.response_tx.send(result);
                    }
                    None => {
                        debug!("command channel closed");
                        commands_open = false;
                    }
                },
                _ = interval.tick() => {
                    let report = self.tick().await;
                    if report.skipped {
                        warn!(tick = self.ticks, "tick skipped");
                    }
                }
            }
        }
        info!("sync controller stopped");
    }
}
