//! Command handlers and the config plumbing they share.

pub mod config_cmd;
pub mod devices;
pub mod run;
pub mod set;
pub mod sync;

use holesync_config::Config;
use holesync_core::{Controller, FileStore, SyncConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Apply global CLI overrides on top of the loaded config.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.url {
        cfg.url = Some(url.clone());
    }
    if let Some(ref state_file) = global.state_file {
        cfg.state_file = Some(state_file.clone());
    }
    if global.insecure {
        cfg.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }
}

/// Translate the effective config into the core `SyncConfig`.
pub fn sync_config(cfg: &Config) -> Result<SyncConfig, CliError> {
    if cfg.url.is_none() {
        return Err(CliError::NoConfig {
            path: holesync_config::config_path().display().to_string(),
        });
    }
    Ok(holesync_config::to_sync_config(cfg)?)
}

/// Open the device store named by the config.
pub fn open_store(cfg: &Config) -> Result<FileStore, CliError> {
    let path = cfg.state_file();
    tracing::debug!(path = %path.display(), "opening device store");
    Ok(FileStore::open(path)?)
}

/// Build a controller over the configured device store.
pub fn build_controller(cfg: &Config) -> Result<Controller<FileStore>, CliError> {
    let sync = sync_config(cfg)?;
    let store = open_store(cfg)?;
    Ok(Controller::new(sync, store)?)
}
