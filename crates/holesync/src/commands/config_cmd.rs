//! Config subcommand handlers.

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select};

use holesync_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn render_redacted(cfg: &Config) -> Result<String, CliError> {
    toml::to_string_pretty(cfg).map_err(|e| CliError::Render(e.to_string()))
}

fn init(path: &Path) -> Result<(), CliError> {
    eprintln!("holesync configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    if path.exists()
        && !Confirm::new()
            .with_prompt("Config exists. Overwrite?")
            .default(false)
            .interact()
            .map_err(prompt_err)?
    {
        return Ok(());
    }

    let url: String = Input::new()
        .with_prompt("Pi-hole URL")
        .default("http://pi.hole".into())
        .interact_text()
        .map_err(prompt_err)?;

    let password = rpassword::prompt_password("Pi-hole password: ").map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let plaintext = if selection == 0 {
        config::store_password(&url, &password)?;
        eprintln!("   password stored in system keyring");
        None
    } else {
        Some(password)
    };

    let interval_secs: u64 = Input::new()
        .with_prompt("Poll interval (seconds)")
        .default(60)
        .interact_text()
        .map_err(prompt_err)?;

    let cfg = Config {
        url: Some(url),
        password: plaintext,
        interval_secs,
        ..Config::default()
    };
    config::save_config(&cfg, path)?;
    eprintln!("   wrote {}", path.display());
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let redacted = cfg.redacted();
            let text = render_redacted(&redacted)?;
            let rendered = output::render_single(
                &global.output,
                &redacted,
                |_| text.clone(),
                |c| c.url.clone().unwrap_or_default(),
            )?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
        ConfigCommand::Path => {
            output::print_output(&config_file(global).display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Init => init(&config_file(global)),
    }
}
