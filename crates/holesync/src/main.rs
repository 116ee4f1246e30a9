mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use holesync_config::{Config, ConfigError};

use crate::cli::{Cli, Command, ConfigCommand, LogFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Config errors surface from `run`; here they only affect log level.
    let loaded = holesync_config::load_config(cli.global.config.as_deref());
    let debug = loaded.as_ref().is_ok_and(|cfg| cfg.debug);
    init_tracing(cli.global.verbose, cli.global.quiet, debug, cli.global.log_format);

    if let Err(err) = run(&cli, loaded).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool, debug: bool, format: LogFormat) {
    let filter = match verbosity {
        _ if quiet => "error",
        0 if debug => "debug",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: &Cli, loaded: Result<Config, ConfigError>) -> Result<(), CliError> {
    let global = &cli.global;

    // Shell completions need no config.
    if let Command::Completions(args) = &cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(args.shell, &mut cmd, "holesync", &mut std::io::stdout());
        return Ok(());
    }

    // `config path` and `config init` must work with a missing or broken file.
    if let Command::Config(args) = &cli.command {
        if !matches!(args.command, ConfigCommand::Show) {
            return commands::config_cmd::handle(args, &Config::default(), global);
        }
    }

    let mut cfg = loaded?;
    commands::apply_overrides(&mut cfg, global);
    tracing::debug!(command = ?cli.command, "dispatching command");

    match &cli.command {
        Command::Run(args) => commands::run::handle(args, &cfg).await,
        Command::Sync => commands::sync::handle(&cfg, global).await,
        Command::Devices(args) => commands::devices::handle(args, &cfg, global),
        Command::Set(args) => commands::set::handle(args, &cfg, global).await,
        Command::Config(args) => commands::config_cmd::handle(args, &cfg, global),
        Command::Completions(_) => Ok(()),
    }
}
