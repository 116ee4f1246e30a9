//! `holesync set <slot> <on|off>`: one-shot command.

use holesync_config::Config;
use holesync_core::{CommandOutcome, DeviceCommand, Slot, SwitchState};

use crate::cli::{GlobalOpts, SetArgs, SwitchArg};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &SetArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let state = match args.state {
        SwitchArg::On => SwitchState::On,
        SwitchArg::Off => SwitchState::Off,
    };
    let slot = Slot::new(args.slot);

    let mut controller = super::build_controller(cfg)?;
    // Bind identities and log in before routing.
    controller.start().await?;

    let outcome = controller
        .handle_command(&DeviceCommand::new(slot, state.to_string()))
        .await?;

    match outcome {
        CommandOutcome::Applied {
            kind,
            remote_id,
            state,
        } => {
            let color = output::should_color(&global.color);
            let line = format!(
                "slot {slot} ({kind} {remote_id}) -> {}",
                output::paint_state(&state.to_string(), color)
            );
            output::print_output(&line, global.quiet);
            Ok(())
        }
        CommandOutcome::Stale | CommandOutcome::Ignored => Err(CliError::NotFound {
            resource_type: "bound slot".into(),
            identifier: slot.to_string(),
            list_command: "devices --kind list".into(),
        }),
    }
}
