use crate::cli::commands::{usage_error, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output;
use crate::domain::OwnerId;
use crate::storage::SCHEMA_VERSION;
use crate::utils::build_info;

const OWNER_USAGE: &str = "owner [id]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new(
            "owner",
            "Show or switch the active owner",
            OWNER_USAGE,
            cmd_owner,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section(format!("MoMo Budget {}", build_info::CLI_VERSION));
    output::info(format!("  Record schema: v{SCHEMA_VERSION}"));
    output::info(format!(
        "  Build        : {} ({})",
        build_info::COMMIT,
        build_info::BUILD_DATE
    ));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(command) => help::print_command(command),
            None => context.suggest_command(name),
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_owner(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            match &context.owner {
                Some(owner) => output::info(format!("Active owner: {owner}")),
                None => output::info("No owner selected."),
            }
            Ok(())
        }
        [raw] => {
            let owner = OwnerId::new(*raw)
                .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
            context.select_owner(owner.clone())?;
            output::success(format!("Active owner is now `{owner}`."));
            Ok(())
        }
        _ => Err(usage_error(OWNER_USAGE)),
    }
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
