use crate::cli::commands::{usage_error, CommandDefinition};
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;
use crate::config::Config;

const USAGE: &str = "config [show|set <key> <value>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "View and change preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show(context);
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(usage_error(&format!(
                    "config set <{}> <value>",
                    Config::KEYS.join("|")
                )));
            }
            let key = args[1].to_lowercase();
            let value = args[2..].join(" ");
            set(context, &key, value.trim())
        }
        _ => Err(usage_error(USAGE)),
    }
}

fn show(context: &ShellContext) -> CommandResult {
    output::section("Configuration");
    for key in Config::KEYS {
        let value = context.config.get(key)?.unwrap_or_else(|| "(none)".into());
        output::info(format!("  {key:<22} {value}"));
    }
    output::info(format!(
        "  {:<22} {}",
        "config file",
        context.config_manager.config_path().display()
    ));
    output::info(format!(
        "  {:<22} {}",
        "records",
        context.services.store.root().display()
    ));
    Ok(())
}

/// Validates on a copy so a rejected value leaves the live config untouched.
fn set(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut updated = context.config.clone();
    updated.set(key, value)?;
    let previous = std::mem::replace(&mut context.config, updated);
    if let Err(err) = context.rebuild_services() {
        context.config = previous;
        return Err(err);
    }
    context.persist_config()?;
    if key == "last_owner" {
        context.owner = context
            .config
            .last_owner
            .as_deref()
            .and_then(|raw| crate::domain::OwnerId::new(raw).ok());
    }
    output::success("Configuration updated.");
    Ok(())
}
