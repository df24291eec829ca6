use std::collections::HashMap;

use uuid::Uuid;

pub mod budget;
pub mod config;
pub mod report;
pub mod system;
pub mod transaction;

use crate::cli::core::{CommandError, CommandResult, ShellContext};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(transaction::definitions());
    commands.extend(budget::definitions());
    commands.extend(report::definitions());
    commands.extend(config::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Arguments split into positionals, `--key value` options and the `--json` flag.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    options: HashMap<&'a str, &'a str>,
    pub json: bool,
}

impl<'a> ParsedArgs<'a> {
    pub fn option(&self, key: &str) -> Option<&'a str> {
        self.options.get(key).copied()
    }

    pub fn owned(&self, key: &str) -> Option<String> {
        self.option(key).map(str::to_string)
    }
}

/// Parses `args`, accepting only the option names in `allowed`. Values may be
/// given as `--key value` or `--key=value`; negative numbers stay positional.
pub(crate) fn parse_args<'a>(
    args: &[&'a str],
    allowed: &[&str],
) -> Result<ParsedArgs<'a>, CommandError> {
    let mut parsed = ParsedArgs::default();
    let mut iter = args.iter().copied();
    while let Some(arg) = iter.next() {
        let Some(body) = arg.strip_prefix("--") else {
            parsed.positional.push(arg);
            continue;
        };
        if body == "json" {
            parsed.json = true;
            continue;
        }
        let (key, value) = match body.split_once('=') {
            Some((key, value)) => (key, value),
            None => {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("option `--{body}` needs a value"))
                })?;
                (body, value)
            }
        };
        if !allowed.contains(&key) {
            return Err(CommandError::InvalidArguments(format!(
                "unknown option `--{key}`"
            )));
        }
        parsed.options.insert(key, value);
    }
    Ok(parsed)
}

pub(crate) fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

/// Matches a full id or a unique prefix of its simple hex form.
pub(crate) fn resolve_id(
    raw: &str,
    candidates: impl IntoIterator<Item = Uuid>,
    kind: &str,
) -> Result<Uuid, CommandError> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(id);
    }
    let needle = raw.trim().to_ascii_lowercase().replace('-', "");
    if needle.is_empty() {
        return Err(CommandError::InvalidArguments(format!("missing {kind} id")));
    }
    let matches: Vec<Uuid> = candidates
        .into_iter()
        .filter(|id| id.simple().to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CommandError::InvalidArguments(format!(
            "no {kind} matches `{raw}`"
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{raw}` matches {} {kind}s; use more characters",
            matches.len()
        ))),
    }
}
