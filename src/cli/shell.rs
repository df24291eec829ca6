use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output;
use crate::config::Config;
use crate::domain::{BudgetPeriod, Category, Service};

/// Set to read commands from stdin without a line editor.
pub const SCRIPT_ENV: &str = "MOMO_BUDGET_CLI_SCRIPT";

const TXN_ACTIONS: [&str; 5] = ["add", "list", "show", "edit", "delete"];
const BUDGET_ACTIONS: [&str; 4] = ["set", "list", "edit", "delete"];
const CONFIG_ACTIONS: [&str; 2] = ["show", "set"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<BudgetHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(BudgetHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    loop {
        // The prompt names the active owner, so rebuild it every turn.
        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                output::hint("Type `exit` or press Ctrl-D to leave the shell.");
                continue;
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line).ok();
        if execute(context, line)? == LoopControl::Exit {
            return Ok(());
        }
    }
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if execute(context, &line?)? == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Runs one line. Command failures are reported and the session goes on.
fn execute(context: &mut ShellContext, line: &str) -> Result<LoopControl, CliError> {
    match context.process_line(line) {
        Ok(control) => Ok(control),
        Err(err) => {
            context.report_error(err)?;
            Ok(LoopControl::Continue)
        }
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    shell_words::split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Line-editor helper that completes command names and, once a command is
/// typed, the categories, services, periods and config keys it takes.
struct BudgetHelper {
    commands: Vec<String>,
}

impl BudgetHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        commands.sort();
        commands.dedup();
        Self { commands }
    }

    /// Values that fit after `words`, filtered by the partial word under the cursor.
    fn candidates(&self, words: &[&str], partial: &str) -> Vec<String> {
        let needle = partial.to_ascii_lowercase();
        self.choices(words)
            .into_iter()
            .filter(|choice| choice.starts_with(&needle))
            .collect()
    }

    fn choices(&self, words: &[&str]) -> Vec<String> {
        let lowered: Vec<String> = words.iter().map(|w| w.to_ascii_lowercase()).collect();
        let words: Vec<&str> = lowered.iter().map(String::as_str).collect();

        match words.last().copied() {
            Some("--category") => return categories(),
            Some("--service") => return services(),
            Some("--period") => return periods(),
            _ => {}
        }

        match words.as_slice() {
            [] | ["help"] => self.commands.clone(),
            ["txn"] => owned(&TXN_ACTIONS),
            ["budget"] => owned(&BUDGET_ACTIONS),
            ["config"] => owned(&CONFIG_ACTIONS),
            ["config", "set"] => owned(&Config::KEYS),
            ["txn", "add", _amount] => categories(),
            ["txn", "add", _amount, _category] => services(),
            ["budget", "set" | "edit" | "delete"] => categories(),
            ["budget", "set", _category, _limit] => periods(),
            _ => Vec::new(),
        }
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn categories() -> Vec<String> {
    Category::ALL
        .iter()
        .map(|category| category.as_str().to_ascii_lowercase())
        .collect()
}

fn services() -> Vec<String> {
    Service::ALL
        .iter()
        .map(|service| service.as_str().to_ascii_lowercase())
        .collect()
}

fn periods() -> Vec<String> {
    BudgetPeriod::ALL
        .iter()
        .map(|period| period.as_str().to_string())
        .collect()
}

impl Helper for BudgetHelper {}

impl Completer for BudgetHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let start = before
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map(|(idx, ch)| idx + ch.len_utf8())
            .unwrap_or(0);
        let words: Vec<&str> = before[..start].split_whitespace().collect();
        let pairs = self
            .candidates(&words, &before[start..])
            .into_iter()
            .map(|value| Pair {
                display: value.clone(),
                replacement: value,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for BudgetHelper {
    type Hint = String;
}

impl Highlighter for BudgetHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for BudgetHelper {}
