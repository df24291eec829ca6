//! Shell context, dispatch, and error reporting.

use std::{env, io, path::PathBuf, str::FromStr, sync::Arc};

use chrono::{DateTime, Utc};
use rustyline::error::ReadlineError;
use serde::Serialize;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    core::{
        AlertThresholds, BudgetService, Clock, CoreError, FixedClock, SummaryService,
        SystemClock, TransactionService, TrendBand,
    },
    domain::{BudgetPeriod, OwnerId},
    errors::AppError,
    storage::JsonRecordStore,
    utils,
};

use super::commands::{self, CommandDefinition, CommandRegistry};
use super::output::{self, OutputPreferences};
use super::render::Formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Services wired to one record store and clock.
pub struct Services {
    pub store: Arc<JsonRecordStore>,
    pub transactions: TransactionService,
    pub budgets: BudgetService,
    pub summaries: SummaryService,
}

impl Services {
    pub fn build(
        config: &Config,
        home: &std::path::Path,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let store = Arc::new(JsonRecordStore::new(config.resolve_data_root(home))?);
        let thresholds = AlertThresholds::new(config.near_limit_ratio)?;
        let band = TrendBand::new(config.trend_band)?;
        let period = BudgetPeriod::from_str(&config.default_budget_period)
            .map_err(CoreError::from)?;
        Ok(Self {
            transactions: TransactionService::new(store.clone(), clock.clone()),
            budgets: BudgetService::new(store.clone(), clock.clone())
                .with_default_period(period),
            summaries: SummaryService::new(store.clone(), clock)
                .with_thresholds(thresholds)
                .with_trend_band(band),
            store,
        })
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub home: PathBuf,
    pub clock: Arc<dyn Clock>,
    pub services: Services,
    pub owner: Option<OwnerId>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let home = utils::app_home();
        Self::with_home(mode, home)
    }

    pub fn with_home(mode: CliMode, home: PathBuf) -> Result<Self, CliError> {
        let registry = CommandRegistry::new(commands::all_definitions());
        let config_manager = ConfigManager::with_base_dir(home.clone()).map_err(AppError::from)?;
        let config = config_manager.load().map_err(AppError::from)?;
        output::set_preferences(OutputPreferences {
            color_enabled: config.ui_color_enabled,
        });

        let clock: Arc<dyn Clock> = match utils::reference_override()? {
            Some(at) => Arc::new(FixedClock(at)),
            None => Arc::new(SystemClock),
        };
        let owner = match env::var(utils::OWNER_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Some(OwnerId::new(raw.trim()).map_err(|err| {
                AppError::Environment(format!("{}: {err}", utils::OWNER_ENV))
            })?),
            _ => config
                .last_owner
                .as_deref()
                .and_then(|raw| OwnerId::new(raw).ok()),
        };
        let services = Services::build(&config, &home, clock.clone())?;
        tracing::debug!(
            home = %home.display(),
            data_root = %services.store.root().display(),
            "shell context ready"
        );

        Ok(Self {
            mode,
            registry,
            config_manager,
            config,
            home,
            clock,
            services,
            owner,
        })
    }

    pub(crate) fn prompt(&self) -> String {
        match &self.owner {
            Some(owner) => format!("momo({owner})> "),
            None => "momo> ".into(),
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn formatter(&self) -> Formatter {
        Formatter::new(&self.config.currency, &self.config.locale)
    }

    pub(crate) fn require_owner(&self) -> Result<OwnerId, CommandError> {
        self.owner.clone().ok_or(CommandError::OwnerNotSelected)
    }

    /// Switches the active owner and remembers it for the next session.
    pub(crate) fn select_owner(&mut self, owner: OwnerId) -> CommandResult {
        self.config.last_owner = Some(owner.as_str().to_string());
        self.owner = Some(owner);
        self.persist_config()
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Re-creates the store and services after a configuration change.
    pub(crate) fn rebuild_services(&mut self) -> CommandResult {
        self.services = Services::build(&self.config, &self.home, self.clock.clone())?;
        output::set_preferences(OutputPreferences {
            color_enabled: self.config.ui_color_enabled,
        });
        Ok(())
    }

    /// Prints `value` as pretty JSON on stdout.
    pub(crate) fn emit_json<T: Serialize>(&self, value: &T) -> CommandResult {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.get(command).map(|def| def.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    /// Tokenizes one input line and runs the command it names.
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        tracing::debug!(command = %command, owner = ?self.owner, "dispatching");
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, raw, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::OwnerNotSelected => {
                output::error("No owner selected.");
                output::hint("Use `owner <id>`, e.g. `owner 0244123456`.");
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No owner selected. Use `owner <id>` first.")]
    OwnerNotSelected,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(message) => CommandError::InvalidArguments(message),
            other => CommandError::Core(other),
        }
    }
}

/// Failures that stop the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
