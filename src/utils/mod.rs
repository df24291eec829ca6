pub mod build_info;

use std::{env, path::PathBuf, sync::Once};

use chrono::{DateTime, Utc};

use crate::errors::AppError;

pub const HOME_ENV: &str = "MOMO_BUDGET_HOME";
pub const OWNER_ENV: &str = "MOMO_BUDGET_OWNER";
pub const NOW_ENV: &str = "MOMO_BUDGET_NOW";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("momo_budget=info"));

        // A subscriber installed by the host process wins.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Application home: `$MOMO_BUDGET_HOME` when set, else `~/.momo_budget`.
pub fn app_home() -> PathBuf {
    env::var_os(HOME_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(momo_config::default_home)
}

/// Reference instant override from `$MOMO_BUDGET_NOW` (RFC 3339).
pub fn reference_override() -> Result<Option<DateTime<Utc>>, AppError> {
    match env::var(NOW_ENV) {
        Ok(raw) if !raw.trim().is_empty() => DateTime::parse_from_rfc3339(raw.trim())
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|err| AppError::Environment(format!("{NOW_ENV}=`{raw}`: {err}"))),
        _ => Ok(None),
    }
}
