use std::{path::PathBuf, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const PERIODS: [&str; 3] = ["daily", "weekly", "monthly"];

/// Upper bound for `history_months`, matching what the analytics engine accepts.
pub const MAX_HISTORY_MONTHS: u32 = 120;

/// Stores user-configurable preferences for the shell and the analytics it shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_owner: Option<String>,
    #[serde(default = "Config::default_budget_period_value")]
    pub default_budget_period: String,
    /// Share of a limit at which a budget counts as near its limit.
    #[serde(default = "Config::default_near_limit_ratio")]
    pub near_limit_ratio: Decimal,
    /// Relative change between months still reported as a stable trend.
    #[serde(default = "Config::default_trend_band")]
    pub trend_band: Decimal,
    /// Months before the current one shown by `history`.
    #[serde(default = "Config::default_history_months")]
    pub history_months: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for owner records. Defaults to `<home>/data`.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-GH".into(),
            currency: "GHS".into(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            last_owner: None,
            default_budget_period: Self::default_budget_period_value(),
            near_limit_ratio: Self::default_near_limit_ratio(),
            trend_band: Self::default_trend_band(),
            history_months: Self::default_history_months(),
            data_root: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 9] = [
        "locale",
        "currency",
        "ui_color_enabled",
        "last_owner",
        "default_budget_period",
        "near_limit_ratio",
        "trend_band",
        "history_months",
        "data_root",
    ];

    pub fn default_budget_period_value() -> String {
        "monthly".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_near_limit_ratio() -> Decimal {
        Decimal::new(8, 1)
    }

    pub fn default_trend_band() -> Decimal {
        Decimal::new(10, 2)
    }

    pub fn default_history_months() -> u32 {
        5
    }

    /// Directory holding owner records: `data_root` when set, else `<home>/data`.
    pub fn resolve_data_root(&self, home: &std::path::Path) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => home.join("data"),
        }
    }

    /// Current value of `key` rendered as text, `None` for an unset optional.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "locale" => Some(self.locale.clone()),
            "currency" => Some(self.currency.clone()),
            "ui_color_enabled" => Some(self.ui_color_enabled.to_string()),
            "last_owner" => self.last_owner.clone(),
            "default_budget_period" => Some(self.default_budget_period.clone()),
            "near_limit_ratio" => Some(self.near_limit_ratio.to_string()),
            "trend_band" => Some(self.trend_band.to_string()),
            "history_months" => Some(self.history_months.to_string()),
            "data_root" => self.data_root.as_ref().map(|p| p.display().to_string()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Parses and stores `value` under `key`. Optional keys are cleared by `none`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let raw = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };
        match key {
            "locale" => self.locale = non_empty(raw).ok_or_else(|| invalid("must not be empty"))?,
            "currency" => {
                let code = raw.to_ascii_uppercase();
                if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(invalid("expected a three-letter currency code"));
                }
                self.currency = code;
            }
            "ui_color_enabled" => {
                self.ui_color_enabled = match raw.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => return Err(invalid("expected true or false")),
                }
            }
            "last_owner" => self.last_owner = optional(raw),
            "default_budget_period" => {
                let period = raw.to_ascii_lowercase();
                if !PERIODS.contains(&period.as_str()) {
                    return Err(invalid("expected daily, weekly or monthly"));
                }
                self.default_budget_period = period;
            }
            "near_limit_ratio" => {
                let ratio = Decimal::from_str(raw).map_err(|_| invalid("not a number"))?;
                if ratio <= Decimal::ZERO || ratio > Decimal::ONE {
                    return Err(invalid("must be greater than 0 and at most 1"));
                }
                self.near_limit_ratio = ratio;
            }
            "trend_band" => {
                let band = Decimal::from_str(raw).map_err(|_| invalid("not a number"))?;
                if band < Decimal::ZERO || band >= Decimal::ONE {
                    return Err(invalid("must be at least 0 and below 1"));
                }
                self.trend_band = band;
            }
            "history_months" => {
                let months: u32 = raw.parse().map_err(|_| invalid("not a whole number"))?;
                if months > MAX_HISTORY_MONTHS {
                    return Err(invalid(&format!("at most {MAX_HISTORY_MONTHS} months")));
                }
                self.history_months = months;
            }
            "data_root" => self.data_root = optional(raw).map(PathBuf::from),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// Default application home: `~/.momo_budget`, or the working directory when
/// no home directory is known.
pub fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".momo_budget")
}

fn non_empty(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

fn optional(raw: &str) -> Option<String> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(raw.to_string())
    }
}
