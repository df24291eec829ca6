//! Shared traits and closed enumerations for spending records.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Ties a record to the user who exclusively owns it.
pub trait Owned {
    fn owner_id(&self) -> &OwnerId;

    fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner_id() == owner
    }
}

/// Opaque identifier of an authenticated user, supplied by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wraps a raw identifier. Surrounding whitespace is dropped; empty ids are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseValueError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseValueError::new("owner id", raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raised when a raw string is not a valid owner id or enum member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseValueError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for ParseValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: `{}`", self.kind, self.value)
    }
}

impl std::error::Error for ParseValueError {}

/// Spending purpose. Budgets and totals are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Airtime,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Transport,
        Category::Airtime,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Airtime => "Airtime",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "transport" => Ok(Category::Transport),
            "airtime" => Ok(Category::Airtime),
            "other" => Ok(Category::Other),
            _ => Err(ParseValueError::new("category", value)),
        }
    }
}

/// Mobile-money network the payment went through. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    #[serde(rename = "MTN")]
    Mtn,
    AirtelTigo,
    Telecel,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Mtn, Service::AirtelTigo, Service::Telecel];

    pub fn as_str(self) -> &'static str {
        match self {
            Service::Mtn => "MTN",
            Service::AirtelTigo => "AirtelTigo",
            Service::Telecel => "Telecel",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mtn" => Ok(Service::Mtn),
            "airteltigo" => Ok(Service::AirtelTigo),
            "telecel" => Ok(Service::Telecel),
            _ => Err(ParseValueError::new("service", value)),
        }
    }
}

/// Enumerates canonical budgeting cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl BudgetPeriod {
    pub const ALL: [BudgetPeriod; 3] = [
        BudgetPeriod::Daily,
        BudgetPeriod::Weekly,
        BudgetPeriod::Monthly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BudgetPeriod::Daily => "daily",
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(BudgetPeriod::Daily),
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            _ => Err(ParseValueError::new("period", value)),
        }
    }
}
