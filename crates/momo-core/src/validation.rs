//! Turns raw, user-supplied field values into validated domain values.
//!
//! Everything here fails with [`CoreError::InvalidInput`] before any record is
//! read or written.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use momo_domain::{Amount, BudgetChanges, BudgetPeriod, Category, Service, TransactionChanges};

use crate::CoreError;

/// Raw input for a new transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    pub amount: String,
    pub category: String,
    pub service: String,
    pub notes: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`. Defaults to the creation time.
    pub date: Option<String>,
}

/// Raw field updates for an existing transaction. `notes: Some("")` clears the notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub service: Option<String>,
    pub notes: Option<String>,
    pub date: Option<String>,
}

/// Raw input for setting a category budget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetDraft {
    pub category: String,
    pub limit: String,
    /// Falls back to the service's default period when absent.
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetPatch {
    pub category: Option<String>,
    pub limit: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidTransaction {
    pub amount: Amount,
    pub category: Category,
    pub service: Service,
    pub notes: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidBudget {
    pub category: Category,
    pub limit: Amount,
    pub period: Option<BudgetPeriod>,
}

pub fn transaction_draft(draft: &TransactionDraft) -> Result<ValidTransaction, CoreError> {
    Ok(ValidTransaction {
        amount: amount(&draft.amount)?,
        category: draft.category.parse()?,
        service: draft.service.parse()?,
        notes: draft.notes.as_deref().and_then(clean_notes),
        date: draft.date.as_deref().map(timestamp).transpose()?,
    })
}

pub fn transaction_patch(patch: &TransactionPatch) -> Result<TransactionChanges, CoreError> {
    let changes = TransactionChanges {
        amount: patch.amount.as_deref().map(amount).transpose()?,
        category: patch.category.as_deref().map(str::parse).transpose()?,
        service: patch.service.as_deref().map(str::parse).transpose()?,
        notes: patch.notes.as_deref().map(clean_notes),
        date: patch.date.as_deref().map(timestamp).transpose()?,
    };
    if changes.is_empty() {
        return Err(CoreError::InvalidInput("no fields to update".into()));
    }
    Ok(changes)
}

pub fn budget_draft(draft: &BudgetDraft) -> Result<ValidBudget, CoreError> {
    Ok(ValidBudget {
        category: draft.category.parse()?,
        limit: amount(&draft.limit)?,
        period: draft.period.as_deref().map(str::parse).transpose()?,
    })
}

pub fn budget_patch(patch: &BudgetPatch) -> Result<BudgetChanges, CoreError> {
    let changes = BudgetChanges {
        category: patch.category.as_deref().map(str::parse).transpose()?,
        limit: patch.limit.as_deref().map(amount).transpose()?,
        period: patch.period.as_deref().map(str::parse).transpose()?,
    };
    if changes.category.is_none() && changes.limit.is_none() && changes.period.is_none() {
        return Err(CoreError::InvalidInput("no fields to update".into()));
    }
    Ok(changes)
}

/// Parses an amount, tolerating a leading currency code such as `GHS 12.50`.
pub fn amount(raw: &str) -> Result<Amount, CoreError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("GHS")
        .or_else(|| trimmed.strip_prefix("ghs"))
        .unwrap_or(trimmed)
        .trim();
    Ok(Amount::parse(digits)?)
}

/// Accepts RFC 3339 timestamps or plain dates, which are taken as UTC midnight.
pub fn timestamp(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| DateTime::from_naive_utc_and_offset(date.and_time(NaiveTime::default()), Utc))
        .map_err(|_| {
            CoreError::InvalidInput(format!(
                "invalid date `{trimmed}`; expected YYYY-MM-DD or an RFC 3339 timestamp"
            ))
        })
}

/// Exclusive end of a listing range. A plain date covers that whole day, so
/// the result is the following UTC midnight; timestamps are used as given.
pub fn range_end(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    let trimmed = raw.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date
            .succ_opt()
            .map(|next| DateTime::from_naive_utc_and_offset(next.and_time(NaiveTime::default()), Utc))
            .ok_or_else(|| CoreError::InvalidInput(format!("date `{trimmed}` is out of range"))),
        Err(_) => timestamp(trimmed),
    }
}

fn clean_notes(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn draft(amount: &str, category: &str, service: &str) -> TransactionDraft {
        TransactionDraft {
            amount: amount.into(),
            category: category.into(),
            service: service.into(),
            ..TransactionDraft::default()
        }
    }

    #[test]
    fn accepts_well_formed_transactions() {
        let mut input = draft("GHS 25.5", "food", "mtn");
        input.notes = Some("  Lunch  ".into());
        input.date = Some("2025-03-04".into());
        let valid = transaction_draft(&input).unwrap();
        assert_eq!(valid.amount.value(), dec!(25.50));
        assert_eq!(valid.category, Category::Food);
        assert_eq!(valid.service, Service::Mtn);
        assert_eq!(valid.notes.as_deref(), Some("Lunch"));
        assert_eq!(
            valid.date,
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_bad_fields() {
        for input in [
            draft("-5", "Food", "MTN"),
            draft("abc", "Food", "MTN"),
            draft("1.005", "Food", "MTN"),
            draft("10", "Groceries", "MTN"),
            draft("10", "Food", "Vodafone"),
        ] {
            assert!(
                matches!(transaction_draft(&input), Err(CoreError::InvalidInput(_))),
                "{input:?} should be rejected"
            );
        }
        let mut dated = draft("10", "Food", "MTN");
        dated.date = Some("04/03/2025".into());
        assert!(transaction_draft(&dated).is_err());
    }

    #[test]
    fn rfc3339_offsets_convert_to_utc() {
        let parsed = timestamp("2025-03-01T01:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 2, 28, 23, 30, 0).unwrap());
    }

    #[test]
    fn plain_end_dates_include_the_whole_day() {
        assert_eq!(
            range_end("2025-03-31").unwrap(),
            Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            range_end("2025-03-31T12:00:00Z").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap()
        );
        assert!(range_end("31/03/2025").is_err());
    }

    #[test]
    fn empty_notes_in_a_patch_clear_them() {
        let patch = TransactionPatch {
            notes: Some(" ".into()),
            ..TransactionPatch::default()
        };
        assert_eq!(transaction_patch(&patch).unwrap().notes, Some(None));
        assert!(transaction_patch(&TransactionPatch::default()).is_err());
    }

    #[test]
    fn budget_period_is_optional() {
        let valid = budget_draft(&BudgetDraft {
            category: "Transport".into(),
            limit: "300".into(),
            period: None,
        })
        .unwrap();
        assert_eq!(valid.period, None);
        assert!(budget_draft(&BudgetDraft {
            category: "Transport".into(),
            limit: "300".into(),
            period: Some("yearly".into()),
        })
        .is_err());
    }
}
