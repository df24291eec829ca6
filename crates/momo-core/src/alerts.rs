//! Alert evaluation: classifies budget summaries by how close spending is to
//! the limit. Alerts are recomputed on every read and never stored.

use rust_decimal::Decimal;

use momo_domain::{BudgetAlert, BudgetSummary, Severity};

use crate::CoreError;

/// Threshold configuration for alert classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    near_limit_ratio: Decimal,
}

impl AlertThresholds {
    pub const DEFAULT_NEAR_LIMIT_RATIO: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

    /// Builds thresholds with a custom near-limit ratio in `(0, 1]`.
    pub fn new(near_limit_ratio: Decimal) -> Result<Self, CoreError> {
        if near_limit_ratio <= Decimal::ZERO || near_limit_ratio > Decimal::ONE {
            return Err(CoreError::InvalidInput(format!(
                "near-limit ratio must be within (0, 1], got {near_limit_ratio}"
            )));
        }
        Ok(Self { near_limit_ratio })
    }

    pub fn near_limit_ratio(&self) -> Decimal {
        self.near_limit_ratio
    }

    /// Classifies `spent` against `limit`.
    ///
    /// A zero limit has no meaningful ratio: any spend is over the limit and
    /// no spend is fine.
    pub fn classify(&self, spent: Decimal, limit: Decimal) -> Severity {
        if spent > limit {
            Severity::OverLimit
        } else if limit > Decimal::ZERO && spent >= limit * self.near_limit_ratio {
            Severity::NearLimit
        } else {
            Severity::Ok
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            near_limit_ratio: Self::DEFAULT_NEAR_LIMIT_RATIO,
        }
    }
}

/// Evaluates every summary with the default thresholds.
pub fn evaluate(summaries: &[BudgetSummary]) -> Vec<BudgetAlert> {
    evaluate_with(summaries, &AlertThresholds::default())
}

/// One alert per summary, in input order.
pub fn evaluate_with(summaries: &[BudgetSummary], thresholds: &AlertThresholds) -> Vec<BudgetAlert> {
    summaries
        .iter()
        .map(|summary| BudgetAlert {
            budget_id: summary.budget.id,
            category: summary.budget.category,
            severity: thresholds.classify(summary.spent, summary.limit()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_ratio_is_eighty_percent() {
        assert_eq!(AlertThresholds::default().near_limit_ratio(), dec!(0.8));
    }

    #[test]
    fn classify_covers_each_band() {
        let thresholds = AlertThresholds::default();
        assert_eq!(thresholds.classify(dec!(79.99), dec!(100)), Severity::Ok);
        assert_eq!(thresholds.classify(dec!(80), dec!(100)), Severity::NearLimit);
        assert_eq!(thresholds.classify(dec!(85), dec!(100)), Severity::NearLimit);
        assert_eq!(thresholds.classify(dec!(100), dec!(100)), Severity::NearLimit);
        assert_eq!(thresholds.classify(dec!(100.01), dec!(100)), Severity::OverLimit);
    }

    #[test]
    fn zero_limit_is_ok_until_anything_is_spent() {
        let thresholds = AlertThresholds::default();
        assert_eq!(thresholds.classify(Decimal::ZERO, Decimal::ZERO), Severity::Ok);
        assert_eq!(thresholds.classify(dec!(0.01), Decimal::ZERO), Severity::OverLimit);
    }

    #[test]
    fn custom_ratio_moves_the_near_limit_band() {
        let thresholds = AlertThresholds::new(dec!(0.5)).unwrap();
        assert_eq!(thresholds.classify(dec!(50), dec!(100)), Severity::NearLimit);
        assert_eq!(thresholds.classify(dec!(49.99), dec!(100)), Severity::Ok);
    }

    #[test]
    fn rejects_out_of_range_ratios() {
        assert!(AlertThresholds::new(Decimal::ZERO).is_err());
        assert!(AlertThresholds::new(dec!(1.5)).is_err());
        assert!(AlertThresholds::new(Decimal::ONE).is_ok());
    }
}
