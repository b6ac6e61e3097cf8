// 💰 Commission Validator - per-row checks for standard settlements
// Verifies that each "Repasse Normal" event paid out the expected
// post-commission value, within a fixed currency tolerance.

use crate::model::{round2, round4};
use crate::taxonomy::EventType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ROW-LEVEL ERROR TAGS
// ============================================================================

/// Advisory error tags attached to a reconciliation row. Never fatal,
/// always accumulated into a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorTag {
    #[serde(rename = "Valor Final Negativo")]
    ValorFinalNegativo,

    #[serde(rename = "Falta de Comissão")]
    FaltaComissao,

    #[serde(rename = "Falta de Data de Comissão")]
    FaltaDataComissao,

    #[serde(rename = "Erro Cálculo Comissão")]
    ErroCalculoComissao,

    #[serde(rename = "Erro Devolução")]
    ErroDevolucao,
}

impl ErrorTag {
    /// All tags, in display order
    pub const ALL: [ErrorTag; 5] = [
        ErrorTag::ValorFinalNegativo,
        ErrorTag::FaltaComissao,
        ErrorTag::FaltaDataComissao,
        ErrorTag::ErroCalculoComissao,
        ErrorTag::ErroDevolucao,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ErrorTag::ValorFinalNegativo => "Valor Final Negativo",
            ErrorTag::FaltaComissao => "Falta de Comissão",
            ErrorTag::FaltaDataComissao => "Falta de Data de Comissão",
            ErrorTag::ErroCalculoComissao => "Erro Cálculo Comissão",
            ErrorTag::ErroDevolucao => "Erro Devolução",
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// COMMISSION VALIDATOR
// ============================================================================

pub struct CommissionValidator {
    /// Tolerance for the expected-vs-settled comparison (default: 0.05)
    pub tolerance: f64,
}

impl CommissionValidator {
    pub fn new() -> Self {
        CommissionValidator { tolerance: 0.05 }
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        CommissionValidator { tolerance }
    }

    /// Run every row-level check for one settlement event.
    ///
    /// Only `Repasse Normal` rows are checked; other event types return no
    /// tags. The checks are independent, so a single row can accumulate
    /// several tags. Missing inputs suppress the corresponding check rather
    /// than producing an error.
    pub fn check(
        &self,
        event_type: EventType,
        net_value: f64,
        percentage: Option<f64>,
        schedule_date: Option<NaiveDate>,
        settled_value: f64,
    ) -> Vec<ErrorTag> {
        if event_type != EventType::RepasseNormal {
            return Vec::new();
        }

        let mut errors = Vec::new();

        if settled_value < 0.0 {
            errors.push(ErrorTag::ValorFinalNegativo);
        }

        match percentage {
            None => errors.push(ErrorTag::FaltaComissao),
            Some(pct) if pct == 0.0 => errors.push(ErrorTag::FaltaComissao),
            Some(pct) => {
                if self.calculation_mismatch(net_value, pct, settled_value) {
                    errors.push(ErrorTag::ErroCalculoComissao);
                }
            }
        }

        if schedule_date.is_none() {
            errors.push(ErrorTag::FaltaDataComissao);
        }

        errors
    }

    /// expected_final = round2(net - net * pct); mismatch when it differs
    /// from the settled value by more than the tolerance
    fn calculation_mismatch(&self, net_value: f64, percentage: f64, settled_value: f64) -> bool {
        let net = round2(net_value);
        let settled = round2(settled_value);
        let pct = round4(percentage);

        let expected_final = round2(net - net * pct);
        (expected_final - settled).abs() > self.tolerance
    }

    /// Expected post-commission payout for display purposes
    pub fn expected_final(&self, net_value: f64, percentage: f64) -> f64 {
        let net = round2(net_value);
        round2(net - net * round4(percentage))
    }
}

impl Default for CommissionValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 1, 15)
    }

    #[test]
    fn test_exact_payout_passes() {
        let validator = CommissionValidator::new();
        let errors = validator.check(EventType::RepasseNormal, 100.0, Some(0.10), date(), 90.0);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_within_tolerance_passes() {
        let validator = CommissionValidator::new();
        // Expected 90.00, settled 89.96 -> diff 0.04, inside the tolerance
        let errors = validator.check(EventType::RepasseNormal, 100.0, Some(0.10), date(), 89.96);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_beyond_tolerance_fails() {
        let validator = CommissionValidator::new();
        // Expected 90.00, settled 89.94 -> diff 0.06 > 0.05
        let errors = validator.check(EventType::RepasseNormal, 100.0, Some(0.10), date(), 89.94);
        assert_eq!(errors, vec![ErrorTag::ErroCalculoComissao]);
    }

    #[test]
    fn test_missing_percentage_skips_numeric_check() {
        let validator = CommissionValidator::new();
        let errors = validator.check(EventType::RepasseNormal, 100.0, None, date(), 50.0);
        assert_eq!(errors, vec![ErrorTag::FaltaComissao]);
    }

    #[test]
    fn test_zero_percentage_means_missing_commission() {
        let validator = CommissionValidator::new();
        let errors = validator.check(EventType::RepasseNormal, 100.0, Some(0.0), date(), 100.0);
        assert_eq!(errors, vec![ErrorTag::FaltaComissao]);
    }

    #[test]
    fn test_negative_settled_value() {
        let validator = CommissionValidator::new();
        let errors = validator.check(EventType::RepasseNormal, 100.0, Some(0.10), date(), -90.0);
        assert!(errors.contains(&ErrorTag::ValorFinalNegativo));
        assert!(errors.contains(&ErrorTag::ErroCalculoComissao));
    }

    #[test]
    fn test_missing_schedule_date() {
        let validator = CommissionValidator::new();
        let errors = validator.check(EventType::RepasseNormal, 100.0, Some(0.10), None, 90.0);
        assert_eq!(errors, vec![ErrorTag::FaltaDataComissao]);
    }

    #[test]
    fn test_tags_accumulate_on_one_row() {
        let validator = CommissionValidator::new();
        let errors = validator.check(EventType::RepasseNormal, 100.0, None, None, -5.0);
        assert_eq!(
            errors,
            vec![
                ErrorTag::ValorFinalNegativo,
                ErrorTag::FaltaComissao,
                ErrorTag::FaltaDataComissao,
            ]
        );
    }

    #[test]
    fn test_other_event_types_not_checked() {
        let validator = CommissionValidator::new();
        let errors = validator.check(EventType::DescontarHove, 100.0, None, None, -100.0);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_percentage_rounded_to_four_places() {
        let validator = CommissionValidator::new();
        // 0.12004 rounds to 0.12 -> expected 88.00
        let errors = validator.check(EventType::RepasseNormal, 100.0, Some(0.120_04), date(), 88.0);
        assert!(errors.is_empty());
    }
}
