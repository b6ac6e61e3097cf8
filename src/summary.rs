// 📊 Order Aggregator - one financial summary per order
// Collapses every event of a (marketplace, order_number) group into a
// single record with expected vs received values and a resolved status.

use crate::model::{round2, EventIndex, OrderView};
use crate::taxonomy::EventType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// STATUS TYPES
// ============================================================================

/// Payment classification from the received-vs-expected gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "pago")]
    Pago,

    #[serde(rename = "pago a maior")]
    PagoAMaior,

    #[serde(rename = "pago a menor")]
    PagoAMenor,

    #[serde(rename = "nao pago")]
    NaoPago,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pago => "pago",
            PaymentStatus::PagoAMaior => "pago a maior",
            PaymentStatus::PagoAMenor => "pago a menor",
            PaymentStatus::NaoPago => "nao pago",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Final per-order classification, resolved with explicit precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinalStatus {
    #[serde(rename = "Correta")]
    Correta,

    #[serde(rename = "Erro Devolução")]
    ErroDevolucao,

    #[serde(rename = "pago")]
    Pago,

    #[serde(rename = "pago a maior")]
    PagoAMaior,

    #[serde(rename = "pago a menor")]
    PagoAMenor,

    #[serde(rename = "nao pago")]
    NaoPago,
}

impl FinalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FinalStatus::Correta => "Correta",
            FinalStatus::ErroDevolucao => "Erro Devolução",
            FinalStatus::Pago => "pago",
            FinalStatus::PagoAMaior => "pago a maior",
            FinalStatus::PagoAMenor => "pago a menor",
            FinalStatus::NaoPago => "nao pago",
        }
    }
}

impl From<PaymentStatus> for FinalStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pago => FinalStatus::Pago,
            PaymentStatus::PagoAMaior => FinalStatus::PagoAMaior,
            PaymentStatus::PagoAMenor => FinalStatus::PagoAMenor,
            PaymentStatus::NaoPago => FinalStatus::NaoPago,
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// ORDER SUMMARY
// ============================================================================

/// Aggregated financial view of one order; read-only engine output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub marketplace: String,
    pub order_number: String,

    /// Minimum event date across the group; absent when no event has a date
    pub order_date: Option<NaiveDate>,

    pub product_total: f64,
    pub expected_commission: f64,
    pub expected_receivable: f64,
    pub received: f64,
    pub payment_gap: f64,
    pub payment_status: PaymentStatus,

    /// Return deduction plus sum of retroactive deductions
    pub deducted_total: f64,

    /// Sum of freight charge-back deductions
    pub freight_deduction: f64,

    pub return_error: bool,
    pub final_status: FinalStatus,
}

impl OrderSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} {}: total {:.2}, expected {:.2}, received {:.2}, gap {:.2} -> {}",
            self.marketplace,
            self.order_number,
            self.product_total,
            self.expected_receivable,
            self.received,
            self.payment_gap,
            self.final_status
        )
    }
}

// ============================================================================
// SUMMARY BUILDER
// ============================================================================

pub struct SummaryBuilder {
    /// Tolerance for the payment-status gap (default: 0.05)
    pub payment_tolerance: f64,

    /// Stricter tolerance under which an order counts as fully correct
    /// (default: 0.01)
    pub correct_tolerance: f64,
}

impl SummaryBuilder {
    pub fn new() -> Self {
        SummaryBuilder {
            payment_tolerance: 0.05,
            correct_tolerance: 0.01,
        }
    }

    pub fn with_tolerances(payment_tolerance: f64, correct_tolerance: f64) -> Self {
        SummaryBuilder {
            payment_tolerance,
            correct_tolerance,
        }
    }

    /// Build the summary for one order group.
    ///
    /// Returns None when the product total is zero: such groups are join
    /// artifacts with no real settlement data and are excluded from the
    /// summary output.
    pub fn build(&self, view: &OrderView, index: &EventIndex) -> Option<OrderSummary> {
        // Ledger value when a sale record exists, otherwise the order's own
        // marketplace-reported value
        let product_total = view.sale_value().unwrap_or(view.order.net_value);
        if product_total == 0.0 {
            return None;
        }

        let expected_commission = view
            .computed_commissions()
            .into_iter()
            .fold(None, |acc: Option<f64>, value| {
                Some(match acc {
                    Some(current) if current >= value => current,
                    _ => value,
                })
            })
            .unwrap_or(0.0);

        let expected_receivable = product_total - expected_commission;
        let received = index.max_settled(EventType::RepasseNormal).unwrap_or(0.0);
        let payment_gap = received - expected_receivable;

        let payment_status = if payment_gap.abs() < self.payment_tolerance {
            PaymentStatus::Pago
        } else if payment_gap > 0.0 {
            PaymentStatus::PagoAMaior
        } else if received > 0.0 {
            PaymentStatus::PagoAMenor
        } else {
            PaymentStatus::NaoPago
        };

        let hove_value = index.max_settled(EventType::DescontarHove).unwrap_or(0.0);
        let retro_sum = index.settled_sum(EventType::DescontarRetroativo);
        let deducted_total = hove_value + retro_sum;
        let freight_deduction = index.settled_sum(EventType::ReversaCentauroEnvios);

        let return_error = round2(hove_value).abs() > 0.0
            && round2(hove_value.abs()) != round2(product_total.abs());

        // Precedence: fully correct > return error > payment status
        let final_status = if payment_gap.abs() < self.correct_tolerance && !return_error {
            FinalStatus::Correta
        } else if return_error {
            FinalStatus::ErroDevolucao
        } else {
            payment_status.into()
        };

        Some(OrderSummary {
            marketplace: view.order.marketplace.clone(),
            order_number: view.order.order_number.clone(),
            order_date: view.earliest_event_date(),
            product_total,
            expected_commission,
            expected_receivable,
            received,
            payment_gap,
            payment_status,
            deducted_total,
            freight_deduction,
            return_error,
            final_status,
        })
    }
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
