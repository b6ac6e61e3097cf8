// 📈 Batch Report - headline numbers over one engine run
// The counts and sums the overview widgets display: totals, error
// distributions, expected vs received.

use crate::commission::ErrorTag;
use crate::cross_source::CrossSourceFlag;
use crate::pipeline::AuditOutput;
use crate::summary::FinalStatus;
use crate::taxonomy::EventType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub row_count: usize,
    pub rows_with_errors: usize,
    pub commission_error_count: usize,

    /// Distinct orders with a return mismatch
    pub return_error_orders: usize,

    /// Orders whose retroactive deductions sum to the full order value
    pub full_clawback_orders: usize,

    /// Sum of settled values over all rows
    pub settled_total: f64,

    pub order_count: usize,
    pub total_expected: f64,
    pub total_received: f64,

    /// total_expected - total_received
    pub total_gap: f64,

    pub missing_sale_count: usize,
    pub divergent_value_count: usize,
    pub duplicate_group_count: usize,

    /// Rows per canonical event type, keyed by label
    pub event_type_counts: BTreeMap<String, usize>,

    /// Error-tag occurrences across all rows, keyed by label
    pub error_tag_counts: BTreeMap<String, usize>,

    /// Summaries per final status, keyed by label
    pub status_counts: BTreeMap<String, usize>,
}

impl BatchReport {
    pub fn build(output: &AuditOutput) -> Self {
        let mut event_type_counts = BTreeMap::new();
        let mut error_tag_counts = BTreeMap::new();
        let mut status_counts = BTreeMap::new();

        for row in &output.rows {
            *event_type_counts
                .entry(row.event_type.label().to_string())
                .or_insert(0) += 1;
            for tag in &row.errors {
                *error_tag_counts.entry(tag.label().to_string()).or_insert(0) += 1;
            }
        }
        for summary in &output.summaries {
            *status_counts
                .entry(summary.final_status.label().to_string())
                .or_insert(0) += 1;
        }

        let commission_error_count = output
            .rows
            .iter()
            .filter(|row| row.errors.contains(&ErrorTag::ErroCalculoComissao))
            .count();

        let total_expected: f64 = output
            .summaries
            .iter()
            .map(|summary| summary.expected_receivable)
            .sum();
        let total_received: f64 = output.summaries.iter().map(|s| s.received).sum();

        let missing_sale_count = output
            .cross_source
            .iter()
            .filter(|record| record.flags.contains(&CrossSourceFlag::VendaNaoEncontrada))
            .count();
        let divergent_value_count = output
            .cross_source
            .iter()
            .filter(|record| record.flags.contains(&CrossSourceFlag::ValoresDivergentes))
            .count();

        BatchReport {
            row_count: output.rows.len(),
            rows_with_errors: output.rows.iter().filter(|row| row.has_errors()).count(),
            commission_error_count,
            return_error_orders: output
                .return_checks
                .iter()
                .filter(|check| check.mismatch)
                .count(),
            full_clawback_orders: output
                .retro_checks
                .iter()
                .filter(|check| check.full_clawback)
                .count(),
            settled_total: output.rows.iter().map(|row| row.settled_value).sum(),
            order_count: output.summaries.len(),
            total_expected,
            total_received,
            total_gap: total_expected - total_received,
            missing_sale_count,
            divergent_value_count,
            duplicate_group_count: output.duplicates.len(),
            event_type_counts,
            error_tag_counts,
            status_counts,
        }
    }

    /// Count of summaries with the given final status
    pub fn status_count(&self, status: FinalStatus) -> usize {
        self.status_counts.get(status.label()).copied().unwrap_or(0)
    }

    /// Count of rows with the given canonical event type
    pub fn event_type_count(&self, event_type: EventType) -> usize {
        self.event_type_counts
            .get(event_type.label())
            .copied()
            .unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows ({} with errors), {} orders, expected {:.2}, received {:.2}, gap {:.2}",
            self.row_count,
            self.rows_with_errors,
            self.order_count,
            self.total_expected,
            self.total_received,
            self.total_gap
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
