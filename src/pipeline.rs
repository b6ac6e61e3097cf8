// ⚖️ Audit Engine - normalize, validate, correlate, aggregate
// Single-pass batch transformation over an immutable snapshot. Each stage
// is a pure function of the order's child collections; grouping is strictly
// per order key, so the batch partitions by order with no shared state.

use crate::commission::{CommissionValidator, ErrorTag};
use crate::correlation::{CorrelationChecker, RetroactiveCheck, ReturnCheck};
use crate::cross_source::{CrossSourceReconciler, CrossSourceRecord};
use crate::duplicates::{find_duplicates, DuplicateGroup};
use crate::model::{EventIndex, OrderView, SettlementSnapshot};
use crate::summary::{OrderSummary, SummaryBuilder};
use crate::taxonomy::EventType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// ROW-LEVEL RECORD
// ============================================================================

/// One reconciliation row per settlement event (orders without events get a
/// single `Desconhecido` row so nothing disappears from the output).
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    pub marketplace: String,
    pub order_number: String,
    pub sku_marketplace_id: Option<i64>,

    pub net_value: f64,
    pub settled_value: f64,

    pub event_type_raw: String,
    pub event_type: EventType,

    pub commission_percentage: Option<f64>,
    pub commission_date: Option<NaiveDate>,

    /// net_value * percentage, when a commission rule is known
    pub computed_commission: Option<f64>,

    pub event_date: Option<NaiveDate>,
    pub cycle_date: Option<NaiveDate>,

    /// Accumulated row-level error tags; never fatal
    pub errors: Vec<ErrorTag>,
}

impl ReconciliationRecord {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ============================================================================
// ENGINE OUTPUT
// ============================================================================

/// Everything the engine derives from one snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditOutput {
    /// Row-level records for table/detail views
    pub rows: Vec<ReconciliationRecord>,

    /// Per-order return-consistency checks (orders with both sides present)
    pub return_checks: Vec<ReturnCheck>,

    /// Per-order retroactive-deduction checks
    pub retro_checks: Vec<RetroactiveCheck>,

    /// One financial summary per order with settlement data
    pub summaries: Vec<OrderSummary>,

    /// Marketplace vs sales-ledger comparison rows
    pub cross_source: Vec<CrossSourceRecord>,

    /// Repeated (order, event type) pairs
    pub duplicates: Vec<DuplicateGroup>,
}

// ============================================================================
// AUDIT ENGINE
// ============================================================================

pub struct AuditEngine {
    pub commission_validator: CommissionValidator,
    pub summary_builder: SummaryBuilder,
}

impl AuditEngine {
    pub fn new() -> Self {
        AuditEngine {
            commission_validator: CommissionValidator::new(),
            summary_builder: SummaryBuilder::new(),
        }
    }

    /// Run the full reconciliation over one snapshot.
    ///
    /// Stages per order: index events by canonical type, emit one row per
    /// event with commission checks applied, run the correlation checks
    /// (a return mismatch tags every row of the order), build the financial
    /// summary, and compare against the sales ledger. A malformed row is
    /// classified `Desconhecido`/`Outros` and carried through; the batch
    /// never fails for one bad record.
    pub fn run(&self, snapshot: &SettlementSnapshot) -> AuditOutput {
        let views = snapshot.order_views();
        let mut output = AuditOutput::default();

        for view in &views {
            let index = EventIndex::build(&view.events);

            let row_start = output.rows.len();
            self.emit_rows(view, &mut output.rows);

            if let Some(check) = CorrelationChecker::check_return(view, &index) {
                if check.mismatch {
                    for row in &mut output.rows[row_start..] {
                        row.errors.push(ErrorTag::ErroDevolucao);
                    }
                }
                output.return_checks.push(check);
            }

            if let Some(check) = CorrelationChecker::check_retroactive(view, &index) {
                output.retro_checks.push(check);
            }

            if let Some(summary) = self.summary_builder.build(view, &index) {
                output.summaries.push(summary);
            }

            output
                .cross_source
                .extend(CrossSourceReconciler::check(view, &index));
        }

        output.duplicates = find_duplicates(&views);
        output
    }

    fn emit_rows(&self, view: &OrderView, rows: &mut Vec<ReconciliationRecord>) {
        let commission = view.primary_commission();
        let percentage = commission.and_then(|c| c.percentage);
        let commission_date = commission.and_then(|c| c.schedule_date);
        let computed_commission = percentage.map(|pct| view.order.net_value * pct);
        let sku_marketplace_id = view.links.first().map(|l| l.link.sku_marketplace_id);

        if view.events.is_empty() {
            // Join artifact: the order has no settlement data yet, but it
            // stays visible to the consumer
            rows.push(ReconciliationRecord {
                marketplace: view.order.marketplace.clone(),
                order_number: view.order.order_number.clone(),
                sku_marketplace_id,
                net_value: view.order.net_value,
                settled_value: 0.0,
                event_type_raw: String::new(),
                event_type: EventType::Desconhecido,
                commission_percentage: percentage,
                commission_date,
                computed_commission,
                event_date: None,
                cycle_date: None,
                errors: Vec::new(),
            });
            return;
        }

        for event in &view.events {
            let event_type = event.event_type();
            let errors = self.commission_validator.check(
                event_type,
                view.order.net_value,
                percentage,
                commission_date,
                event.settled_value,
            );

            rows.push(ReconciliationRecord {
                marketplace: view.order.marketplace.clone(),
                order_number: view.order.order_number.clone(),
                sku_marketplace_id,
                net_value: view.order.net_value,
                settled_value: event.settled_value,
                event_type_raw: event.event_type_raw.clone(),
                event_type,
                commission_percentage: percentage,
                commission_date,
                computed_commission,
                event_date: event.event_date,
                cycle_date: event.cycle_date,
                errors,
            });
        }
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
