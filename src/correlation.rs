// 🔗 Event-Correlation Checker - per-order cross-checks
// Correlates multi-event sequences within one order: the return deduction
// against the original payout, and the sum of retroactive deductions
// against the order value. Both checks read from the canonical-type index,
// so results do not depend on row order.

use crate::model::{round2, EventIndex, OrderView};
use crate::taxonomy::EventType;
use serde::{Deserialize, Serialize};

// ============================================================================
// CHECK RECORDS
// ============================================================================

/// Return-consistency result for one order that has both a "Repasse Normal"
/// and a "Descontar Hove/Houve" event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnCheck {
    pub marketplace: String,
    pub order_number: String,

    /// Net value taken from the order's standard settlement
    pub net_value: f64,

    /// Settled value of the return deduction (largest magnitude when the
    /// order carries more than one)
    pub returned_value: f64,

    /// True when the absolute values disagree after rounding
    pub mismatch: bool,
}

/// Retroactive-deduction result for one order with at least one
/// "Descontar Retroativo" event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetroactiveCheck {
    pub marketplace: String,
    pub order_number: String,
    pub net_value: f64,

    /// Sum of settled values over all retroactive deductions
    pub retro_sum: f64,

    /// net_value + retro_sum; zero when the clawback exactly offsets the
    /// order value
    pub difference: f64,

    /// True when the deductions sum to the full order value
    pub full_clawback: bool,
}

// ============================================================================
// CORRELATION CHECKER
// ============================================================================

pub struct CorrelationChecker;

impl CorrelationChecker {
    /// Compare the order's net value against its return deduction.
    ///
    /// Inconclusive (returns None) unless the order has both a standard
    /// settlement and a return event; absence of either side is not an
    /// error. With several return events, any mismatching one flags the
    /// order, which keeps the result stable under row reordering.
    pub fn check_return(view: &OrderView, index: &EventIndex) -> Option<ReturnCheck> {
        if !index.has(EventType::RepasseNormal) || !index.has(EventType::DescontarHove) {
            return None;
        }

        let net_value = view.order.net_value;
        let mismatch = index
            .of(EventType::DescontarHove)
            .iter()
            .any(|event| round2(event.settled_value.abs()) != round2(net_value.abs()));

        let returned_value = index
            .max_abs_settled(EventType::DescontarHove)
            .unwrap_or(0.0);

        Some(ReturnCheck {
            marketplace: view.order.marketplace.clone(),
            order_number: view.order.order_number.clone(),
            net_value,
            returned_value,
            mismatch,
        })
    }

    /// Sum all retroactive deductions and compare against the order value.
    ///
    /// A sum that exactly offsets a nonzero order value signals the whole
    /// payout was clawed back retroactively. Surfaced as an anomaly, not
    /// merged into row-level error tags.
    pub fn check_retroactive(view: &OrderView, index: &EventIndex) -> Option<RetroactiveCheck> {
        if !index.has(EventType::DescontarRetroativo) {
            return None;
        }

        let net_value = view.order.net_value;
        let retro_sum = index.settled_sum(EventType::DescontarRetroativo);

        let full_clawback = round2(retro_sum.abs()) == round2(net_value.abs())
            && round2(net_value) != 0.0;

        Some(RetroactiveCheck {
            marketplace: view.order.marketplace.clone(),
            order_number: view.order.order_number.clone(),
            net_value,
            retro_sum,
            difference: net_value + retro_sum,
            full_clawback,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderView, SettlementEvent};

    fn order(net: f64) -> Order {
        Order {
            marketplace: "Centauro".to_string(),
            order_number: "PED-77".to_string(),
            net_value: net,
            order_date: None,
        }
    }

    fn event(raw: &str, settled: f64) -> SettlementEvent {
        SettlementEvent {
            order_number: "PED-77".to_string(),
            event_type_raw: raw.to_string(),
            settled_value: settled,
            event_date: None,
            cycle_date: None,
        }
    }

    fn view_of<'a>(order: &'a Order, events: &'a [SettlementEvent]) -> OrderView<'a> {
        OrderView {
            order,
            links: Vec::new(),
            events: events.iter().collect(),
        }
    }

    #[test]
    fn test_return_values_match() {
        let order = order(100.0);
        let events = vec![
            event("Repasse Normal", 88.0),
            event("Descontar Houve", -100.0),
        ];
        let view = view_of(&order, &events);
        let index = EventIndex::build(&view.events);

        let check = CorrelationChecker::check_return(&view, &index).unwrap();
        assert!(!check.mismatch);
        assert_eq!(check.returned_value, -100.0);
    }

    #[test]
    fn test_return_values_mismatch() {
        let order = order(100.0);
        let events = vec![
            event("Repasse Normal", 88.0),
            event("Descontar Hove", -95.0),
        ];
        let view = view_of(&order, &events);
        let index = EventIndex::build(&view.events);

        let check = CorrelationChecker::check_return(&view, &index).unwrap();
        assert!(check.mismatch);
    }

    #[test]
    fn test_return_inconclusive_without_both_sides() {
        let order = order(100.0);

        let only_return = vec![event("Descontar Houve", -100.0)];
        let view = view_of(&order, &only_return);
        let index = EventIndex::build(&view.events);
        assert!(CorrelationChecker::check_return(&view, &index).is_none());

        let only_payout = vec![event("Repasse Normal", 88.0)];
        let view = view_of(&order, &only_payout);
        let index = EventIndex::build(&view.events);
        assert!(CorrelationChecker::check_return(&view, &index).is_none());
    }

    #[test]
    fn test_return_stable_under_reordering() {
        let order = order(100.0);
        let mut events = vec![
            event("Repasse Normal", 88.0),
            event("Descontar Houve", -100.0),
            event("Descontar Hove", -95.0),
        ];

        let view = view_of(&order, &events);
        let index = EventIndex::build(&view.events);
        let forward = CorrelationChecker::check_return(&view, &index).unwrap();

        events.reverse();
        let view = view_of(&order, &events);
        let index = EventIndex::build(&view.events);
        let reversed = CorrelationChecker::check_return(&view, &index).unwrap();

        assert_eq!(forward.mismatch, reversed.mismatch);
        assert_eq!(forward.returned_value, reversed.returned_value);
        assert!(forward.mismatch);
    }

    #[test]
    fn test_retroactive_full_clawback() {
        let order = order(50.0);
        let events = vec![
            event("Descontar Retroativo", -25.0),
            event("Descontar - Retroativo", -25.0),
        ];
        let view = view_of(&order, &events);
        let index = EventIndex::build(&view.events);

        let check = CorrelationChecker::check_retroactive(&view, &index).unwrap();
        assert_eq!(check.retro_sum, -50.0);
        assert_eq!(check.difference, 0.0);
        assert!(check.full_clawback);
    }

    #[test]
    fn test_retroactive_partial_clawback_not_flagged() {
        let order = order(50.0);
        let events = vec![event("Descontar Retroativo", -20.0)];
        let view = view_of(&order, &events);
        let index = EventIndex::build(&view.events);

        let check = CorrelationChecker::check_retroactive(&view, &index).unwrap();
        assert!(!check.full_clawback);
        assert_eq!(check.difference, 30.0);
    }

    #[test]
    fn test_retroactive_zero_net_not_flagged() {
        let order = order(0.0);
        let events = vec![event("Descontar Retroativo", 0.0)];
        let view = view_of(&order, &events);
        let index = EventIndex::build(&view.events);

        let check = CorrelationChecker::check_retroactive(&view, &index).unwrap();
        assert!(!check.full_clawback);
    }

    #[test]
    fn test_retroactive_absent_is_none() {
        let order = order(50.0);
        let events = vec![event("Repasse Normal", 44.0)];
        let view = view_of(&order, &events);
        let index = EventIndex::build(&view.events);

        assert!(CorrelationChecker::check_retroactive(&view, &index).is_none());
    }
}
