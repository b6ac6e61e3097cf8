// 📦 Data Model - settlement snapshot and per-order views
// Input collections arrive as complete, immutable snapshots; the engine
// never writes back. The one-to-many structure (Order → SkuLink →
// {commission?, sale?} plus order-level events) is made explicit here so
// every aggregate runs over real child collections instead of a join
// cross-product.

use crate::taxonomy::EventType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// ROUNDING
// ============================================================================

/// Round a currency amount to 2 decimal places.
///
/// All currency comparisons in the engine happen after this rounding, to
/// absorb floating-point noise from the source exports.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round a commission percentage to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// ============================================================================
// INPUT RECORDS
// ============================================================================

/// Marketplace order, identified by (marketplace, order_number)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub marketplace: String,
    pub order_number: String,

    /// Net product value before commission, as reported by the marketplace
    pub net_value: f64,

    pub order_date: Option<NaiveDate>,
}

/// Link between an order and its marketplace-specific settlement identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuLink {
    pub sku_marketplace_id: i64,
    pub order_number: String,
}

/// Commission rule scoped to one sku link; absence means "rule unknown"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionSchedule {
    pub sku_marketplace_id: i64,

    /// Fraction in [0, 1], e.g. 0.12 for 12%
    pub percentage: Option<f64>,

    pub schedule_date: Option<NaiveDate>,
}

/// One settlement event as stated by the marketplace (payout or deduction)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementEvent {
    pub order_number: String,

    /// Free-text event label as exported; empty means absent
    #[serde(default)]
    pub event_type_raw: String,

    /// Signed settled amount for this event
    #[serde(default)]
    pub settled_value: f64,

    pub event_date: Option<NaiveDate>,
    pub cycle_date: Option<NaiveDate>,
}

impl SettlementEvent {
    pub fn event_type(&self) -> EventType {
        EventType::normalize(&self.event_type_raw)
    }
}

/// Independent record of the order's net value from the seller's own ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub sku_marketplace_id: i64,
    pub sale_net_value: f64,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Complete input snapshot, loaded before any rule executes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementSnapshot {
    pub orders: Vec<Order>,
    pub sku_links: Vec<SkuLink>,
    pub commission_schedules: Vec<CommissionSchedule>,
    pub settlement_events: Vec<SettlementEvent>,
    pub sale_records: Vec<SaleRecord>,
}

impl SettlementSnapshot {
    /// Assemble one view per order, resolving the one-to-many relations.
    ///
    /// Views come back sorted by (marketplace, order_number) so downstream
    /// outputs are deterministic regardless of input row order. If the
    /// orders collection carries duplicate keys, the first occurrence wins.
    pub fn order_views(&self) -> Vec<OrderView<'_>> {
        let mut commissions: HashMap<i64, &CommissionSchedule> = HashMap::new();
        for schedule in &self.commission_schedules {
            commissions.entry(schedule.sku_marketplace_id).or_insert(schedule);
        }

        let mut sales: HashMap<i64, &SaleRecord> = HashMap::new();
        for sale in &self.sale_records {
            sales.entry(sale.sku_marketplace_id).or_insert(sale);
        }

        let mut links_by_order: HashMap<&str, Vec<&SkuLink>> = HashMap::new();
        for link in &self.sku_links {
            links_by_order
                .entry(link.order_number.as_str())
                .or_default()
                .push(link);
        }

        let mut events_by_order: HashMap<&str, Vec<&SettlementEvent>> = HashMap::new();
        for event in &self.settlement_events {
            events_by_order
                .entry(event.order_number.as_str())
                .or_default()
                .push(event);
        }

        let mut seen: HashMap<(&str, &str), ()> = HashMap::new();
        let mut views = Vec::new();
        for order in &self.orders {
            let key = (order.marketplace.as_str(), order.order_number.as_str());
            if seen.insert(key, ()).is_some() {
                continue;
            }

            let links = links_by_order
                .get(order.order_number.as_str())
                .map(|links| {
                    links
                        .iter()
                        .copied()
                        .map(|link| LinkView {
                            link,
                            commission: commissions.get(&link.sku_marketplace_id).copied(),
                            sale: sales.get(&link.sku_marketplace_id).copied(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            let events = events_by_order
                .get(order.order_number.as_str())
                .cloned()
                .unwrap_or_default();

            views.push(OrderView { order, links, events });
        }

        views.sort_by(|a, b| {
            (&a.order.marketplace, &a.order.order_number)
                .cmp(&(&b.order.marketplace, &b.order.order_number))
        });
        views
    }
}

// ============================================================================
// ORDER VIEWS
// ============================================================================

/// One sku link with its resolved commission rule and sale record
#[derive(Debug, Clone)]
pub struct LinkView<'a> {
    pub link: &'a SkuLink,
    pub commission: Option<&'a CommissionSchedule>,
    pub sale: Option<&'a SaleRecord>,
}

/// One order with all child collections resolved
#[derive(Debug, Clone)]
pub struct OrderView<'a> {
    pub order: &'a Order,
    pub links: Vec<LinkView<'a>>,
    pub events: Vec<&'a SettlementEvent>,
}

impl<'a> OrderView<'a> {
    /// Sales-ledger value for this order, if any sku link has a sale record.
    /// When several links carry sales, the largest value wins (duplicate
    /// guard, same role the source's max-over-group played).
    pub fn sale_value(&self) -> Option<f64> {
        self.links
            .iter()
            .filter_map(|link| link.sale.map(|sale| sale.sale_net_value))
            .fold(None, |acc, value| {
                Some(match acc {
                    Some(current) if current >= value => current,
                    _ => value,
                })
            })
    }

    /// First sku link carrying a commission schedule entry
    pub fn primary_commission(&self) -> Option<&'a CommissionSchedule> {
        self.links.iter().find_map(|link| link.commission)
    }

    /// Commission values computed per link: net_value * percentage
    pub fn computed_commissions(&self) -> Vec<f64> {
        self.links
            .iter()
            .filter_map(|link| link.commission.and_then(|c| c.percentage))
            .map(|percentage| self.order.net_value * percentage)
            .collect()
    }

    /// Minimum event date across the order's events, ignoring absent dates
    pub fn earliest_event_date(&self) -> Option<NaiveDate> {
        self.events.iter().filter_map(|event| event.event_date).min()
    }
}

// ============================================================================
// EVENT INDEX
// ============================================================================

/// Settlement events of one order, indexed by canonical type.
///
/// Correlation and aggregation rules read from this index so their results
/// are pure functions of the unordered multiset of events.
#[derive(Debug, Default)]
pub struct EventIndex<'a> {
    by_type: HashMap<EventType, Vec<&'a SettlementEvent>>,
}

impl<'a> EventIndex<'a> {
    pub fn build(events: &[&'a SettlementEvent]) -> Self {
        let mut by_type: HashMap<EventType, Vec<&'a SettlementEvent>> = HashMap::new();
        for &event in events {
            by_type.entry(event.event_type()).or_default().push(event);
        }
        EventIndex { by_type }
    }

    pub fn of(&self, event_type: EventType) -> &[&'a SettlementEvent] {
        self.by_type
            .get(&event_type)
            .map(|events| events.as_slice())
            .unwrap_or(&[])
    }

    pub fn has(&self, event_type: EventType) -> bool {
        !self.of(event_type).is_empty()
    }

    /// Sum of settled values over all events of the given type
    pub fn settled_sum(&self, event_type: EventType) -> f64 {
        self.of(event_type)
            .iter()
            .map(|event| event.settled_value)
            .sum()
    }

    /// Maximum settled value over events of the given type (duplicate guard)
    pub fn max_settled(&self, event_type: EventType) -> Option<f64> {
        self.of(event_type)
            .iter()
            .map(|event| event.settled_value)
            .fold(None, |acc, value| {
                Some(match acc {
                    Some(current) if current >= value => current,
                    _ => value,
                })
            })
    }

    /// Settled value with the greatest absolute magnitude, for display in
    /// per-order check records
    pub fn max_abs_settled(&self, event_type: EventType) -> Option<f64> {
        self.of(event_type)
            .iter()
            .map(|event| event.settled_value)
            .fold(None, |acc: Option<f64>, value| {
                Some(match acc {
                    Some(current) if current.abs() >= value.abs() => current,
                    _ => value,
                })
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn event(order: &str, raw: &str, settled: f64) -> SettlementEvent {
        SettlementEvent {
            order_number: order.to_string(),
            event_type_raw: raw.to_string(),
            settled_value: settled,
            event_date: None,
            cycle_date: None,
        }
    }

    fn snapshot_one_order() -> SettlementSnapshot {
        SettlementSnapshot {
            orders: vec![Order {
                marketplace: "Centauro".to_string(),
                order_number: "PED-1".to_string(),
                net_value: 100.0,
                order_date: None,
            }],
            sku_links: vec![SkuLink {
                sku_marketplace_id: 10,
                order_number: "PED-1".to_string(),
            }],
            commission_schedules: vec![CommissionSchedule {
                sku_marketplace_id: 10,
                percentage: Some(0.25),
                schedule_date: NaiveDate::from_ymd_opt(2025, 1, 10),
            }],
            settlement_events: vec![
                event("PED-1", "Repasse Normal", 88.0),
                event("PED-1", "Descontar Retroativo", -20.0),
                event("PED-1", "Descontar - Retroativo", -30.0),
            ],
            sale_records: vec![SaleRecord {
                sku_marketplace_id: 10,
                sale_net_value: 100.0,
            }],
        }
    }

    #[test]
    fn test_round2_round4() {
        assert_eq!(round2(89.955), 89.96);
        assert_eq!(round2(100.004), 100.0);
        assert_eq!(round4(0.12345), 0.1235);
        assert_eq!(round4(0.12), 0.12);
    }

    #[test]
    fn test_order_view_resolves_relations() {
        let snapshot = snapshot_one_order();
        let views = snapshot.order_views();

        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert_eq!(view.links.len(), 1);
        assert!(view.links[0].commission.is_some());
        assert!(view.links[0].sale.is_some());
        assert_eq!(view.events.len(), 3);
        assert_eq!(view.sale_value(), Some(100.0));
        assert_eq!(view.computed_commissions(), vec![25.0]);
    }

    #[test]
    fn test_duplicate_order_rows_keep_first() {
        let mut snapshot = snapshot_one_order();
        snapshot.orders.push(Order {
            marketplace: "Centauro".to_string(),
            order_number: "PED-1".to_string(),
            net_value: 999.0,
            order_date: None,
        });

        let views = snapshot.order_views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].order.net_value, 100.0);
    }

    #[test]
    fn test_event_index_grouping() {
        let snapshot = snapshot_one_order();
        let views = snapshot.order_views();
        let index = EventIndex::build(&views[0].events);

        assert!(index.has(EventType::RepasseNormal));
        assert_eq!(index.of(EventType::DescontarRetroativo).len(), 2);
        assert_eq!(index.settled_sum(EventType::DescontarRetroativo), -50.0);
        assert_eq!(index.max_settled(EventType::RepasseNormal), Some(88.0));
        assert_eq!(index.max_abs_settled(EventType::DescontarRetroativo), Some(-30.0));
        assert!(!index.has(EventType::DescontarHove));
    }

    #[test]
    fn test_views_sorted_by_key() {
        let mut snapshot = snapshot_one_order();
        snapshot.orders.insert(
            0,
            Order {
                marketplace: "Centauro".to_string(),
                order_number: "PED-9".to_string(),
                net_value: 10.0,
                order_date: None,
            },
        );

        let views = snapshot.order_views();
        assert_eq!(views[0].order.order_number, "PED-1");
        assert_eq!(views[1].order.order_number, "PED-9");
    }
}
