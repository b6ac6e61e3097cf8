// 🔄 Cross-Source Reconciliation - marketplace vs sales ledger
// Compares the marketplace-reported order value against the independent
// sales-of-record value, one row per (order, canonical event type).

use crate::model::{round2, EventIndex, OrderView};
use crate::taxonomy::EventType;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// FLAGS
// ============================================================================

/// Independent, multi-valued discrepancy flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossSourceFlag {
    /// No matching sale record exists for the order
    #[serde(rename = "ERRO_VENDA_NAO_ENCONTRADA")]
    VendaNaoEncontrada,

    /// Marketplace and ledger report different order values
    #[serde(rename = "ERRO_VALORES_DIVERGENTES")]
    ValoresDivergentes,
}

impl CrossSourceFlag {
    pub fn label(&self) -> &'static str {
        match self {
            CrossSourceFlag::VendaNaoEncontrada => "ERRO_VENDA_NAO_ENCONTRADA",
            CrossSourceFlag::ValoresDivergentes => "ERRO_VALORES_DIVERGENTES",
        }
    }
}

impl fmt::Display for CrossSourceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossSourceRecord {
    pub marketplace: String,
    pub order_number: String,
    pub event_type: EventType,

    /// Marketplace-reported net value
    pub net_value: f64,

    /// Sales-ledger value; 0 means no matching sale record
    pub sale_value: f64,

    pub flags: Vec<CrossSourceFlag>,
}

impl CrossSourceRecord {
    pub fn has_flags(&self) -> bool {
        !self.flags.is_empty()
    }
}

// ============================================================================
// RECONCILER
// ============================================================================

pub struct CrossSourceReconciler;

impl CrossSourceReconciler {
    /// Produce one comparison record per canonical event type present on
    /// the order (one `Desconhecido` record when the order has no events).
    ///
    /// A missing sale record flags every row of the order; the value
    /// comparison applies to `Repasse Normal` rows only and is skipped when
    /// there is no sale value to compare against.
    pub fn check(view: &OrderView, index: &EventIndex) -> Vec<CrossSourceRecord> {
        let net_value = view.order.net_value;
        let sale_value = view.sale_value().unwrap_or(0.0);

        let mut records = Vec::new();
        for event_type in EventType::ALL {
            let present = if view.events.is_empty() {
                event_type == EventType::Desconhecido
            } else {
                index.has(event_type)
            };
            if !present {
                continue;
            }

            let mut flags = Vec::new();
            if sale_value == 0.0 {
                flags.push(CrossSourceFlag::VendaNaoEncontrada);
            }
            if event_type == EventType::RepasseNormal
                && sale_value != 0.0
                && round2(net_value) != round2(sale_value)
            {
                flags.push(CrossSourceFlag::ValoresDivergentes);
            }

            records.push(CrossSourceRecord {
                marketplace: view.order.marketplace.clone(),
                order_number: view.order.order_number.clone(),
                event_type,
                net_value,
                sale_value,
                flags,
            });
        }
        records
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinkView, Order, SaleRecord, SettlementEvent, SkuLink};

    fn order(net: f64) -> Order {
        Order {
            marketplace: "Centauro".to_string(),
            order_number: "PED-3".to_string(),
            net_value: net,
            order_date: None,
        }
    }

    fn event(raw: &str, settled: f64) -> SettlementEvent {
        SettlementEvent {
            order_number: "PED-3".to_string(),
            event_type_raw: raw.to_string(),
            settled_value: settled,
            event_date: None,
            cycle_date: None,
        }
    }

    fn check<'a>(
        order: &'a Order,
        events: &'a [SettlementEvent],
        link: &'a SkuLink,
        sale: Option<&'a SaleRecord>,
    ) -> Vec<CrossSourceRecord> {
        let view = OrderView {
            order,
            links: vec![LinkView {
                link,
                commission: None,
                sale,
            }],
            events: events.iter().collect(),
        };
        let index = EventIndex::build(&view.events);
        CrossSourceReconciler::check(&view, &index)
    }

    fn link() -> SkuLink {
        SkuLink {
            sku_marketplace_id: 7,
            order_number: "PED-3".to_string(),
        }
    }

    #[test]
    fn test_missing_sale_record_flagged() {
        let order = order(200.0);
        let events = vec![event("Repasse Normal", 180.0)];
        let link = link();

        let records = check(&order, &events, &link, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].flags, vec![CrossSourceFlag::VendaNaoEncontrada]);
    }

    #[test]
    fn test_divergent_values_flagged() {
        let order = order(200.0);
        let events = vec![event("Repasse Normal", 180.0)];
        let link = link();
        let sale = SaleRecord {
            sku_marketplace_id: 7,
            sale_net_value: 150.0,
        };

        let records = check(&order, &events, &link, Some(&sale));
        assert_eq!(records[0].flags, vec![CrossSourceFlag::ValoresDivergentes]);
    }

    #[test]
    fn test_matching_values_clean() {
        let order = order(200.0);
        let events = vec![event("Repasse Normal", 180.0)];
        let link = link();
        let sale = SaleRecord {
            sku_marketplace_id: 7,
            sale_net_value: 200.0,
        };

        let records = check(&order, &events, &link, Some(&sale));
        assert!(!records[0].has_flags());
    }

    #[test]
    fn test_divergence_only_checked_for_repasse_normal() {
        let order = order(200.0);
        let events = vec![event("Descontar Houve", -200.0)];
        let link = link();
        let sale = SaleRecord {
            sku_marketplace_id: 7,
            sale_net_value: 150.0,
        };

        let records = check(&order, &events, &link, Some(&sale));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_type, EventType::DescontarHove);
        assert!(!records[0].has_flags());
    }

    #[test]
    fn test_one_record_per_canonical_type() {
        let order = order(200.0);
        let events = vec![
            event("Repasse Normal", 180.0),
            event("Repasse - Normal", 180.0),
            event("Descontar Retroativo", -10.0),
        ];
        let link = link();

        let records = check(&order, &events, &link, None);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_type, EventType::RepasseNormal);
        assert_eq!(records[1].event_type, EventType::DescontarRetroativo);
    }

    #[test]
    fn test_order_without_events_yields_desconhecido_row() {
        let order = order(200.0);
        let link = link();

        let records = check(&order, &[], &link, None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_type, EventType::Desconhecido);
        assert_eq!(records[0].flags, vec![CrossSourceFlag::VendaNaoEncontrada]);
    }
}
