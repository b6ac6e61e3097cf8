// 🔍 Duplicate Detection - repeated (order, event type) pairs
// A marketplace export should state each event type at most once per order
// (retroactive deductions excepted); repeated pairs usually mean the feed
// delivered the same settlement twice.

use crate::model::OrderView;
use crate::taxonomy::EventType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub marketplace: String,
    pub order_number: String,
    pub event_type: EventType,
    pub count: usize,
}

/// Report every (order, canonical type) pair that occurs more than once.
/// Output follows the view order, with types in canonical display order.
pub fn find_duplicates(views: &[OrderView]) -> Vec<DuplicateGroup> {
    let mut groups = Vec::new();
    for view in views {
        for event_type in EventType::ALL {
            let count = view
                .events
                .iter()
                .filter(|event| event.event_type() == event_type)
                .count();
            if count > 1 {
                groups.push(DuplicateGroup {
                    marketplace: view.order.marketplace.clone(),
                    order_number: view.order.order_number.clone(),
                    event_type,
                    count,
                });
            }
        }
    }
    groups
}

// ============================================================================
// TESTS
// ============================================================================
