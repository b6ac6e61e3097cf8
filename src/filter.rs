// Display predicates applied over engine outputs.
// The dashboard's sidebar filters boil down to these checks; they operate
// on the derived collections only, never on the raw snapshot.

use crate::commission::ErrorTag;
use crate::pipeline::ReconciliationRecord;
use crate::summary::{FinalStatus, OrderSummary};
use crate::taxonomy::EventType;
use chrono::NaiveDate;

/// Filter criteria; every field is optional and empty collections match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Substring match on the order number
    pub order_contains: Option<String>,

    /// Keep rows whose canonical type is in this set
    pub event_types: Option<Vec<EventType>>,

    /// Keep rows whose commission date falls inside this inclusive range
    /// (rows without a commission date are dropped when the range is set)
    pub commission_date_range: Option<(NaiveDate, NaiveDate)>,

    /// Keep rows carrying at least one of these error tags
    pub error_tags: Vec<ErrorTag>,

    /// Keep summaries whose final status is in this set
    pub statuses: Vec<FinalStatus>,
}

impl FilterCriteria {
    pub fn matches_row(&self, row: &ReconciliationRecord) -> bool {
        if let Some(fragment) = &self.order_contains {
            if !row.order_number.contains(fragment.as_str()) {
                return false;
            }
        }

        if let Some(types) = &self.event_types {
            if !types.contains(&row.event_type) {
                return false;
            }
        }

        if let Some((start, end)) = self.commission_date_range {
            match row.commission_date {
                Some(date) if date >= start && date <= end => {}
                _ => return false,
            }
        }

        if !self.error_tags.is_empty()
            && !self.error_tags.iter().any(|tag| row.errors.contains(tag))
        {
            return false;
        }

        true
    }

    pub fn matches_summary(&self, summary: &OrderSummary) -> bool {
        if let Some(fragment) = &self.order_contains {
            if !summary.order_number.contains(fragment.as_str()) {
                return false;
            }
        }

        if !self.statuses.is_empty() && !self.statuses.contains(&summary.final_status) {
            return false;
        }

        true
    }

    pub fn filter_rows<'a>(
        &self,
        rows: &'a [ReconciliationRecord],
    ) -> Vec<&'a ReconciliationRecord> {
        rows.iter().filter(|row| self.matches_row(row)).collect()
    }

    pub fn filter_summaries<'a>(
        &self,
        summaries: &'a [OrderSummary],
    ) -> Vec<&'a OrderSummary> {
        summaries
            .iter()
            .filter(|summary| self.matches_summary(summary))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
