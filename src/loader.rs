// 📂 CSV Loader - reads the five input collections
// Stand-in for the data-access layer: the engine only ever sees complete,
// typed collections. One CSV file per collection, headers matching the
// record field names; empty cells deserialize to None.

use crate::model::{
    CommissionSchedule, Order, SaleRecord, SettlementEvent, SettlementSnapshot, SkuLink,
};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// File names expected inside the data directory
pub const ORDERS_FILE: &str = "orders.csv";
pub const SKU_LINKS_FILE: &str = "sku_links.csv";
pub const COMMISSION_SCHEDULES_FILE: &str = "commission_schedules.csv";
pub const SETTLEMENT_EVENTS_FILE: &str = "settlement_events.csv";
pub const SALE_RECORDS_FILE: &str = "sale_records.csv";

fn read_rows<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path.as_ref())
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize().enumerate() {
        let row: T = record.with_context(|| {
            format!("Failed to parse {:?} at line {}", path.as_ref(), line + 2)
        })?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_orders<P: AsRef<Path>>(path: P) -> Result<Vec<Order>> {
    read_rows(path)
}

pub fn load_sku_links<P: AsRef<Path>>(path: P) -> Result<Vec<SkuLink>> {
    read_rows(path)
}

pub fn load_commission_schedules<P: AsRef<Path>>(path: P) -> Result<Vec<CommissionSchedule>> {
    read_rows(path)
}

pub fn load_settlement_events<P: AsRef<Path>>(path: P) -> Result<Vec<SettlementEvent>> {
    read_rows(path)
}

pub fn load_sale_records<P: AsRef<Path>>(path: P) -> Result<Vec<SaleRecord>> {
    read_rows(path)
}

/// Load a complete snapshot from a directory holding the five CSV files
pub fn load_snapshot<P: AsRef<Path>>(dir: P) -> Result<SettlementSnapshot> {
    let dir = dir.as_ref();
    Ok(SettlementSnapshot {
        orders: load_orders(dir.join(ORDERS_FILE))?,
        sku_links: load_sku_links(dir.join(SKU_LINKS_FILE))?,
        commission_schedules: load_commission_schedules(dir.join(COMMISSION_SCHEDULES_FILE))?,
        settlement_events: load_settlement_events(dir.join(SETTLEMENT_EVENTS_FILE))?,
        sale_records: load_sale_records(dir.join(SALE_RECORDS_FILE))?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
