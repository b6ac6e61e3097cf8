// Settlement Audit - Core Library
// Reconciles marketplace settlement data against expected commissions and
// payouts. Exposes all modules for use in the CLI and tests.

pub mod taxonomy;
pub mod model;
pub mod loader;
pub mod commission;
pub mod correlation;
pub mod summary;
pub mod cross_source;
pub mod duplicates;
pub mod pipeline;
pub mod filter;
pub mod report;

// Re-export commonly used types
pub use taxonomy::EventType;
pub use model::{
    round2, round4,
    Order, SkuLink, CommissionSchedule, SettlementEvent, SaleRecord,
    SettlementSnapshot, OrderView, LinkView, EventIndex,
};
pub use loader::{
    load_orders, load_sku_links, load_commission_schedules,
    load_settlement_events, load_sale_records, load_snapshot,
};
pub use commission::{CommissionValidator, ErrorTag};
pub use correlation::{CorrelationChecker, ReturnCheck, RetroactiveCheck};
pub use summary::{SummaryBuilder, OrderSummary, PaymentStatus, FinalStatus};
pub use cross_source::{CrossSourceReconciler, CrossSourceRecord, CrossSourceFlag};
pub use duplicates::{find_duplicates, DuplicateGroup};
pub use pipeline::{AuditEngine, AuditOutput, ReconciliationRecord};
pub use filter::FilterCriteria;
pub use report::BatchReport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
