use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::Path;

use settlement_audit::{
    load_snapshot, AuditEngine, AuditOutput, BatchReport, FilterCriteria,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("export") => {
            let data_dir = args.get(2).map(String::as_str).unwrap_or("data");
            let out_dir = args.get(3).map(String::as_str).unwrap_or("out");
            run_export(Path::new(data_dir), Path::new(out_dir))
        }
        Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some(data_dir) => run_report(Path::new(data_dir), order_filter(&args)),
        None => run_report(Path::new("data"), None),
    }
}

fn print_usage() {
    println!("settlement-audit {}", settlement_audit::VERSION);
    println!();
    println!("Usage:");
    println!("  settlement-audit [DATA_DIR] [--order SUBSTRING]   print the batch report");
    println!("  settlement-audit export [DATA_DIR] [OUT_DIR]      write outputs as JSON");
    println!();
    println!("DATA_DIR must contain: orders.csv, sku_links.csv,");
    println!("commission_schedules.csv, settlement_events.csv, sale_records.csv");
}

fn order_filter(args: &[String]) -> Option<String> {
    args.iter()
        .position(|arg| arg == "--order")
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

fn run_audit(data_dir: &Path) -> Result<AuditOutput> {
    println!("📂 Loading settlement snapshot from {:?}...", data_dir);
    let snapshot = load_snapshot(data_dir)?;
    println!(
        "✓ Loaded {} orders, {} sku links, {} commission entries, {} events, {} sales",
        snapshot.orders.len(),
        snapshot.sku_links.len(),
        snapshot.commission_schedules.len(),
        snapshot.settlement_events.len(),
        snapshot.sale_records.len()
    );

    println!("\n⚖️  Running reconciliation...");
    Ok(AuditEngine::new().run(&snapshot))
}

fn run_report(data_dir: &Path, order_filter: Option<String>) -> Result<()> {
    if !data_dir.is_dir() {
        bail!(
            "Data directory not found: {:?}\nRun with --help for usage.",
            data_dir
        );
    }

    let mut output = run_audit(data_dir)?;

    if let Some(fragment) = order_filter {
        let criteria = FilterCriteria {
            order_contains: Some(fragment.clone()),
            ..Default::default()
        };
        output.rows = output
            .rows
            .into_iter()
            .filter(|row| criteria.matches_row(row))
            .collect();
        output.summaries = output
            .summaries
            .into_iter()
            .filter(|summary| criteria.matches_summary(summary))
            .collect();
        output.cross_source.retain(|r| r.order_number.contains(&fragment));
        output.return_checks.retain(|c| c.order_number.contains(&fragment));
        output.retro_checks.retain(|c| c.order_number.contains(&fragment));
        output.duplicates.retain(|d| d.order_number.contains(&fragment));
        println!("✓ Filtered to orders matching {:?}", fragment);
    }

    let report = BatchReport::build(&output);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Reconciliation Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Rows:                  {}", report.row_count);
    println!("Rows with errors:      {}", report.rows_with_errors);
    println!("Commission errors:     {}", report.commission_error_count);
    println!("Return errors:         {}", report.return_error_orders);
    println!("Full clawbacks:        {}", report.full_clawback_orders);
    println!("Duplicate groups:      {}", report.duplicate_group_count);
    println!("Settled total:         {:.2}", report.settled_total);

    println!("\nOrders summarized:     {}", report.order_count);
    println!("Expected receivable:   {:.2}", report.total_expected);
    println!("Received:              {:.2}", report.total_received);
    println!("Gap:                   {:.2}", report.total_gap);

    println!("\nCross-source:");
    println!("  Missing sales:       {}", report.missing_sale_count);
    println!("  Divergent values:    {}", report.divergent_value_count);

    if !report.event_type_counts.is_empty() {
        println!("\nRows per event type:");
        for (label, count) in &report.event_type_counts {
            println!("  {:<36} {}", label, count);
        }
    }

    if !report.error_tag_counts.is_empty() {
        println!("\nError occurrences:");
        for (label, count) in &report.error_tag_counts {
            println!("  {:<36} {}", label, count);
        }
    }

    if !report.status_counts.is_empty() {
        println!("\nOrders per final status:");
        for (label, count) in &report.status_counts {
            println!("  {:<36} {}", label, count);
        }
    }

    println!("\n✅ {}", report.summary());
    Ok(())
}

fn run_export(data_dir: &Path, out_dir: &Path) -> Result<()> {
    if !data_dir.is_dir() {
        bail!(
            "Data directory not found: {:?}\nRun with --help for usage.",
            data_dir
        );
    }

    let output = run_audit(data_dir)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    write_json(out_dir.join("reconciliation_rows.json"), &output.rows)?;
    write_json(out_dir.join("order_summaries.json"), &output.summaries)?;
    write_json(out_dir.join("cross_source.json"), &output.cross_source)?;
    write_json(out_dir.join("return_checks.json"), &output.return_checks)?;
    write_json(out_dir.join("retro_checks.json"), &output.retro_checks)?;
    write_json(out_dir.join("duplicates.json"), &output.duplicates)?;

    let report = BatchReport::build(&output);
    write_json(out_dir.join("batch_report.json"), &report)?;

    println!("\n✅ Wrote engine outputs to {:?}", out_dir);
    println!("   {}", report.summary());
    Ok(())
}

fn write_json<T: serde::Serialize>(path: std::path::PathBuf, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
    println!("✓ {:?}", path);
    Ok(())
}
