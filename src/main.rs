//! Pipeline runner.
//!
//! Builds the recall dataset for a trailing window against the live
//! openFDA API and prints the headline aggregates. Environment overrides:
//! RECMON_DAYS_BACK (default 1825), RECMON_LIMIT (default 300),
//! OPENFDA_API_KEY (optional, usually via .env).

use chrono::{Duration, Utc};

use recmon_service::analysis::{groupings, stats};
use recmon_service::config::PipelineConfig;
use recmon_service::logging::{self, DataSource, LogLevel};
use recmon_service::model::Dataset;
use recmon_service::pipeline;

const CONFIG_PATH: &str = "./recmon.toml";

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() {
    dotenv::dotenv().ok();
    logging::init_logger(LogLevel::Info, None);

    let config = if std::path::Path::new(CONFIG_PATH).exists() {
        match PipelineConfig::load(CONFIG_PATH) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("✗ {}", e);
                std::process::exit(1);
            }
        }
    } else {
        PipelineConfig::from_env()
    };

    let days_back: i64 = env_or("RECMON_DAYS_BACK", 5 * 365);
    let limit: u32 = env_or("RECMON_LIMIT", 300);
    let end_date = Utc::now().date_naive();
    let start_date = end_date - Duration::days(days_back);

    println!("🔍 Fetching enforcement reports {} → {} (limit {})...", start_date, end_date, limit);

    let dataset = match pipeline::build_dataset_live(&config, start_date, end_date, limit) {
        Ok(dataset) => dataset,
        Err(e) => {
            logging::error(DataSource::System, None, &format!("pipeline failed: {}", e));
            std::process::exit(1);
        }
    };

    print_report(&dataset);
}

fn print_report(dataset: &Dataset) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 RECALL DATASET SUMMARY");
    println!("═══════════════════════════════════════════════════════════");

    if dataset.used_fallback {
        println!("⚠  FALLBACK DATA IN USE — live openFDA API was unavailable");
    }
    if dataset.dropped_count > 0 {
        println!("⚠  {} record(s) dropped (unparseable report date)", dataset.dropped_count);
    }

    let summary = stats::summarize(&dataset.records);
    println!("\nRecords:              {}", summary.total_records);

    match (&summary.quantity, summary.high_severity_share) {
        (Some(quantity), Some(share)) => {
            println!("High-severity share:  {:.1}%", share * 100.0);
            println!(
                "Quantity involved:    mean {:.1}, median {:.1} (p25 {:.1} / p75 {:.1})",
                quantity.mean, quantity.median, quantity.p25, quantity.p75
            );
        }
        _ => {
            println!("No data in range — nothing to summarize.");
            println!("═══════════════════════════════════════════════════════════");
            return;
        }
    }

    println!("\nMonthly trend (low/medium/high):");
    for bucket in groupings::monthly_counts(&dataset.records) {
        println!(
            "  {}-{:02}   {:>4} / {:>4} / {:>4}",
            bucket.year, bucket.month, bucket.counts.low, bucket.counts.medium, bucket.counts.high
        );
    }

    let crosstab = groupings::crosstab_by_category(&dataset.records);
    match stats::chi_square_independence(&crosstab) {
        Some(test) => println!(
            "\nSeverity × category:  chi² = {:.3}, dof = {}, p = {:.4}",
            test.statistic, test.degrees_of_freedom, test.p_value
        ),
        None => println!("\nSeverity × category:  undefined (insufficient table margins)"),
    }

    println!("═══════════════════════════════════════════════════════════");
}
