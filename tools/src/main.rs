//! metrics-runner: headless store metrics report.
//!
//! Usage:
//!   metrics-runner --seed 12345 --stores 20 --apps 50
//!   metrics-runner --json applications.json --config data/metrics_config.json
//!   metrics-runner --db ledger.db --report-json
//!   metrics-runner --seed 7 --ingest ledger.db

use anyhow::Result;
use store_metrics_core::{
    config::MetricsConfig,
    engine::{MetricsEngine, MetricsReport},
    ratio::Ratio,
    record::RecordSet,
    store::LedgerStore,
    synthetic,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let report_json = args.iter().any(|a| a == "--report-json");

    let mut config = match find_arg(&args, "--config") {
        Some(path) => MetricsConfig::load(path)?,
        None => MetricsConfig::default(),
    };
    config.synthetic.store_count = parse_arg(&args, "--stores", config.synthetic.store_count);
    config.synthetic.applications_per_store =
        parse_arg(&args, "--apps", config.synthetic.applications_per_store);

    let (source, records) = load_records(&args, &config)?;
    log::info!("loaded {} records from {source}", records.len());

    if let Some(path) = find_arg(&args, "--ingest") {
        let store = LedgerStore::open(path)?;
        store.migrate()?;
        store.insert_applications(&records)?;
        println!("ingested {} rows into {path}", records.len());
        return Ok(());
    }

    let engine = MetricsEngine::new(config)?;
    let report = engine.run(&records)?;

    if report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &source);
    }
    Ok(())
}

fn load_records(args: &[String], config: &MetricsConfig) -> Result<(String, RecordSet)> {
    if let Some(path) = find_arg(args, "--json") {
        return Ok((path.to_string(), RecordSet::from_json_path(path)?));
    }
    if let Some(path) = find_arg(args, "--db") {
        let store = LedgerStore::open(path)?;
        store.migrate()?;
        return Ok((path.to_string(), store.load_records()?));
    }
    let seed = parse_arg(args, "--seed", 42u64);
    Ok((
        format!("synthetic (seed {seed})"),
        synthetic::generate(seed, &config.synthetic),
    ))
}

fn print_report(report: &MetricsReport, source: &str) {
    let totals = &report.totals;
    println!("=== LEDGER ===");
    println!("  source:            {source}");
    println!("  applications:      {}", thousands(totals.total_applications));
    println!("  approved:          {}", thousands(totals.approved_applications));
    println!("  used:              {}", thousands(totals.used_applications));
    println!(
        "  avg approved amt:  {}",
        totals.average_approved_amount.map(currency).unwrap_or_default()
    );
    println!(
        "  avg used amt:      {}",
        totals.average_used_amount.map(currency).unwrap_or_default()
    );

    println!();
    println!("=== METRICS BY STORE ===");
    println!(
        "{:>6} {:>8} {:>8} {:>8} {:>9} {:>9} {:>16} {:>16} {:>9}",
        "Store", "Apps", "Approved", "Used", "% Appr", "% Used", "Approved Amt", "Used Amt",
        "% Funds"
    );
    for s in &report.stores {
        println!(
            "{:>6} {:>8} {:>8} {:>8} {:>9} {:>9} {:>16} {:>16} {:>9}",
            s.store,
            s.total_applications,
            s.num_approved_applications,
            s.num_used_applications,
            percent(s.percent_of_apps_approved),
            percent(s.percent_of_apps_used),
            currency(s.total_approved_amount),
            currency(s.total_used_amount),
            percent(s.percent_of_funds_used),
        );
    }

    for metric in &report.outliers {
        println!();
        println!("=== OUTLIERS: {} ===", metric.metric);
        match &metric.fences {
            None => println!(
                "  (only {} defined values; not enough to evaluate)",
                metric.sample_size
            ),
            Some(f) => {
                println!(
                    "  n={}  Q1={:.2}  Q3={:.2}  fence=[{:.2}, {:.2}]",
                    metric.sample_size, f.q1, f.q3, f.lower, f.upper
                );
                if metric.outliers.is_empty() {
                    println!("  (none)");
                }
                for flag in &metric.outliers {
                    let shown = if flag.metric.is_ratio() {
                        percent(Ratio::Value(flag.value))
                    } else {
                        format!("{:.2}", flag.value)
                    };
                    println!("  Store #{}: {shown}", flag.store);
                }
            }
        }
    }
}

fn percent(ratio: Ratio) -> String {
    ratio.value().map(|v| format!("{v:.2}%")).unwrap_or_default()
}

fn currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${}.{:02}", thousands(cents / 100), cents % 100)
}

fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    find_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
