use store_metrics_core::{
    config::MetricsConfig,
    engine::MetricsEngine,
    error::MetricsError,
    ratio::Ratio,
    record::{ApplicationRecord, RecordSet},
    summary::MetricName,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn make_engine() -> MetricsEngine {
    MetricsEngine::new(MetricsConfig::default()).unwrap()
}

/// `total` applications for `store`; the first `approved` are approved for
/// `amount_each`, and of those the first `used` draw `used_each`.
fn store_rows(
    store: u32,
    total: usize,
    approved: usize,
    amount_each: f64,
    used: usize,
    used_each: f64,
) -> Vec<ApplicationRecord> {
    (0..total)
        .map(|i| {
            let is_approved = i < approved;
            let is_used = is_approved && i < used;
            ApplicationRecord::new(
                format!("s{store}-a{i}"),
                format!("store_{store}"),
                is_approved,
                is_approved.then_some(amount_each),
                is_approved.then_some(if is_used { used_each } else { 0.0 }),
            )
        })
        .collect()
}

/// Six stores whose approved totals are [10, 20, 30, 40, 50, 200].
fn six_store_ledger() -> RecordSet {
    [10.0, 20.0, 30.0, 40.0, 50.0, 200.0]
        .into_iter()
        .enumerate()
        .flat_map(|(i, total)| store_rows(i as u32 + 1, 4, 2, total / 2.0, 1, total / 4.0))
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Stores 1..3 with [5, 5, 6] approvals out of 10 -> [50, 50, 60] percent.
#[test]
fn three_store_approval_percentages() {
    let records: RecordSet = [(1, 5), (2, 5), (3, 6)]
        .into_iter()
        .flat_map(|(store, approved)| store_rows(store, 10, approved, 100.0, 0, 0.0))
        .collect();

    let report = make_engine().run(&records).expect("run");
    let stores: Vec<u32> = report.stores.iter().map(|s| s.store).collect();
    assert_eq!(stores, vec![1, 2, 3]);
    assert!(report.stores.iter().all(|s| s.total_applications == 10));

    let pct: Vec<f64> = report
        .stores
        .iter()
        .map(|s| s.percent_of_apps_approved.value().unwrap())
        .collect();
    for (got, want) in pct.iter().zip([50.0, 50.0, 60.0]) {
        assert!((got - want).abs() < 1e-9, "got {pct:?}");
    }
}

/// Monitored metrics default to approved amount and funds used.
#[test]
fn end_to_end_flags_high_approved_store() {
    let report = make_engine().run(&six_store_ledger()).expect("run");

    assert_eq!(report.stores.len(), 6);
    assert_eq!(report.stores[5].total_approved_amount, 200.0);

    let flagged = report.outliers_for(MetricName::TotalApprovedAmount);
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].store, 6);
    assert_eq!(flagged[0].value, 200.0);

    // Every store used a quarter of its approved funds: no spread, no flag.
    assert!(report.outliers_for(MetricName::PercentOfFundsUsed).is_empty());
    assert!(report.outliers_for(MetricName::PercentOfAppsUsed).is_empty());
}

#[test]
fn report_lists_outliers_per_monitored_metric_in_order() {
    let report = make_engine().run(&six_store_ledger()).expect("run");
    let metrics: Vec<MetricName> = report.outliers.iter().map(|m| m.metric).collect();
    assert_eq!(
        metrics,
        vec![MetricName::TotalApprovedAmount, MetricName::PercentOfFundsUsed]
    );
}

/// A store with nothing approved has an undefined funds-used ratio and is
/// left out of that metric's sample.
#[test]
fn store_without_approvals_is_excluded_from_funds_sample() {
    let mut rows: Vec<ApplicationRecord> = six_store_ledger().iter().cloned().collect();
    rows.extend(store_rows(9, 3, 0, 0.0, 0, 0.0));
    let report = make_engine().run(&RecordSet::new(rows)).expect("run");

    let store_9 = report.store(9).expect("store 9 present");
    assert_eq!(store_9.num_approved_applications, 0);
    assert_eq!(store_9.total_approved_amount, 0.0);
    assert_eq!(store_9.percent_of_funds_used, Ratio::Undefined);

    let funds = report
        .outliers
        .iter()
        .find(|m| m.metric == MetricName::PercentOfFundsUsed)
        .unwrap();
    assert_eq!(funds.sample_size, 6);

    let amounts = report
        .outliers
        .iter()
        .find(|m| m.metric == MetricName::TotalApprovedAmount)
        .unwrap();
    assert_eq!(amounts.sample_size, 7);
}

/// The same record set always yields the same report, ordering included.
#[test]
fn pipeline_is_idempotent() {
    let engine = make_engine();
    let records = six_store_ledger();
    let first = engine.run(&records).expect("first run");
    let second = engine.run(&records).expect("second run");
    assert_eq!(first, second);

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

/// Shuffling the input rows does not change the report.
#[test]
fn row_order_does_not_change_report() {
    let records = six_store_ledger();
    let mut reversed: Vec<ApplicationRecord> = records.iter().cloned().collect();
    reversed.reverse();

    let engine = make_engine();
    let a = engine.run(&records).unwrap();
    let b = engine.run(&RecordSet::new(reversed)).unwrap();
    assert_eq!(a.stores, b.stores);
    assert_eq!(a.outliers, b.outliers);
}

/// A malformed store key rejects the whole run.
#[test]
fn malformed_store_key_rejects_run() {
    let mut rows: Vec<ApplicationRecord> = six_store_ledger().iter().cloned().collect();
    rows.push(ApplicationRecord::new("bad", "store_x", true, Some(1.0), None));

    match make_engine().run(&RecordSet::new(rows)) {
        Err(MetricsError::MalformedStoreKey { raw }) => assert_eq!(raw, "store_x"),
        other => panic!("expected MalformedStoreKey, got {other:?}"),
    }
}

#[test]
fn headline_totals_match_ledger() {
    let records = RecordSet::new(vec![
        ApplicationRecord::new("a1", "store_1", true, Some(100.0), Some(40.0)),
        ApplicationRecord::new("a2", "store_1", true, Some(300.0), Some(0.0)),
        ApplicationRecord::new("a3", "store_2", false, None, None),
        ApplicationRecord::new("a4", "store_2", false, None, Some(20.0)),
    ]);
    let totals = make_engine().run(&records).unwrap().totals;

    assert_eq!(totals.total_applications, 4);
    assert_eq!(totals.approved_applications, 2);
    assert_eq!(totals.used_applications, 2);
    assert_eq!(totals.average_approved_amount, Some(200.0));
    // Zeros are real observations; nulls are skipped.
    assert_eq!(totals.average_used_amount, Some(20.0));
}

#[test]
fn empty_ledger_produces_empty_report() {
    let report = make_engine().run(&RecordSet::default()).unwrap();
    assert!(report.stores.is_empty());
    assert!(report.outliers.iter().all(|m| m.outliers.is_empty()));
    assert_eq!(report.totals.total_applications, 0);
    assert_eq!(report.totals.average_approved_amount, None);
}

/// Metrics not in the config are never evaluated.
#[test]
fn only_configured_metrics_are_evaluated() {
    let config = MetricsConfig {
        monitored_metrics: vec![MetricName::PercentOfAppsApproved],
        ..MetricsConfig::default()
    };
    let report = MetricsEngine::new(config)
        .unwrap()
        .run(&six_store_ledger())
        .unwrap();
    assert_eq!(report.outliers.len(), 1);
    assert!(report.outliers_for(MetricName::TotalApprovedAmount).is_empty());
}
