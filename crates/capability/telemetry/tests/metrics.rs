use shelf_telemetry::{
    TelemetryMetrics, metrics, record_edit_conflict, record_login_failure, record_token_issued,
};

#[test]
fn fresh_metrics_start_at_zero() {
    let snapshot = TelemetryMetrics::new().snapshot();
    assert_eq!(snapshot, Default::default());
}

#[test]
fn global_counters_only_grow() {
    let before = metrics().snapshot();
    record_token_issued();
    record_login_failure();
    record_edit_conflict();
    let after = metrics().snapshot();
    assert!(after.tokens_issued > before.tokens_issued);
    assert!(after.login_failures > before.login_failures);
    assert!(after.edit_conflicts > before.edit_conflicts);
}
