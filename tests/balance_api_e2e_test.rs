// ==========================================
// BalanceApi 端到端测试
// ==========================================
// 测试目标: 导入 → 单日/区间报表 → 覆写变更后重新计算
// ==========================================


use chrono::NaiveDate;
use laundry_line_balance::config::config_keys;
use laundry_line_balance::{ApiError, Line, ScheduleReason};
use test_helpers::{approx_eq, business_date, create_test_state, write_csv};

fn import_scenario_day(state: &laundry_line_balance::app::AppState) {
    let weights = write_csv(&[
        "cliente_id,cliente,peso,fecha",
        "X,Hotel Playa,600,2026-03-02 07:30:00",
        "Y,Clinica Norte,400,2026-03-02 07:45:00",
        "Q,Sin Fecha,50,",
    ]);
    let items = write_csv(&[
        "client_id,client_name,product_name,quantity,added_at",
        "X,Hotel Playa,Sábana Bajera,100,2026-03-02 09:00:00",
        "Y,Clinica Norte,Scrub Shirt,100,2026-03-02 09:10:00",
    ]);

    let summary = state
        .balance_api
        .import_day(business_date(), Some(weights.path()), Some(items.path()), false)
        .expect("import failed");
    assert_eq!(summary.weight_rows, 3);
    assert_eq!(summary.item_rows, 2);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].field, "timestamp");
}

#[tokio::test]
async fn test_import_then_analyze_day() {
    let (_db, state) = create_test_state();
    import_scenario_day(&state);

    let report = state.balance_api.analyze_day(business_date()).await.unwrap();

    // 无时间戳的称重记录被排除, 但客户保留为 0 重量
    assert_eq!(report.excluded_weight_records, 1);
    assert!(approx_eq(report.total_day_weight, 1000.0));
    assert_eq!(report.clients_count, 3);

    assert_eq!(report.schedule[0].entry.client_id, "X");
    assert_eq!(report.schedule[0].entry.reason, ScheduleReason::HighVolumeClient);
    assert_eq!(report.schedule[1].entry.client_id, "Y");
    assert!(!report.schedule[1].reason_label.is_empty());
    assert!(approx_eq(report.metrics.efficiency, 100.0));

    // 报表可序列化为 JSON, 原因代码保持稳定
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["schedule"][0]["reason"], "HIGH_VOLUME_CLIENT");
    assert_eq!(json["business_date"], "2026-03-02");
}

#[tokio::test]
async fn test_override_change_recomputes_cached_day() {
    let (_db, state) = create_test_state();
    import_scenario_day(&state);
    let api = &state.balance_api;

    let before = api.analyze_day(business_date()).await.unwrap();
    assert!(approx_eq(before.day_mangle_items, 100.0));

    api.upsert_override("scrub shirt", Line::Mangle).unwrap();
    let after = api.analyze_day(business_date()).await.unwrap();
    assert_ne!(before.run_id, after.run_id);
    assert!(approx_eq(after.day_mangle_items, 200.0));
    assert!(approx_eq(after.metrics.efficiency, 0.0));

    let products = api.list_day_products(business_date()).await.unwrap();
    assert!(products.iter().all(|p| p.line == Line::Mangle));

    api.delete_override("Scrub Shirt").unwrap();
    let restored = api.analyze_day(business_date()).await.unwrap();
    assert!(approx_eq(restored.day_mangle_items, 100.0));
}

#[tokio::test]
async fn test_reimport_invalidates_only_that_day() {
    let (_db, state) = create_test_state();
    import_scenario_day(&state);
    let api = &state.balance_api;

    let other_day = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
    let first = api.analyze_day(business_date()).await.unwrap();
    let other = api.analyze_day(other_day).await.unwrap();
    assert_eq!(other.clients_count, 0);

    let extra = write_csv(&[
        "client_id,client_name,weight,timestamp",
        "W,Residencia,250,2026-03-02 11:00:00",
    ]);
    api.import_day(business_date(), Some(extra.path()), None, false)
        .unwrap();

    let refreshed = api.analyze_day(business_date()).await.unwrap();
    assert_ne!(first.run_id, refreshed.run_id);
    assert_eq!(refreshed.clients_count, 4);

    let other_again = api.analyze_day(other_day).await.unwrap();
    assert_eq!(other.run_id, other_again.run_id);
}

#[tokio::test]
async fn test_analyze_range_over_imported_days() {
    let (_db, state) = create_test_state();
    import_scenario_day(&state);
    let api = &state.balance_api;

    let from = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    let summary = api.analyze_range(from, to).await.unwrap();

    assert_eq!(summary.days.len(), 4);
    let dates: Vec<NaiveDate> = summary.days.iter().map(|d| d.business_date).collect();
    assert_eq!(dates, from.iter_days().take(4).collect::<Vec<_>>());
    assert_eq!(summary.days[1].clients_count, 3);
    assert!(approx_eq(summary.average_efficiency, 100.0));

    assert_eq!(api.list_business_dates().unwrap(), vec![business_date()]);

    let too_long = api
        .analyze_range(from, from + chrono::Duration::days(400))
        .await;
    assert!(matches!(too_long, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_config_change_affects_high_volume_reason() {
    let (_db, state) = create_test_state();
    import_scenario_day(&state);
    let api = &state.balance_api;

    // 阈值提高到 70%, X (60%) 不再视为大客户
    api.set_config_value(config_keys::HIGH_VOLUME_SHARE, "0.7")
        .unwrap();
    let report = api.analyze_day(business_date()).await.unwrap();
    assert_eq!(report.schedule[0].entry.client_id, "X");
    assert_eq!(report.schedule[0].entry.reason, ScheduleReason::SeedSelection);
}
