// ==========================================
// 均衡排程流水线集成测试
// ==========================================
// 测试目标: 分类 → 聚合 → 估算 → 排程 → 指标 端到端正确性
// ==========================================


use laundry_line_balance::config::BalanceConfig;
use laundry_line_balance::{
    DailyBalanceOrchestrator, Line, OverrideTable, ProductClassifier, ScheduleReason,
};
use std::collections::HashSet;
use std::sync::Arc;
use test_helpers::{approx_eq, business_date, item, weight};

fn orchestrator() -> DailyBalanceOrchestrator<BalanceConfig> {
    DailyBalanceOrchestrator::new(Arc::new(BalanceConfig::default()))
}

#[tokio::test]
async fn test_two_clients_reach_perfect_balance() {
    // X: 全部平烫; Y: 全部折叠
    let weights = vec![weight("X", 600.0), weight("Y", 400.0)];
    let items = vec![item("X", "Queen Flat Sheet", 100.0), item("Y", "Bath Towel", 100.0)];

    let result = orchestrator()
        .execute_day(business_date(), &weights, &items, &OverrideTable::new())
        .await
        .expect("execute_day failed");

    assert_eq!(result.schedule.len(), 2);

    let first = &result.schedule[0];
    assert_eq!(first.client_id, "X");
    assert_eq!(first.reason, ScheduleReason::HighVolumeClient);
    assert!(approx_eq(first.cumulative_mangle_load, 100.0));
    assert!(approx_eq(first.cumulative_doblado_load, 0.0));
    assert!(approx_eq(first.priority_score, 600.0));

    let second = &result.schedule[1];
    assert_eq!(second.client_id, "Y");
    assert_eq!(second.reason, ScheduleReason::ImprovesBalance);
    assert!(approx_eq(second.priority_score, 1600.0));
    assert!(approx_eq(second.cumulative_mangle_load, 100.0));
    assert!(approx_eq(second.cumulative_doblado_load, 100.0));

    assert!(approx_eq(result.metrics.balance_difference, 0.0));
    assert!(approx_eq(result.metrics.efficiency, 100.0));
}

#[tokio::test]
async fn test_override_takes_precedence_on_next_run() {
    let classifier = ProductClassifier::default();
    let mut overrides = OverrideTable::new();

    assert_eq!(classifier.classify("Queen Flat Sheet", &overrides), Line::Mangle);
    assert_eq!(classifier.classify("Scrub Shirt", &overrides), Line::Doblado);

    let weights = vec![weight("H", 50.0)];
    let items = vec![item("H", "Scrub Shirt", 20.0)];
    let before = orchestrator()
        .execute_day(business_date(), &weights, &items, &overrides)
        .await
        .unwrap();
    assert!(approx_eq(before.day_mangle_items, 0.0));

    overrides.insert("  SCRUB   shirt ", Line::Mangle);
    assert_eq!(classifier.classify("Scrub Shirt", &overrides), Line::Mangle);

    let after = orchestrator()
        .execute_day(business_date(), &weights, &items, &overrides)
        .await
        .unwrap();
    assert!(approx_eq(after.day_mangle_items, 20.0));
    assert!(approx_eq(after.records[0].mangle_percentage, 100.0));
}

#[tokio::test]
async fn test_client_without_items_uses_day_ratio() {
    // 其余客户合计 70% 平烫 / 30% 折叠
    let weights = vec![weight("A", 100.0), weight("Z", 300.0)];
    let items = vec![item("A", "Duvet Cover", 70.0), item("A", "Bath Towel", 30.0)];

    let result = orchestrator()
        .execute_day(business_date(), &weights, &items, &OverrideTable::new())
        .await
        .unwrap();

    let z = result
        .records
        .iter()
        .find(|r| r.client_id == "Z")
        .expect("client Z missing");
    assert!(approx_eq(z.mangle_percentage, 70.0));
    assert!(approx_eq(z.doblado_percentage, 30.0));
    assert!(approx_eq(z.estimated_mangle_weight, 210.0));
    assert!(approx_eq(z.estimated_doblado_weight, 90.0));
    assert_eq!(z.actual_mangle_items, None);
}

#[tokio::test]
async fn test_schedule_properties_on_mixed_day() {
    let weights = vec![
        weight("C1", 320.0),
        weight("C2", 45.5),
        weight("C3", 210.0),
        weight("C4", 0.0),
        weight("C5", 88.0),
        weight("C6", 150.0),
    ];
    let items = vec![
        item("C1", "King Sheet", 120.0),
        item("C1", "Bath Towel", 40.0),
        item("C2", "Napkin", 300.0),
        item("C3", "Chef Jacket", 75.0),
        item("C3", "Tablecloth", 25.0),
        item("C5", "Pillowcase", 60.0),
        item("C6", "Scrub Pants", 90.0),
        item("C7", "Apron", 15.0), // 仅有件数记录的客户
    ];

    let result = orchestrator()
        .execute_day(business_date(), &weights, &items, &OverrideTable::new())
        .await
        .unwrap();

    // 守恒
    let est_mangle: f64 = result.records.iter().map(|r| r.estimated_mangle_items).sum();
    let est_doblado: f64 = result.records.iter().map(|r| r.estimated_doblado_items).sum();
    assert!((est_mangle + est_doblado - result.total_day_items).abs() < 1e-6);
    let est_weight: f64 = result
        .records
        .iter()
        .map(|r| r.estimated_mangle_weight + r.estimated_doblado_weight)
        .sum();
    assert!((est_weight - result.total_day_weight).abs() < 1e-6);

    // 排列
    assert_eq!(result.schedule.len(), result.records.len());
    let ids: HashSet<&str> = result.schedule.iter().map(|e| e.client_id.as_str()).collect();
    assert_eq!(ids.len(), result.records.len());
    assert!(ids.contains("C7"));

    // 单调
    for pair in result.schedule.windows(2) {
        assert!(pair[1].cumulative_mangle_load >= pair[0].cumulative_mangle_load);
        assert!(pair[1].cumulative_doblado_load >= pair[0].cumulative_doblado_load);
        assert_eq!(pair[1].sequence, pair[0].sequence + 1);
    }

    // 一致
    let last = result.schedule.last().unwrap();
    assert!((last.cumulative_mangle_load - est_mangle).abs() < 1e-6);
    assert!((last.cumulative_doblado_load - est_doblado).abs() < 1e-6);
    assert!((result.metrics.balance_difference - (est_mangle - est_doblado).abs()).abs() < 1e-6);
    assert!(result.metrics.efficiency >= 0.0 && result.metrics.efficiency <= 100.0);
}

#[tokio::test]
async fn test_zero_inputs_are_total() {
    // 无记录
    let empty = orchestrator()
        .execute_day(business_date(), &[], &[], &OverrideTable::new())
        .await
        .unwrap();
    assert!(empty.schedule.is_empty());
    assert!(approx_eq(empty.metrics.efficiency, 100.0));

    // 有客户, 重量与件数全为 0
    let weights = vec![weight("A", 0.0), weight("B", 0.0)];
    let zero = orchestrator()
        .execute_day(business_date(), &weights, &[], &OverrideTable::new())
        .await
        .unwrap();
    assert_eq!(zero.schedule.len(), 2);
    assert_eq!(zero.schedule[0].client_id, "A");
    assert_eq!(zero.schedule[0].reason, ScheduleReason::SeedSelection);
    assert_eq!(zero.schedule[1].reason, ScheduleReason::SequentialProcessing);
    assert!(approx_eq(zero.records[0].mangle_percentage, 50.0));
    assert!(approx_eq(zero.metrics.efficiency, 100.0));
}
