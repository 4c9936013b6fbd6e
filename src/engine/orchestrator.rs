// ==========================================
// 洗涤分线排程系统 - 引擎编排器
// ==========================================
// 用途: 按固定顺序串联五个引擎
// 分类 → 聚合 → 分线估算 → 均衡排程 → 均衡指标
// ==========================================
// 红线: 每次计算都是输入快照的纯函数, 不做增量修补
// ==========================================

use crate::config::{BalanceConfigReader, ConfigResult};
use crate::domain::classification::OverrideTable;
use crate::domain::client_day::ClientDayRecord;
use crate::domain::intake::{ItemRecord, WeightRecord};
use crate::domain::schedule::{BalanceMetrics, ScheduleEntry};
use crate::engine::{BalanceScheduler, DailyAggregator, LineAllocationEstimator, ProductClassifier};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// DailyBalanceResult - 单日计算结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBalanceResult {
    pub run_id: String,
    pub business_date: NaiveDate,

    // 聚合 + 估算 输出
    pub records: Vec<ClientDayRecord>,
    pub total_day_weight: f64,
    pub total_day_items: f64,
    pub day_mangle_items: f64,
    pub day_doblado_items: f64,
    pub excluded_weight_records: usize,
    pub excluded_item_records: usize,

    // 排程 + 指标 输出
    pub schedule: Vec<ScheduleEntry>,
    pub metrics: BalanceMetrics,
}

// ==========================================
// DailyBalanceOrchestrator - 引擎编排器
// ==========================================
pub struct DailyBalanceOrchestrator<C>
where
    C: BalanceConfigReader,
{
    config: Arc<C>,
    aggregator: DailyAggregator,
    estimator: LineAllocationEstimator,
}

impl<C> DailyBalanceOrchestrator<C>
where
    C: BalanceConfigReader,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 配置读取器
    pub fn new(config: Arc<C>) -> Self {
        Self {
            config,
            aggregator: DailyAggregator::new(),
            estimator: LineAllocationEstimator::new(),
        }
    }

    /// 按当前配置构造分类引擎
    pub async fn build_classifier(&self) -> ConfigResult<ProductClassifier> {
        Ok(ProductClassifier::new(self.config.get_mangle_keywords().await?))
    }

    /// 执行单日完整计算
    ///
    /// # 参数
    /// - business_date: 业务日期 (调用方已解析)
    /// - weight_records / item_records: 当日原始记录 (无记录即空切片)
    /// - overrides: 覆写表快照
    ///
    /// # 返回
    /// 单日计算结果；仅配置读取失败时返回错误
    #[instrument(skip(self, weight_records, item_records, overrides), fields(
        weight_records = weight_records.len(),
        item_records = item_records.len(),
        overrides = overrides.len()
    ))]
    pub async fn execute_day(
        &self,
        business_date: NaiveDate,
        weight_records: &[WeightRecord],
        item_records: &[ItemRecord],
        overrides: &OverrideTable,
    ) -> ConfigResult<DailyBalanceResult> {
        let weights = self.config.get_scoring_weights().await?;
        let classifier = self.build_classifier().await?;

        // ==========================================
        // 步骤1+2: 分类 + 聚合
        // ==========================================
        debug!("步骤1: 分类并聚合当日记录");
        let aggregate = self.aggregator.aggregate(weight_records, item_records, |name| {
            classifier.classify(name, overrides)
        });

        // ==========================================
        // 步骤3: 分线估算
        // ==========================================
        debug!(day_mangle_ratio = ?aggregate.day_mangle_ratio(), "步骤2: 分线估算");
        let records = self.estimator.estimate_day(&aggregate);

        // ==========================================
        // 步骤4+5: 均衡排程 + 指标
        // ==========================================
        debug!("步骤3: 均衡排程");
        let scheduler = BalanceScheduler::new(weights);
        let (schedule, metrics) = scheduler.schedule(&records, aggregate.total_day_weight);

        let run_id = Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            business_date = %business_date,
            clients_count = records.len(),
            efficiency = metrics.efficiency,
            "单日均衡排程完成"
        );

        Ok(DailyBalanceResult {
            run_id,
            business_date,
            records,
            total_day_weight: aggregate.total_day_weight,
            total_day_items: aggregate.total_day_items,
            day_mangle_items: aggregate.day_mangle_items,
            day_doblado_items: aggregate.day_doblado_items,
            excluded_weight_records: aggregate.excluded_weight_records,
            excluded_item_records: aggregate.excluded_item_records,
            schedule,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BalanceConfig;
    use crate::domain::types::Line;
    use chrono::NaiveDateTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn ts() -> NaiveDateTime {
        date().and_hms_opt(6, 45, 0).unwrap()
    }

    fn weight(client_id: &str, weight: f64) -> WeightRecord {
        WeightRecord {
            client_id: client_id.to_string(),
            client_name: client_id.to_string(),
            weight: Some(weight),
            timestamp: Some(ts()),
        }
    }

    fn item(client_id: &str, product: &str, quantity: f64) -> ItemRecord {
        ItemRecord {
            client_id: client_id.to_string(),
            client_name: client_id.to_string(),
            product_name: Some(product.to_string()),
            quantity: Some(quantity),
            added_at: Some(ts()),
        }
    }

    #[tokio::test]
    async fn test_fallback_ratio_end_to_end() {
        // 客户 C 没有件数记录, 其余客户合计 70% Mangle / 30% Doblado
        let orchestrator = DailyBalanceOrchestrator::new(Arc::new(BalanceConfig::default()));
        let weights = vec![weight("A", 500.0), weight("B", 200.0), weight("C", 300.0)];
        let items = vec![
            item("A", "Queen Flat Sheet", 50.0),
            item("A", "Scrub Shirt", 10.0),
            item("B", "Napkin", 20.0),
            item("B", "Scrub Pants", 20.0),
        ];

        let result = orchestrator
            .execute_day(date(), &weights, &items, &OverrideTable::new())
            .await
            .unwrap();

        let c = result.records.iter().find(|r| r.client_id == "C").unwrap();
        assert!((c.mangle_percentage - 70.0).abs() < 1e-9);
        assert!((c.doblado_percentage - 30.0).abs() < 1e-9);
        assert!((c.estimated_mangle_weight - 210.0).abs() < 1e-9);
        assert!((c.estimated_doblado_weight - 90.0).abs() < 1e-9);

        assert_eq!(result.schedule.len(), 3);
        assert_eq!(result.total_day_items, 100.0);
        assert!(!result.run_id.is_empty());
    }

    #[tokio::test]
    async fn test_override_changes_next_run() {
        let orchestrator = DailyBalanceOrchestrator::new(Arc::new(BalanceConfig::default()));
        let weights = vec![weight("A", 10.0)];
        let items = vec![item("A", "Scrub Shirt", 8.0)];

        let before = orchestrator
            .execute_day(date(), &weights, &items, &OverrideTable::new())
            .await
            .unwrap();
        assert_eq!(before.records[0].actual_mangle_items, Some(0.0));

        let mut overrides = OverrideTable::new();
        overrides.insert("Scrub Shirt", Line::Mangle);
        let after = orchestrator
            .execute_day(date(), &weights, &items, &overrides)
            .await
            .unwrap();
        assert_eq!(after.records[0].actual_mangle_items, Some(8.0));
        assert_eq!(after.records[0].mangle_percentage, 100.0);
        assert_ne!(before.run_id, after.run_id);
    }

    #[tokio::test]
    async fn test_no_records_day() {
        let orchestrator = DailyBalanceOrchestrator::new(Arc::new(BalanceConfig::default()));
        let result = orchestrator
            .execute_day(date(), &[], &[], &OverrideTable::new())
            .await
            .unwrap();
        assert!(result.records.is_empty());
        assert!(result.schedule.is_empty());
        assert_eq!(result.metrics.efficiency, 100.0);
    }
}
