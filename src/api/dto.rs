// ==========================================
// 洗涤分线排程系统 - API 数据传输对象
// ==========================================
// 职责: 面向调用方的报表结构; 本地化标签在组装时按当前语言生成
// ==========================================

use crate::domain::client_day::ClientDayRecord;
use crate::domain::schedule::{BalanceMetrics, ScheduleEntry};
use crate::domain::types::{ClassificationOrigin, Line};
use crate::engine::DailyBalanceResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ScheduleEntryView - 排程条目 + 本地化原因
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntryView {
    #[serde(flatten)]
    pub entry: ScheduleEntry,
    pub reason_label: String,
}

impl From<&ScheduleEntry> for ScheduleEntryView {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            reason_label: entry.reason.label(),
            entry: entry.clone(),
        }
    }
}

// ==========================================
// DailyBalanceReport - 单日均衡报表
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBalanceReport {
    pub run_id: String,
    pub business_date: NaiveDate,
    pub locale: String,

    // 当日汇总
    pub clients_count: usize,
    pub total_day_weight: f64,
    pub total_day_items: f64,
    pub day_mangle_items: f64,
    pub day_doblado_items: f64,
    pub excluded_weight_records: usize,
    pub excluded_item_records: usize,

    // 明细
    pub records: Vec<ClientDayRecord>,
    pub schedule: Vec<ScheduleEntryView>,
    pub metrics: BalanceMetrics,
}

impl DailyBalanceReport {
    /// 由计算结果组装报表（标签使用当前语言）
    pub fn from_result(result: &DailyBalanceResult) -> Self {
        Self {
            run_id: result.run_id.clone(),
            business_date: result.business_date,
            locale: crate::i18n::current_locale(),
            clients_count: result.records.len(),
            total_day_weight: result.total_day_weight,
            total_day_items: result.total_day_items,
            day_mangle_items: result.day_mangle_items,
            day_doblado_items: result.day_doblado_items,
            excluded_weight_records: result.excluded_weight_records,
            excluded_item_records: result.excluded_item_records,
            records: result.records.clone(),
            schedule: result.schedule.iter().map(ScheduleEntryView::from).collect(),
            metrics: result.metrics.clone(),
        }
    }
}

// ==========================================
// DayProductSummary - 当日产品分类汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayProductSummary {
    pub product_key: String,
    pub example_product_name: String, // 当日首次出现的原始名称
    pub line: Line,
    pub origin: ClassificationOrigin,
    pub total_quantity: f64,
    pub record_count: usize,
}

// ==========================================
// RangeBalanceSummary - 日期区间汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeBalanceSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: Vec<DailyBalanceReport>,
    pub average_efficiency: f64, // 有客户的日期的平均效率; 无则 100
}

impl RangeBalanceSummary {
    pub fn new(from: NaiveDate, to: NaiveDate, days: Vec<DailyBalanceReport>) -> Self {
        let active: Vec<f64> = days
            .iter()
            .filter(|d| d.clients_count > 0)
            .map(|d| d.metrics.efficiency)
            .collect();
        let average_efficiency = if active.is_empty() {
            100.0
        } else {
            active.iter().sum::<f64>() / active.len() as f64
        };
        Self {
            from,
            to,
            days,
            average_efficiency,
        }
    }
}
