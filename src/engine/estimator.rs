// ==========================================
// 洗涤分线排程系统 - 分线估算引擎
// ==========================================
// 职责: 为每个客户估算两条处理线的重量与件数
// 输入: ClientDayTally + 当日实际 Mangle 占比
// 输出: ClientDayRecord (不可变)
// ==========================================
// 比例来源优先级:
// 1) 客户自身实际分线 (有件数记录且 total_items > 0)
// 2) 当日全体实际分线比例
// 3) 50/50 (当日没有任何已分类件数)
// ==========================================

use crate::domain::client_day::{ClientDayRecord, ClientDayTally, DailyAggregate};

// ==========================================
// LineAllocationEstimator - 分线估算引擎
// ==========================================
pub struct LineAllocationEstimator {
    // 无状态引擎,不需要注入依赖
}

impl LineAllocationEstimator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 估算单个客户
    ///
    /// # 参数
    /// - `tally`: 客户单日汇总
    /// - `day_mangle_ratio`: 当日实际 Mangle 占比 (0..=100), None 表示当日无已分类件数
    pub fn estimate(&self, tally: &ClientDayTally, day_mangle_ratio: Option<f64>) -> ClientDayRecord {
        let mangle_percentage = match (tally.actual_mangle_items, tally.actual_doblado_items) {
            (Some(mangle), Some(_)) if tally.total_items > 0.0 => mangle / tally.total_items * 100.0,
            _ => day_mangle_ratio.unwrap_or(50.0),
        };
        let mangle_percentage = mangle_percentage.clamp(0.0, 100.0);
        let doblado_percentage = 100.0 - mangle_percentage;

        // Doblado 取差值, 保证两线之和精确等于合计
        let estimated_mangle_weight = tally.total_weight * mangle_percentage / 100.0;
        let estimated_mangle_items = tally.total_items * mangle_percentage / 100.0;

        ClientDayRecord {
            client_id: tally.client_id.clone(),
            client_name: tally.client_name.clone(),
            total_weight: tally.total_weight,
            total_items: tally.total_items,
            actual_mangle_items: tally.actual_mangle_items,
            actual_doblado_items: tally.actual_doblado_items,
            percentage_of_day_weight: tally.percentage_of_day_weight,
            percentage_of_day_items: tally.percentage_of_day_items,
            mangle_percentage,
            doblado_percentage,
            estimated_mangle_weight,
            estimated_doblado_weight: tally.total_weight - estimated_mangle_weight,
            estimated_mangle_items,
            estimated_doblado_items: tally.total_items - estimated_mangle_items,
        }
    }

    /// 估算当日全部客户 (保持聚合顺序)
    pub fn estimate_day(&self, aggregate: &DailyAggregate) -> Vec<ClientDayRecord> {
        let ratio = aggregate.day_mangle_ratio();
        aggregate
            .tallies
            .iter()
            .map(|tally| self.estimate(tally, ratio))
            .collect()
    }
}

impl Default for LineAllocationEstimator {
    fn default() -> Self {
        Self::new()
    }
}
