// ==========================================
// 洗涤分线排程系统 - 均衡指标计算
// ==========================================
// 职责: 由完整排程推导单一效率分 (0..=100)
// 规则:
// - optimal_balance = 两线估算件数总和 / 2
// - efficiency = 100 * (1 - |M - D| / (M + D)), 截断到 [0, 100]
// - 总负载为 0 时 efficiency = 100
// ==========================================

use crate::domain::schedule::{BalanceMetrics, ScheduleEntry};

pub struct BalanceMetricsCalculator {
    // 无状态引擎,不需要注入依赖
}

impl BalanceMetricsCalculator {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算均衡指标
    ///
    /// 累计值取最后一个条目（空排程为全零）
    pub fn compute(&self, entries: &[ScheduleEntry]) -> BalanceMetrics {
        let Some(last) = entries.last() else {
            return BalanceMetrics::empty();
        };

        let total_estimated: f64 = entries
            .iter()
            .map(|e| e.estimated_mangle_items + e.estimated_doblado_items)
            .sum();

        let current_mangle_load = last.cumulative_mangle_load;
        let current_doblado_load = last.cumulative_doblado_load;
        let balance_difference = (current_mangle_load - current_doblado_load).abs();
        let total_load = current_mangle_load + current_doblado_load;

        let efficiency = if total_load > 0.0 {
            (100.0 * (1.0 - balance_difference / total_load)).clamp(0.0, 100.0)
        } else {
            100.0
        };

        BalanceMetrics {
            optimal_balance: total_estimated / 2.0,
            current_mangle_load,
            current_doblado_load,
            balance_difference,
            efficiency,
        }
    }
}

impl Default for BalanceMetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}
