// ==========================================
// 洗涤分线排程系统 - 均衡排程结果
// ==========================================
// 职责: 排程条目 + 均衡指标
// 不变量:
// - sequence 从 1 开始连续
// - 每个客户恰好出现一次
// - 两线累计负载随 sequence 单调不减
// ==========================================

use crate::domain::types::ScheduleReason;
use serde::{Deserialize, Serialize};

// ==========================================
// ScheduleEntry - 排程条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub sequence: usize,
    pub client_id: String,
    pub client_name: String,
    pub total_weight: f64,
    pub estimated_mangle_items: f64,
    pub estimated_doblado_items: f64,
    pub mangle_percentage: f64,
    pub doblado_percentage: f64,
    pub cumulative_mangle_load: f64,
    pub cumulative_doblado_load: f64,
    pub load_balance: f64, // |cumulative_mangle_load - cumulative_doblado_load|
    pub priority_score: f64,
    pub reason: ScheduleReason,
}

// ==========================================
// BalanceMetrics - 均衡指标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceMetrics {
    pub optimal_balance: f64,
    pub current_mangle_load: f64,
    pub current_doblado_load: f64,
    pub balance_difference: f64,
    pub efficiency: f64, // 0..=100
}

impl BalanceMetrics {
    /// 空排程的指标 (全零, 效率 100)
    pub fn empty() -> Self {
        Self {
            optimal_balance: 0.0,
            current_mangle_load: 0.0,
            current_doblado_load: 0.0,
            balance_difference: 0.0,
            efficiency: 100.0,
        }
    }
}
