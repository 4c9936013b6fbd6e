// ==========================================
// 洗涤分线排程系统 - 客户日指标
// ==========================================
// 职责: 聚合引擎输出 (ClientDayTally) 与分线估算结果 (ClientDayRecord)
// 红线: 每次重算全新生成, 生成后不可变
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ClientDayTally - 客户单日汇总 (聚合引擎输出)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDayTally {
    pub client_id: String,
    pub client_name: String,
    pub total_weight: f64,
    pub total_items: f64,
    // 仅当该客户当日存在件数记录时才有值
    pub actual_mangle_items: Option<f64>,
    pub actual_doblado_items: Option<f64>,
    pub percentage_of_day_weight: f64,
    pub percentage_of_day_items: f64,
}

impl ClientDayTally {
    /// 是否具备实际分线数据
    pub fn has_actual_split(&self) -> bool {
        self.actual_mangle_items.is_some() && self.actual_doblado_items.is_some()
    }
}

// ==========================================
// ClientDayRecord - 客户单日分线估算
// ==========================================
// 不变量:
// - mangle_percentage + doblado_percentage == 100
// - estimated_mangle_items + estimated_doblado_items == total_items
// - estimated_mangle_weight + estimated_doblado_weight == total_weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDayRecord {
    pub client_id: String,
    pub client_name: String,
    pub total_weight: f64,
    pub total_items: f64,
    pub actual_mangle_items: Option<f64>,
    pub actual_doblado_items: Option<f64>,
    pub percentage_of_day_weight: f64,
    pub percentage_of_day_items: f64,
    pub mangle_percentage: f64,
    pub doblado_percentage: f64,
    pub estimated_mangle_weight: f64,
    pub estimated_doblado_weight: f64,
    pub estimated_mangle_items: f64,
    pub estimated_doblado_items: f64,
}

// ==========================================
// DailyAggregate - 单日聚合结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub tallies: Vec<ClientDayTally>,
    pub total_day_weight: f64,
    pub total_day_items: f64,
    // 当日全部有效件数记录的实际分线合计 (兜底比例来源)
    pub day_mangle_items: f64,
    pub day_doblado_items: f64,
    pub excluded_weight_records: usize,
    pub excluded_item_records: usize,
}

impl DailyAggregate {
    /// 当日实际 Mangle 占比 (0..=100)
    ///
    /// # 返回
    /// - Some(pct): 当日存在已分类件数
    /// - None: 当日没有任何已分类件数 (调用方按 50/50 处理)
    pub fn day_mangle_ratio(&self) -> Option<f64> {
        let classified = self.day_mangle_items + self.day_doblado_items;
        if classified > 0.0 {
            Some(self.day_mangle_items / classified * 100.0)
        } else {
            None
        }
    }
}
