// ==========================================
// 洗涤分线排程系统 - 入厂原始记录
// ==========================================
// 职责: 承载外部存储提供的单日原始记录
// 红线: 字段缺失时保持 None, 有效性由聚合引擎判定
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// WeightRecord - 称重记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    pub client_id: String,
    pub client_name: String,
    pub weight: Option<f64>,              // 重量 (kg)
    pub timestamp: Option<NaiveDateTime>, // 称重时间
}

impl WeightRecord {
    /// 是否可计入重量合计
    ///
    /// 规则: client_id 非空 + 重量有限且非负 + 时间戳存在
    pub fn is_well_formed(&self) -> bool {
        !self.client_id.trim().is_empty()
            && self.timestamp.is_some()
            && matches!(self.weight, Some(w) if w.is_finite() && w >= 0.0)
    }
}

// ==========================================
// ItemRecord - 件数记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub client_id: String,
    pub client_name: String,
    pub product_name: Option<String>,
    pub quantity: Option<f64>,
    pub added_at: Option<NaiveDateTime>,
}

impl ItemRecord {
    /// 是否可计入件数合计
    ///
    /// 规则: client_id 非空 + 数量有限且非负 + 录入时间存在
    pub fn is_well_formed(&self) -> bool {
        !self.client_id.trim().is_empty()
            && self.added_at.is_some()
            && matches!(self.quantity, Some(q) if q.is_finite() && q >= 0.0)
    }
}
