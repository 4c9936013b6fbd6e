// ==========================================
// 洗涤分线排程系统 - 均衡排程参数
// ==========================================
// 职责: 评分权重 + 平烫线关键字规则 (含默认值)
// 说明: 默认值即标准评分口径, 不配置时行为不变
// ==========================================

use crate::config::config_reader::{BalanceConfigReader, ConfigResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 默认平烫线关键字 (有序子串规则, 命中任一即归 Mangle)
pub const DEFAULT_MANGLE_KEYWORDS: &[&str] = &[
    "sheet",
    "duvet",
    "pillowcase",
    "pillow case",
    "tablecloth",
    "table cloth",
    "napkin",
    "sabana",
    "sábana",
    "funda",
    "mantel",
    "servilleta",
    "edredon",
    "edredón",
];

// ==========================================
// ScoringWeights - 评分权重
// ==========================================
// priority_score = balance_improvement * balance_improvement_weight
//                + weight_share * weight_factor_scale
//                + (主导线 == 落后线 ? area_preference_bonus : 0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub balance_improvement_weight: f64,
    pub weight_factor_scale: f64,
    pub area_preference_bonus: f64,
    pub high_volume_share: f64, // 大客户判定阈值 (占当日重量比例)
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            balance_improvement_weight: 10.0,
            weight_factor_scale: 1000.0,
            area_preference_bonus: 200.0,
            high_volume_share: 0.2,
        }
    }
}

// ==========================================
// BalanceConfig - 内存配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub scoring: ScoringWeights,
    pub mangle_keywords: Vec<String>,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringWeights::default(),
            mangle_keywords: default_mangle_keywords(),
        }
    }
}

/// 默认关键字列表 (拥有所有权)
pub fn default_mangle_keywords() -> Vec<String> {
    DEFAULT_MANGLE_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

#[async_trait]
impl BalanceConfigReader for BalanceConfig {
    async fn get_scoring_weights(&self) -> ConfigResult<ScoringWeights> {
        Ok(self.scoring)
    }

    async fn get_mangle_keywords(&self) -> ConfigResult<Vec<String>> {
        Ok(self.mangle_keywords.clone())
    }
}
