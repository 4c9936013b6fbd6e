// ==========================================
// 洗涤分线排程系统 - 均衡配置读取 Trait
// ==========================================
// 职责: 定义引擎编排所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::balance_config::ScoringWeights;
use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// BalanceConfigReader Trait
// ==========================================
// 实现者:
// - ConfigManager（从 config_kv 表读取）
// - BalanceConfig（内存配置, 测试/默认）
#[async_trait]
pub trait BalanceConfigReader: Send + Sync {
    /// 获取评分权重
    ///
    /// # 默认值
    /// - balance_improvement_weight = 10
    /// - weight_factor_scale = 1000
    /// - area_preference_bonus = 200
    /// - high_volume_share = 0.2
    async fn get_scoring_weights(&self) -> ConfigResult<ScoringWeights>;

    /// 获取平烫线关键字（有序）
    ///
    /// # 默认值
    /// - DEFAULT_MANGLE_KEYWORDS
    async fn get_mangle_keywords(&self) -> ConfigResult<Vec<String>>;
}
