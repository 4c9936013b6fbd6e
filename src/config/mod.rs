// ==========================================
// 洗涤分线排程系统 - 配置层
// ==========================================
// 职责: 评分权重与分类关键字配置
// 存储: config_kv 表
// ==========================================

pub mod balance_config;
pub mod config_manager;
pub mod config_reader;

// 重导出核心配置
pub use balance_config::{
    default_mangle_keywords, BalanceConfig, ScoringWeights, DEFAULT_MANGLE_KEYWORDS,
};
pub use config_manager::{config_keys, parse_non_negative, ConfigManager};
pub use config_reader::{BalanceConfigReader, ConfigResult};
