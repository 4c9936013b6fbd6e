// ==========================================
// 洗涤分线排程系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (平烫线/折叠线双线负载估算与客户处理顺序建议)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 估算与均衡规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 性能统计
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ClassificationOrigin, Line, ScheduleReason};

// 领域实体
pub use domain::{
    BalanceMetrics, ClassificationEntry, ClientDayRecord, ItemRecord, OverrideTable,
    ScheduleEntry, WeightRecord,
};

// 引擎
pub use engine::{
    BalanceMetricsCalculator, BalanceScheduler, DailyAggregator, DailyBalanceOrchestrator,
    DailyBalanceResult, LineAllocationEstimator, ProductClassifier,
};

// API
pub use api::{ApiError, ApiResult, BalanceApi, DailyBalanceReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "洗涤分线排程系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
