// ==========================================
// 洗涤分线排程系统 - 引擎层
// ==========================================
// 职责: 实现估算与均衡规则, 不拼 SQL
// 红线: Engine 不拼 SQL, 排程每一步必须输出 reason
// 红线: 引擎全部为纯计算, 不返回错误
// ==========================================

pub mod aggregator;
pub mod balance_metrics;
pub mod balance_scheduler;
pub mod classifier;
pub mod estimator;
pub mod orchestrator;

// 重导出核心引擎
pub use aggregator::DailyAggregator;
pub use balance_metrics::BalanceMetricsCalculator;
pub use balance_scheduler::{BalanceScheduler, CandidateScore, LoadState};
pub use classifier::ProductClassifier;
pub use estimator::LineAllocationEstimator;
pub use orchestrator::{DailyBalanceOrchestrator, DailyBalanceResult};
