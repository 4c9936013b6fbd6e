// ==========================================
// 洗涤分线排程系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod classification_repo;
pub mod error;
pub mod intake_repo;

// 重导出核心仓储
pub use classification_repo::{ClassificationOverrideRepository, ProductLineOverrideRow};
pub use error::{RepositoryError, RepositoryResult};
pub use intake_repo::{DayWriteCounts, IntakeRecordRepository};
