// ==========================================
// 洗涤分线排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod classification;
pub mod client_day;
pub mod intake;
pub mod schedule;
pub mod types;

// 重导出核心类型
pub use classification::{
    normalize_product_key, ClassificationEntry, OverrideEntry, OverrideTable,
};
pub use client_day::{ClientDayRecord, ClientDayTally, DailyAggregate};
pub use intake::{ItemRecord, WeightRecord};
pub use schedule::{BalanceMetrics, ScheduleEntry};
pub use types::{ClassificationOrigin, Line, ScheduleReason};
