// ==========================================
// 洗涤分线排程系统 - API 层
// ==========================================
// 职责: 面向调用方的业务接口, 组合仓储 + 引擎
// 约束: 输入校验在此层完成, 引擎只接收合法输入
// ==========================================

pub mod balance_api;
pub mod dto;
pub mod error;

pub use balance_api::{BalanceApi, MAX_RANGE_DAYS};
pub use dto::{DailyBalanceReport, DayProductSummary, RangeBalanceSummary, ScheduleEntryView};
pub use error::{ApiError, ApiResult};
