// ==========================================
// 洗涤分线排程系统 - 双线均衡排程引擎
// ==========================================
// 职责: 贪心排序当日全部客户, 使两线累计负载差距尽量小
// 输入: ClientDayRecord 列表 + 当日总重量
// 输出: ScheduleEntry 列表 (每步带 reason) + BalanceMetrics
// ==========================================
// 红线: 所有客户恰好排入一次; 每一步都必须输出 reason
// 注: 贪心近似, 不保证全局最优
// ==========================================

mod core;
mod scoring;


pub use self::core::BalanceScheduler;
pub use self::scoring::{CandidateScore, LoadState};
