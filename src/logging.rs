// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text, // 人读格式
    Json, // 结构化 JSON（便于采集）
}

impl LogFormat {
    /// 从环境变量 LAUNDRY_LINE_BALANCE_LOG_FORMAT 读取（json / text，默认 text）
    pub fn from_env() -> Self {
        match std::env::var("LAUNDRY_LINE_BALANCE_LOG_FORMAT") {
            Ok(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=laundry_line_balance=trace,perf=info
/// - LAUNDRY_LINE_BALANCE_LOG_FORMAT: json / text
///
/// 日志写到 stderr, stdout 留给报表输出
pub fn init() {
    init_with_format(LogFormat::from_env());
}

/// 按指定格式初始化日志系统（重复初始化静默忽略）
pub fn init_with_format(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
