// ==========================================
// 洗涤分线排程系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::BalanceApi;
use crate::config::ConfigManager;
use crate::repository::{ClassificationOverrideRepository, IntakeRecordRepository};

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 均衡排程API
    pub balance_api: Arc<BalanceApi>,

    /// 配置管理器（只读查询/快照）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并安装 SQL 性能统计
    /// 2. 初始化 schema（幂等）
    /// 3. 创建仓储与 API 实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let mut conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::perf::install_sqlite_tracing(&mut conn);
        crate::db::init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let intake_repo = Arc::new(IntakeRecordRepository::from_connection(conn.clone()));
        let override_repo = Arc::new(ClassificationOverrideRepository::from_connection(
            conn.clone(),
        ));
        let config_manager = Arc::new(ConfigManager::from_connection(conn));

        let balance_api = Arc::new(BalanceApi::new(
            intake_repo,
            override_repo,
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            balance_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级:
/// 1. 环境变量 LAUNDRY_LINE_BALANCE_DB_PATH
/// 2. 用户数据目录/laundry-line-balance/laundry_line_balance.db
/// 3. ./laundry_line_balance.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("LAUNDRY_LINE_BALANCE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./laundry_line_balance.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("laundry-line-balance");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("laundry_line_balance.db");
        }
    }

    path.to_string_lossy().to_string()
}
