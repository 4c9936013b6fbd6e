// ==========================================
// 洗涤分线排程系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::balance_config::{default_mangle_keywords, BalanceConfig, ScoringWeights};
use crate::config::config_reader::{BalanceConfigReader, ConfigResult};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 随排程结果一起输出, 便于事后解释评分口径
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取数值配置；缺失、格式错误、非有限或为负时回退默认值（记录告警，不中断计算）
    fn get_number_or_default(&self, key: &str, default: f64) -> ConfigResult<f64> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match parse_non_negative(&raw) {
                Some(v) => Ok(v),
                None => {
                    warn!(key, value = %raw, default, "配置值无效（须为非负有限数），使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 一次性读取完整均衡配置
    pub async fn load_balance_config(&self) -> ConfigResult<BalanceConfig> {
        Ok(BalanceConfig {
            scoring: self.get_scoring_weights().await?,
            mangle_keywords: self.get_mangle_keywords().await?,
        })
    }
}

#[async_trait]
impl BalanceConfigReader for ConfigManager {
    async fn get_scoring_weights(&self) -> ConfigResult<ScoringWeights> {
        let defaults = ScoringWeights::default();
        let weights = ScoringWeights {
            balance_improvement_weight: self.get_number_or_default(
                config_keys::BALANCE_IMPROVEMENT_WEIGHT,
                defaults.balance_improvement_weight,
            )?,
            weight_factor_scale: self.get_number_or_default(
                config_keys::WEIGHT_FACTOR_SCALE,
                defaults.weight_factor_scale,
            )?,
            area_preference_bonus: self.get_number_or_default(
                config_keys::AREA_PREFERENCE_BONUS,
                defaults.area_preference_bonus,
            )?,
            high_volume_share: self.get_number_or_default(
                config_keys::HIGH_VOLUME_SHARE,
                defaults.high_volume_share,
            )?,
        };
        Ok(weights)
    }

    /// 配置格式为 JSON 数组: ["sheet", "duvet", ...]
    /// 格式错误或为空数组时回退默认关键字
    async fn get_mangle_keywords(&self) -> ConfigResult<Vec<String>> {
        let raw = match self.get_config_value(config_keys::MANGLE_KEYWORDS)? {
            Some(v) => v,
            None => return Ok(default_mangle_keywords()),
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(list) => {
                let keywords: Vec<String> = list
                    .iter()
                    .map(|k| crate::domain::normalize_product_key(k))
                    .filter(|k| !k.is_empty())
                    .collect();
                if keywords.is_empty() {
                    warn!("mangle_keywords 为空，使用默认关键字");
                    Ok(default_mangle_keywords())
                } else {
                    Ok(keywords)
                }
            }
            Err(e) => {
                warn!(error = %e, "mangle_keywords 解析失败，使用默认关键字");
                Ok(default_mangle_keywords())
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 评分权重
    pub const BALANCE_IMPROVEMENT_WEIGHT: &str = "balance_improvement_weight";
    pub const WEIGHT_FACTOR_SCALE: &str = "weight_factor_scale";
    pub const AREA_PREFERENCE_BONUS: &str = "area_preference_bonus";

    // 大客户阈值（占当日重量比例）
    pub const HIGH_VOLUME_SHARE: &str = "high_volume_share";

    // 分类规则
    pub const MANGLE_KEYWORDS: &str = "mangle_keywords"; // JSON 数组

    // 数值型配置项
    pub const NUMERIC_KEYS: &[&str] = &[
        BALANCE_IMPROVEMENT_WEIGHT,
        WEIGHT_FACTOR_SCALE,
        AREA_PREFERENCE_BONUS,
        HIGH_VOLUME_SHARE,
    ];
}

/// 解析数值配置项：必须是非负的有限数
pub fn parse_non_negative(raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => None,
    }
}
