// ==========================================
// 洗涤分线排程系统 - 分类覆写仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 主键为规范化后的产品名; 覆写变更后由上层负责作废已算结果
// ==========================================

use crate::domain::classification::{normalize_product_key, OverrideEntry, OverrideTable};
use crate::domain::types::Line;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// 覆写表行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLineOverrideRow {
    pub product_key: String,
    pub line: Line,
    pub example_product_name: String,
    pub updated_at: String,
}

// ==========================================
// ClassificationOverrideRepository - 分类覆写仓储
// ==========================================
pub struct ClassificationOverrideRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClassificationOverrideRepository {
    /// 创建新的 ClassificationOverrideRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增或更新覆写
    ///
    /// # 返回
    /// 规范化后的产品键
    pub fn upsert(&self, product_name: &str, line: Line) -> RepositoryResult<String> {
        let product_key = normalize_product_key(product_name);
        if product_key.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "product_name".to_string(),
                message: "产品名不能为空".to_string(),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO product_line_override (product_key, line, example_product_name)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(product_key) DO UPDATE SET
                line = excluded.line,
                example_product_name = excluded.example_product_name,
                updated_at = datetime('now')
            "#,
            params![product_key, line.to_string(), product_name.trim()],
        )?;
        Ok(product_key)
    }

    /// 删除覆写
    ///
    /// # 返回
    /// - true: 已删除
    /// - false: 不存在
    pub fn delete(&self, product_name: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM product_line_override WHERE product_key = ?1",
            params![normalize_product_key(product_name)],
        )?;
        Ok(affected > 0)
    }

    /// 按产品名查询覆写（自动规范化）
    pub fn find_by_product(
        &self,
        product_name: &str,
    ) -> RepositoryResult<Option<ProductLineOverrideRow>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT product_key, line, example_product_name, updated_at
                FROM product_line_override
                WHERE product_key = ?1
                "#,
                params![normalize_product_key(product_name)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(into_override_row).transpose()
    }

    /// 列出全部覆写（按产品键排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<ProductLineOverrideRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT product_key, line, example_product_name, updated_at
            FROM product_line_override
            ORDER BY product_key
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(into_override_row(row?)?);
        }
        Ok(result)
    }

    /// 加载覆写表快照（供单次计算只读使用）
    pub fn load_table(&self) -> RepositoryResult<OverrideTable> {
        let mut table = OverrideTable::new();
        for row in self.list_all()? {
            table.insert_normalized(
                row.product_key,
                OverrideEntry {
                    line: row.line,
                    example_product_name: row.example_product_name,
                },
            );
        }
        Ok(table)
    }
}

fn into_override_row(
    (product_key, line, example_product_name, updated_at): (String, String, String, String),
) -> RepositoryResult<ProductLineOverrideRow> {
    let line = Line::parse(&line).ok_or_else(|| RepositoryError::FieldValueError {
        field: "line".to_string(),
        message: format!("无法识别的处理线: {}", line),
    })?;
    Ok(ProductLineOverrideRow {
        product_key,
        line,
        example_product_name,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, ClassificationOverrideRepository) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = open_sqlite_connection(temp_file.path().to_str().unwrap()).unwrap();
        init_schema(&conn).unwrap();
        (
            temp_file,
            ClassificationOverrideRepository::from_connection(Arc::new(Mutex::new(conn))),
        )
    }

    #[test]
    fn test_upsert_normalizes_and_updates() {
        let (_tmp, repo) = setup();

        let key = repo.upsert("  Scrub   Shirt ", Line::Mangle).unwrap();
        assert_eq!(key, "scrub shirt");
        repo.upsert("SCRUB SHIRT", Line::Doblado).unwrap();

        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].line, Line::Doblado);
        assert_eq!(all[0].example_product_name, "SCRUB SHIRT");

        let found = repo.find_by_product("scrub shirt").unwrap().unwrap();
        assert_eq!(found.product_key, "scrub shirt");
    }

    #[test]
    fn test_blank_product_rejected() {
        let (_tmp, repo) = setup();
        let err = repo.upsert("   ", Line::Mangle).unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { .. }));
    }

    #[test]
    fn test_load_table_and_delete() {
        let (_tmp, repo) = setup();
        repo.upsert("Bath Mat", Line::Mangle).unwrap();
        repo.upsert("Sheet Bag", Line::Doblado).unwrap();

        let table = repo.load_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("bath mat").unwrap().line, Line::Mangle);

        assert!(repo.delete("bath  mat").unwrap());
        assert!(!repo.delete("bath mat").unwrap());
        assert!(repo.find_by_product("Bath Mat").unwrap().is_none());
    }
}
