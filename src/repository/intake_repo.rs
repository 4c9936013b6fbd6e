// ==========================================
// 洗涤分线排程系统 - 入厂记录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 字段原样落库/读出, 缺失或无法解析的值保持 None,
//       是否计入合计由聚合引擎判定
// ==========================================

use crate::domain::intake::{ItemRecord, WeightRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

/// 单日写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayWriteCounts {
    pub replaced_rows: usize,
    pub weight_rows: usize,
    pub item_rows: usize,
}

/// 时间戳落库格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// 业务日期落库格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// IntakeRecordRepository - 入厂记录仓储
// ==========================================
/// 职责: 管理 intake_weight_record / intake_item_record 表
pub struct IntakeRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl IntakeRecordRepository {
    /// 创建新的 IntakeRecordRepository 实例
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 批量写入称重记录（事务化）
    ///
    /// # 返回
    /// 写入行数
    pub fn insert_weight_records(
        &self,
        business_date: NaiveDate,
        import_batch_id: &str,
        records: &[WeightRecord],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = begin(&mut conn)?;
        let count = insert_weight_rows(&tx, business_date, import_batch_id, records)?;
        commit(tx)?;
        Ok(count)
    }

    /// 批量写入件数记录（事务化）
    pub fn insert_item_records(
        &self,
        business_date: NaiveDate,
        import_batch_id: &str,
        records: &[ItemRecord],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = begin(&mut conn)?;
        let count = insert_item_rows(&tx, business_date, import_batch_id, records)?;
        commit(tx)?;
        Ok(count)
    }

    /// 删除某业务日期的全部记录
    ///
    /// # 返回
    /// 删除行数（称重 + 件数）
    pub fn delete_by_date(&self, business_date: NaiveDate) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = begin(&mut conn)?;
        let count = delete_day_rows(&tx, business_date)?;
        commit(tx)?;
        Ok(count)
    }

    /// 写入一个业务日期的一批记录（单事务）
    ///
    /// # 参数
    /// - `replace_existing`: true 时先删除该日期已有的全部记录
    ///
    /// # 返回
    /// 任一步失败则整体回滚, 该日期保持原样
    pub fn write_day(
        &self,
        business_date: NaiveDate,
        import_batch_id: &str,
        weight_records: &[WeightRecord],
        item_records: &[ItemRecord],
        replace_existing: bool,
    ) -> RepositoryResult<DayWriteCounts> {
        let mut conn = self.get_conn()?;
        let tx = begin(&mut conn)?;

        let replaced_rows = if replace_existing {
            delete_day_rows(&tx, business_date)?
        } else {
            0
        };
        let weight_rows = insert_weight_rows(&tx, business_date, import_batch_id, weight_records)?;
        let item_rows = insert_item_rows(&tx, business_date, import_batch_id, item_records)?;

        commit(tx)?;
        Ok(DayWriteCounts {
            replaced_rows,
            weight_rows,
            item_rows,
        })
    }

    /// 用新批次整体替换某业务日期的记录（单事务）
    pub fn replace_day(
        &self,
        business_date: NaiveDate,
        import_batch_id: &str,
        weight_records: &[WeightRecord],
        item_records: &[ItemRecord],
    ) -> RepositoryResult<DayWriteCounts> {
        self.write_day(business_date, import_batch_id, weight_records, item_records, true)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 查询某业务日期的称重记录（按写入顺序）
    pub fn find_weight_records_by_date(
        &self,
        business_date: NaiveDate,
    ) -> RepositoryResult<Vec<WeightRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT client_id, client_name, weight, recorded_at
            FROM intake_weight_record
            WHERE business_date = ?1
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![business_date.format(DATE_FORMAT).to_string()], |row| {
            Ok(WeightRecord {
                client_id: row.get(0)?,
                client_name: row.get(1)?,
                weight: row.get(2)?,
                timestamp: parse_timestamp(row.get::<_, Option<String>>(3)?),
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// 查询某业务日期的件数记录（按写入顺序）
    pub fn find_item_records_by_date(
        &self,
        business_date: NaiveDate,
    ) -> RepositoryResult<Vec<ItemRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT client_id, client_name, product_name, quantity, added_at
            FROM intake_item_record
            WHERE business_date = ?1
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![business_date.format(DATE_FORMAT).to_string()], |row| {
            Ok(ItemRecord {
                client_id: row.get(0)?,
                client_name: row.get(1)?,
                product_name: row.get(2)?,
                quantity: row.get(3)?,
                added_at: parse_timestamp(row.get::<_, Option<String>>(4)?),
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// 列出存在记录的业务日期（升序）
    pub fn list_business_dates(&self) -> RepositoryResult<Vec<NaiveDate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT business_date FROM intake_weight_record
            UNION
            SELECT business_date FROM intake_item_record
            ORDER BY 1
            "#,
        )?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut dates = Vec::new();
        for row in rows {
            let raw = row?;
            let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map_err(|_| RepositoryError::InvalidBusinessDate(raw.clone()))?;
            dates.push(date);
        }
        Ok(dates)
    }
}

// ==========================================
// 事务内写入步骤
// ==========================================

fn begin(conn: &mut Connection) -> RepositoryResult<Transaction<'_>> {
    conn.transaction()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
}

fn commit(tx: Transaction<'_>) -> RepositoryResult<()> {
    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
}

fn insert_weight_rows(
    tx: &Transaction<'_>,
    business_date: NaiveDate,
    import_batch_id: &str,
    records: &[WeightRecord],
) -> RepositoryResult<usize> {
    let date = business_date.format(DATE_FORMAT).to_string();
    let mut stmt = tx.prepare(
        r#"
        INSERT INTO intake_weight_record (
            business_date, client_id, client_name, weight, recorded_at, import_batch_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )?;

    let mut count = 0;
    for record in records {
        count += stmt.execute(params![
            date,
            record.client_id,
            record.client_name,
            record.weight,
            record.timestamp.map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
            import_batch_id,
        ])?;
    }
    Ok(count)
}

fn insert_item_rows(
    tx: &Transaction<'_>,
    business_date: NaiveDate,
    import_batch_id: &str,
    records: &[ItemRecord],
) -> RepositoryResult<usize> {
    let date = business_date.format(DATE_FORMAT).to_string();
    let mut stmt = tx.prepare(
        r#"
        INSERT INTO intake_item_record (
            business_date, client_id, client_name, product_name, quantity, added_at,
            import_batch_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )?;

    let mut count = 0;
    for record in records {
        count += stmt.execute(params![
            date,
            record.client_id,
            record.client_name,
            record.product_name,
            record.quantity,
            record.added_at.map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
            import_batch_id,
        ])?;
    }
    Ok(count)
}

fn delete_day_rows(tx: &Transaction<'_>, business_date: NaiveDate) -> RepositoryResult<usize> {
    let date = business_date.format(DATE_FORMAT).to_string();
    let weights = tx.execute(
        "DELETE FROM intake_weight_record WHERE business_date = ?1",
        params![date],
    )?;
    let items = tx.execute(
        "DELETE FROM intake_item_record WHERE business_date = ?1",
        params![date],
    )?;
    Ok(weights + items)
}

/// 解析落库时间戳；无法解析视为缺失
fn parse_timestamp(raw: Option<String>) -> Option<NaiveDateTime> {
    raw.and_then(|s| NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, IntakeRecordRepository) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = open_sqlite_connection(temp_file.path().to_str().unwrap()).unwrap();
        init_schema(&conn).unwrap();
        (
            temp_file,
            IntakeRecordRepository::from_connection(Arc::new(Mutex::new(conn))),
        )
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_weight_records_by_date() {
        let (_tmp, repo) = setup();
        let ts = date(2).and_hms_opt(9, 15, 0).unwrap();
        let records = vec![
            WeightRecord {
                client_id: "C1".to_string(),
                client_name: "Hotel Sol".to_string(),
                weight: Some(120.5),
                timestamp: Some(ts),
            },
            WeightRecord {
                client_id: "C2".to_string(),
                client_name: "Clinica".to_string(),
                weight: None,
                timestamp: None,
            },
        ];

        assert_eq!(repo.insert_weight_records(date(2), "B1", &records).unwrap(), 2);
        assert_eq!(repo.insert_weight_records(date(3), "B2", &records[..1]).unwrap(), 1);

        let loaded = repo.find_weight_records_by_date(date(2)).unwrap();
        assert_eq!(loaded, records);
        assert!(repo.find_weight_records_by_date(date(4)).unwrap().is_empty());
        assert_eq!(repo.list_business_dates().unwrap(), vec![date(2), date(3)]);
    }

    #[test]
    fn test_item_records_and_delete() {
        let (_tmp, repo) = setup();
        let records = vec![ItemRecord {
            client_id: "C1".to_string(),
            client_name: "Hotel Sol".to_string(),
            product_name: Some("Queen Flat Sheet".to_string()),
            quantity: Some(40.0),
            added_at: Some(date(2).and_hms_opt(10, 0, 0).unwrap()),
        }];

        repo.insert_item_records(date(2), "B1", &records).unwrap();
        assert_eq!(repo.find_item_records_by_date(date(2)).unwrap(), records);

        assert_eq!(repo.delete_by_date(date(2)).unwrap(), 1);
        assert!(repo.find_item_records_by_date(date(2)).unwrap().is_empty());
    }

    fn weight(client_id: &str, kg: f64) -> WeightRecord {
        WeightRecord {
            client_id: client_id.to_string(),
            client_name: client_id.to_string(),
            weight: Some(kg),
            timestamp: Some(date(2).and_hms_opt(8, 0, 0).unwrap()),
        }
    }

    fn item(client_id: &str, product: &str, quantity: f64) -> ItemRecord {
        ItemRecord {
            client_id: client_id.to_string(),
            client_name: client_id.to_string(),
            product_name: Some(product.to_string()),
            quantity: Some(quantity),
            added_at: Some(date(2).and_hms_opt(9, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_replace_day_swaps_both_tables() {
        let (_tmp, repo) = setup();
        repo.write_day(date(2), "B1", &[weight("C1", 10.0)], &[item("C1", "Sheet", 5.0)], false)
            .unwrap();

        let counts = repo
            .replace_day(date(2), "B2", &[weight("C2", 20.0)], &[item("C2", "Towel", 7.0)])
            .unwrap();
        assert_eq!(
            counts,
            DayWriteCounts {
                replaced_rows: 2,
                weight_rows: 1,
                item_rows: 1,
            }
        );

        let weights = repo.find_weight_records_by_date(date(2)).unwrap();
        let items = repo.find_item_records_by_date(date(2)).unwrap();
        assert_eq!(weights, vec![weight("C2", 20.0)]);
        assert_eq!(items, vec![item("C2", "Towel", 7.0)]);
    }

    #[test]
    fn test_replace_day_rolls_back_on_item_failure() {
        let (tmp, repo) = setup();
        repo.write_day(date(2), "B1", &[weight("C1", 10.0)], &[item("C1", "Sheet", 5.0)], false)
            .unwrap();

        // 件数表写入失败
        {
            let conn = open_sqlite_connection(tmp.path().to_str().unwrap()).unwrap();
            conn.execute_batch(
                r#"
                CREATE TRIGGER reject_item_insert BEFORE INSERT ON intake_item_record
                BEGIN
                    SELECT RAISE(ABORT, 'item insert rejected');
                END;
                "#,
            )
            .unwrap();
        }

        let result = repo.replace_day(
            date(2),
            "B2",
            &[weight("C2", 20.0)],
            &[item("C2", "Towel", 7.0)],
        );
        assert!(result.is_err());

        // 该日期保持原样
        assert_eq!(
            repo.find_weight_records_by_date(date(2)).unwrap(),
            vec![weight("C1", 10.0)]
        );
        assert_eq!(
            repo.find_item_records_by_date(date(2)).unwrap(),
            vec![item("C1", "Sheet", 5.0)]
        );
    }

    #[test]
    fn test_unparsable_business_date_is_an_error() {
        let (tmp, repo) = setup();
        {
            let conn = open_sqlite_connection(tmp.path().to_str().unwrap()).unwrap();
            conn.execute(
                "INSERT INTO intake_weight_record (business_date, client_id, client_name) \
                 VALUES ('03/02/2026', 'C1', 'Hotel Sol')",
                [],
            )
            .unwrap();
        }

        match repo.list_business_dates() {
            Err(RepositoryError::InvalidBusinessDate(raw)) => assert_eq!(raw, "03/02/2026"),
            other => panic!("Expected InvalidBusinessDate, got {:?}", other),
        }
    }
}
