// ==========================================
// 洗涤分线排程系统 - 入厂记录导入器
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 映射(记录 DQ 告警) → 落库
// 说明: 业务日期由调用方显式指定, 不从记录时间推断
// ==========================================

use crate::domain::intake::{ItemRecord, WeightRecord};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{DqWarning, IntakeFieldMapper};
use crate::importer::file_parser::UniversalFileParser;
use crate::repository::{DayWriteCounts, IntakeRecordRepository};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// IntakeImportSummary - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeImportSummary {
    pub batch_id: String,
    pub business_date: NaiveDate,
    pub weight_rows: usize,     // 称重文件有效行数
    pub item_rows: usize,       // 件数文件有效行数
    pub replaced_rows: usize,   // 覆盖导入时删除的旧记录数
    pub warnings: Vec<DqWarning>,
    pub elapsed_ms: u64,
}

// ==========================================
// IntakeImporter - 入厂记录导入器
// ==========================================
pub struct IntakeImporter {
    repo: Arc<IntakeRecordRepository>,
    parser: UniversalFileParser,
    mapper: IntakeFieldMapper,
}

impl IntakeImporter {
    pub fn new(repo: Arc<IntakeRecordRepository>) -> Self {
        Self {
            repo,
            parser: UniversalFileParser,
            mapper: IntakeFieldMapper,
        }
    }

    /// 导入某业务日期的称重/件数文件
    ///
    /// # 参数
    /// - business_date: 业务日期
    /// - weight_file / item_file: 可只提供其一
    /// - replace_existing: true 时先删除该日期已有记录
    ///
    /// # 返回
    /// 导入汇总（含 DQ 告警明细）
    #[instrument(skip(self, weight_file, item_file), fields(batch_id))]
    pub fn import_day(
        &self,
        business_date: NaiveDate,
        weight_file: Option<&Path>,
        item_file: Option<&Path>,
        replace_existing: bool,
    ) -> ImportResult<IntakeImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(batch_id = %batch_id, business_date = %business_date, "开始导入入厂记录");

        // === 步骤 1: 解析 + 映射（全部成功后再落库） ===
        let mut warnings = Vec::new();
        let weight_records = match weight_file {
            Some(path) => self.read_weight_file(path, &mut warnings)?,
            None => Vec::new(),
        };
        let item_records = match item_file {
            Some(path) => self.read_item_file(path, &mut warnings)?,
            None => Vec::new(),
        };
        debug!(
            weight_rows = weight_records.len(),
            item_rows = item_records.len(),
            "字段映射完成"
        );

        if !warnings.is_empty() {
            warn!(warnings = warnings.len(), "存在数据质量告警，相关值已置空");
        }

        // === 步骤 2: 落库（删除 + 两表写入同一事务） ===
        let counts = self.repo.write_day(
            business_date,
            &batch_id,
            &weight_records,
            &item_records,
            replace_existing,
        )?;
        let DayWriteCounts {
            replaced_rows,
            weight_rows,
            item_rows,
        } = counts;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            batch_id = %batch_id,
            weight_rows,
            item_rows,
            replaced_rows,
            elapsed_ms,
            "入厂记录导入完成"
        );

        Ok(IntakeImportSummary {
            batch_id,
            business_date,
            weight_rows,
            item_rows,
            replaced_rows,
            warnings,
            elapsed_ms,
        })
    }

    fn read_weight_file(
        &self,
        path: &Path,
        warnings: &mut Vec<DqWarning>,
    ) -> ImportResult<Vec<WeightRecord>> {
        let rows = self.parser.parse(path)?;
        self.mapper.check_required_columns(&rows)?;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.mapper.map_weight_row(row, idx + 2, warnings))
            .collect())
    }

    fn read_item_file(
        &self,
        path: &Path,
        warnings: &mut Vec<DqWarning>,
    ) -> ImportResult<Vec<ItemRecord>> {
        let rows = self.parser.parse(path)?;
        self.mapper.check_required_columns(&rows)?;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.mapper.map_item_row(row, idx + 2, warnings))
            .collect())
    }
}
