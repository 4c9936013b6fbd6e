// ==========================================
// 洗涤分线排程系统 - 均衡排程 API
// ==========================================
// 职责:
// - 单日/区间均衡报表（按日期缓存）
// - 产品分类预览与人工覆写维护
// - 入厂记录导入
// 缓存规则:
// - 覆写或配置变更: 清空全部缓存
// - 导入某日记录: 作废该日缓存
// - 代次号 (generation) 防止计算期间发生变更后写回过期结果
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info, instrument};

use crate::api::dto::{DailyBalanceReport, DayProductSummary, RangeBalanceSummary};
use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, parse_non_negative, ConfigManager};
use crate::domain::classification::ClassificationEntry;
use crate::domain::types::Line;
use crate::engine::{DailyBalanceOrchestrator, DailyBalanceResult};
use crate::importer::{IntakeImportSummary, IntakeImporter};
use crate::repository::{
    ClassificationOverrideRepository, IntakeRecordRepository, ProductLineOverrideRow,
};

/// 区间分析最大天数
pub const MAX_RANGE_DAYS: i64 = 366;

// ==========================================
// ReportCache - 单日结果缓存
// ==========================================
#[derive(Default)]
struct ReportCache {
    entries: HashMap<NaiveDate, Arc<DailyBalanceResult>>,
    generation: u64,
}

pub struct BalanceApi {
    intake_repo: Arc<IntakeRecordRepository>,
    override_repo: Arc<ClassificationOverrideRepository>,
    config_manager: Arc<ConfigManager>,
    orchestrator: DailyBalanceOrchestrator<ConfigManager>,
    importer: IntakeImporter,
    cache: Mutex<ReportCache>,
}

impl BalanceApi {
    pub fn new(
        intake_repo: Arc<IntakeRecordRepository>,
        override_repo: Arc<ClassificationOverrideRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            orchestrator: DailyBalanceOrchestrator::new(config_manager.clone()),
            importer: IntakeImporter::new(intake_repo.clone()),
            intake_repo,
            override_repo,
            config_manager,
            cache: Mutex::new(ReportCache::default()),
        }
    }

    fn lock_cache(&self) -> ApiResult<MutexGuard<'_, ReportCache>> {
        self.cache
            .lock()
            .map_err(|e| ApiError::InternalError(format!("缓存锁获取失败: {}", e)))
    }

    // ==========================================
    // 均衡报表
    // ==========================================

    /// 计算（或读取缓存）单日均衡报表
    pub async fn analyze_day(&self, business_date: NaiveDate) -> ApiResult<DailyBalanceReport> {
        let _perf = crate::perf::PerfGuard::new("api.analyze_day");
        let result = self.day_result(business_date).await?;
        Ok(DailyBalanceReport::from_result(&result))
    }

    /// 计算闭区间 [from, to] 内每日报表
    ///
    /// 每日计算相互独立, 并发执行
    pub async fn analyze_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<RangeBalanceSummary> {
        let _perf = crate::perf::PerfGuard::new("api.analyze_range");
        if from > to {
            return Err(ApiError::InvalidInput(format!(
                "起始日期{}晚于结束日期{}",
                from, to
            )));
        }
        let span_days = (to - from).num_days() + 1;
        if span_days > MAX_RANGE_DAYS {
            return Err(ApiError::InvalidInput(format!(
                "日期区间过长: {}天（上限{}天）",
                span_days, MAX_RANGE_DAYS
            )));
        }

        let dates: Vec<NaiveDate> = from.iter_days().take(span_days as usize).collect();
        let results = join_all(dates.iter().map(|date| self.day_result(*date))).await;

        let mut days = Vec::with_capacity(results.len());
        for result in results {
            let result = result?;
            days.push(DailyBalanceReport::from_result(&result));
        }

        info!(from = %from, to = %to, days = days.len(), "区间均衡报表完成");
        Ok(RangeBalanceSummary::new(from, to, days))
    }

    #[instrument(skip(self))]
    async fn day_result(&self, business_date: NaiveDate) -> ApiResult<Arc<DailyBalanceResult>> {
        let generation = {
            let cache = self.lock_cache()?;
            if let Some(hit) = cache.entries.get(&business_date) {
                debug!("命中缓存");
                return Ok(hit.clone());
            }
            cache.generation
        };

        // 读取输入快照
        let weight_records = self.intake_repo.find_weight_records_by_date(business_date)?;
        let item_records = self.intake_repo.find_item_records_by_date(business_date)?;
        let overrides = self.override_repo.load_table()?;

        let result = Arc::new(
            self.orchestrator
                .execute_day(business_date, &weight_records, &item_records, &overrides)
                .await?,
        );

        let mut cache = self.lock_cache()?;
        if cache.generation == generation {
            cache.entries.insert(business_date, result.clone());
        } else {
            debug!("计算期间输入已变更，结果不写入缓存");
        }
        Ok(result)
    }

    /// 作废单日缓存
    pub fn invalidate_date(&self, business_date: NaiveDate) -> ApiResult<()> {
        let mut cache = self.lock_cache()?;
        cache.entries.remove(&business_date);
        cache.generation += 1;
        Ok(())
    }

    /// 清空全部缓存
    pub fn invalidate_all(&self) -> ApiResult<()> {
        let mut cache = self.lock_cache()?;
        cache.entries.clear();
        cache.generation += 1;
        Ok(())
    }

    /// 已缓存的日期数
    pub fn cached_days(&self) -> ApiResult<usize> {
        Ok(self.lock_cache()?.entries.len())
    }

    // ==========================================
    // 产品分类
    // ==========================================

    /// 分类预览（按当前覆写表与关键字规则）
    pub async fn preview_classification(
        &self,
        product_names: &[String],
    ) -> ApiResult<Vec<ClassificationEntry>> {
        let classifier = self.orchestrator.build_classifier().await?;
        let overrides = self.override_repo.load_table()?;
        Ok(product_names
            .iter()
            .map(|name| classifier.classify_entry(name, &overrides))
            .collect())
    }

    /// 当日出现的全部产品及其分类（按数量降序）
    pub async fn list_day_products(
        &self,
        business_date: NaiveDate,
    ) -> ApiResult<Vec<DayProductSummary>> {
        let _perf = crate::perf::PerfGuard::new("api.list_day_products");
        let classifier = self.orchestrator.build_classifier().await?;
        let overrides = self.override_repo.load_table()?;
        let item_records = self.intake_repo.find_item_records_by_date(business_date)?;

        let mut order: Vec<DayProductSummary> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in item_records.iter().filter(|r| r.is_well_formed()) {
            let raw_name = record.product_name.as_deref().unwrap_or("");
            let entry = classifier.classify_entry(raw_name, &overrides);
            let quantity = record.quantity.unwrap_or(0.0);

            match index.get(&entry.product_key) {
                Some(&idx) => {
                    order[idx].total_quantity += quantity;
                    order[idx].record_count += 1;
                }
                None => {
                    index.insert(entry.product_key.clone(), order.len());
                    order.push(DayProductSummary {
                        product_key: entry.product_key,
                        example_product_name: raw_name.trim().to_string(),
                        line: entry.line,
                        origin: entry.origin,
                        total_quantity: quantity,
                        record_count: 1,
                    });
                }
            }
        }

        order.sort_by(|a, b| b.total_quantity.total_cmp(&a.total_quantity));
        Ok(order)
    }

    /// 新增或更新人工覆写（清空全部缓存）
    pub fn upsert_override(
        &self,
        product_name: &str,
        line: Line,
    ) -> ApiResult<ProductLineOverrideRow> {
        if product_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("产品名不能为空".to_string()));
        }

        let product_key = self.override_repo.upsert(product_name, line)?;
        self.invalidate_all()?;
        info!(product_key = %product_key, line = %line, "分类覆写已更新");

        self.override_repo
            .find_by_product(&product_key)?
            .ok_or_else(|| ApiError::InternalError(format!("覆写写入后未找到: {}", product_key)))
    }

    /// 删除人工覆写（清空全部缓存）
    pub fn delete_override(&self, product_name: &str) -> ApiResult<()> {
        if !self.override_repo.delete(product_name)? {
            return Err(ApiError::NotFound(format!(
                "产品{}的分类覆写不存在",
                product_name.trim()
            )));
        }
        self.invalidate_all()?;
        info!(product_name = %product_name.trim(), "分类覆写已删除");
        Ok(())
    }

    /// 列出全部人工覆写
    pub fn list_overrides(&self) -> ApiResult<Vec<ProductLineOverrideRow>> {
        Ok(self.override_repo.list_all()?)
    }

    // ==========================================
    // 配置
    // ==========================================

    /// 更新全局配置项（清空全部缓存）
    pub fn set_config_value(&self, key: &str, value: &str) -> ApiResult<()> {
        let key = key.trim();
        let value = value.trim();

        if config_keys::NUMERIC_KEYS.contains(&key) {
            if parse_non_negative(value).is_none() {
                return Err(ApiError::InvalidInput(format!(
                    "配置项{}必须为非负数: {}",
                    key, value
                )));
            }
        } else if key == config_keys::MANGLE_KEYWORDS {
            serde_json::from_str::<Vec<String>>(value).map_err(|e| {
                ApiError::InvalidInput(format!("配置项{}必须为字符串 JSON 数组: {}", key, e))
            })?;
        } else {
            return Err(ApiError::InvalidInput(format!("未知配置项: {}", key)));
        }

        self.config_manager.set_global_config_value(key, value)?;
        self.invalidate_all()?;
        info!(key = %key, "配置已更新");
        Ok(())
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入某日入厂记录（作废该日缓存）
    pub fn import_day(
        &self,
        business_date: NaiveDate,
        weight_file: Option<&Path>,
        item_file: Option<&Path>,
        replace_existing: bool,
    ) -> ApiResult<IntakeImportSummary> {
        let _perf = crate::perf::PerfGuard::new("api.import_day");
        if weight_file.is_none() && item_file.is_none() {
            return Err(ApiError::InvalidInput(
                "至少需要提供称重文件或件数文件之一".to_string(),
            ));
        }

        let summary =
            self.importer
                .import_day(business_date, weight_file, item_file, replace_existing)?;
        self.invalidate_date(business_date)?;
        Ok(summary)
    }

    /// 存在记录的业务日期
    pub fn list_business_dates(&self) -> ApiResult<Vec<NaiveDate>> {
        Ok(self.intake_repo.list_business_dates()?)
    }
}
