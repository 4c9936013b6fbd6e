// ==========================================
// 洗涤分线排程系统 - 单日聚合引擎
// ==========================================
// 职责: 按客户汇总当日称重与件数记录
// 输入: 称重记录 + 件数记录 + 分类函数
// 输出: DailyAggregate (每客户一条 ClientDayTally + 当日合计)
// ==========================================
// 红线:
// - 格式错误的记录不计入合计, 但不中断聚合
// - 只有称重没有件数的客户同样产出记录 (total_items = 0, 无实际分线)
// - 客户顺序 = 首次出现顺序 (先称重记录, 后件数记录)
// ==========================================

use crate::domain::client_day::{ClientDayTally, DailyAggregate};
use crate::domain::intake::{ItemRecord, WeightRecord};
use crate::domain::types::Line;
use std::collections::HashMap;
use tracing::{debug, warn};

/// 单客户累加器
#[derive(Debug, Default)]
struct ClientAccumulator {
    client_id: String,
    client_name: String,
    weight: f64,
    items: f64,
    mangle_items: f64,
    doblado_items: f64,
    has_items: bool,
}

// ==========================================
// DailyAggregator - 单日聚合引擎
// ==========================================
pub struct DailyAggregator {
    // 无状态引擎,不需要注入依赖
}

impl DailyAggregator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 聚合单日记录
    ///
    /// # 参数
    /// - `weight_records`: 当日称重记录
    /// - `item_records`: 当日件数记录
    /// - `classify`: 产品名 → 处理线
    ///
    /// # 返回
    /// 当日聚合结果（总是成功）
    pub fn aggregate<F>(
        &self,
        weight_records: &[WeightRecord],
        item_records: &[ItemRecord],
        classify: F,
    ) -> DailyAggregate
    where
        F: Fn(&str) -> Line,
    {
        let mut accumulators: Vec<ClientAccumulator> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut excluded_weight_records = 0usize;
        let mut excluded_item_records = 0usize;

        // 1. 称重记录
        for record in weight_records {
            let Some(slot) =
                Self::client_slot(&mut accumulators, &mut index, &record.client_id, &record.client_name)
            else {
                excluded_weight_records += 1;
                continue;
            };

            if !record.is_well_formed() {
                excluded_weight_records += 1;
                continue;
            }
            accumulators[slot].weight += record.weight.unwrap_or(0.0);
        }

        // 2. 件数记录 (同时按处理线拆分)
        let mut day_mangle_items = 0.0;
        let mut day_doblado_items = 0.0;
        for record in item_records {
            let Some(slot) =
                Self::client_slot(&mut accumulators, &mut index, &record.client_id, &record.client_name)
            else {
                excluded_item_records += 1;
                continue;
            };

            if !record.is_well_formed() {
                excluded_item_records += 1;
                continue;
            }

            let quantity = record.quantity.unwrap_or(0.0);
            let line = classify(record.product_name.as_deref().unwrap_or(""));
            let acc = &mut accumulators[slot];
            acc.items += quantity;
            acc.has_items = true;
            match line {
                Line::Mangle => {
                    acc.mangle_items += quantity;
                    day_mangle_items += quantity;
                }
                Line::Doblado => {
                    acc.doblado_items += quantity;
                    day_doblado_items += quantity;
                }
            }
        }

        if excluded_weight_records > 0 || excluded_item_records > 0 {
            warn!(
                excluded_weight_records,
                excluded_item_records, "存在格式错误的记录，已排除在合计之外"
            );
        }

        // 3. 当日合计 + 占比
        let total_day_weight: f64 = accumulators.iter().map(|a| a.weight).sum();
        let total_day_items: f64 = accumulators.iter().map(|a| a.items).sum();

        let tallies: Vec<ClientDayTally> = accumulators
            .into_iter()
            .map(|acc| ClientDayTally {
                percentage_of_day_weight: share_pct(acc.weight, total_day_weight),
                percentage_of_day_items: share_pct(acc.items, total_day_items),
                actual_mangle_items: acc.has_items.then_some(acc.mangle_items),
                actual_doblado_items: acc.has_items.then_some(acc.doblado_items),
                client_id: acc.client_id,
                client_name: acc.client_name,
                total_weight: acc.weight,
                total_items: acc.items,
            })
            .collect();

        debug!(
            clients_count = tallies.len(),
            total_day_weight,
            total_day_items,
            day_mangle_items,
            day_doblado_items,
            "单日聚合完成"
        );

        DailyAggregate {
            tallies,
            total_day_weight,
            total_day_items,
            day_mangle_items,
            day_doblado_items,
            excluded_weight_records,
            excluded_item_records,
        }
    }

    /// 定位（或登记）客户累加器
    ///
    /// # 返回
    /// - Some(idx): 累加器下标
    /// - None: client_id 为空, 记录无法归属
    fn client_slot(
        accumulators: &mut Vec<ClientAccumulator>,
        index: &mut HashMap<String, usize>,
        client_id: &str,
        client_name: &str,
    ) -> Option<usize> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return None;
        }

        if let Some(&slot) = index.get(client_id) {
            let acc = &mut accumulators[slot];
            if acc.client_name.is_empty() {
                acc.client_name = client_name.trim().to_string();
            }
            return Some(slot);
        }

        accumulators.push(ClientAccumulator {
            client_id: client_id.to_string(),
            client_name: client_name.trim().to_string(),
            ..Default::default()
        });
        let slot = accumulators.len() - 1;
        index.insert(client_id.to_string(), slot);
        Some(slot)
    }
}

impl Default for DailyAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// 占比 (0..=100), 分母为 0 时为 0
fn share_pct(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}
