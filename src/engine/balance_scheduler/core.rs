use super::scoring::{matches_deficit_line, score_candidate, CandidateScore, LoadState};
use crate::config::balance_config::ScoringWeights;
use crate::domain::client_day::ClientDayRecord;
use crate::domain::schedule::{BalanceMetrics, ScheduleEntry};
use crate::domain::types::ScheduleReason;
use crate::engine::balance_metrics::BalanceMetricsCalculator;
use tracing::{debug, instrument};

/// 评分并列判定容差：差值不超过该值视为同分，保留先出现的客户
const SCORE_EPSILON: f64 = 1e-9;

// ==========================================
// BalanceScheduler - 双线均衡排程引擎
// ==========================================
pub struct BalanceScheduler {
    weights: ScoringWeights,
}

impl BalanceScheduler {
    /// 构造函数
    ///
    /// # 参数
    /// - `weights`: 评分权重
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 生成排程 + 均衡指标
    ///
    /// # 参数
    /// - `records`: 当日全部客户的分线估算
    /// - `total_day_weight`: 当日总重量
    ///
    /// # 返回
    /// (按处理顺序排列的排程条目, 均衡指标)
    #[instrument(skip(self, records), fields(clients_count = records.len()))]
    pub fn schedule(
        &self,
        records: &[ClientDayRecord],
        total_day_weight: f64,
    ) -> (Vec<ScheduleEntry>, BalanceMetrics) {
        let entries = self.build_sequence(records, total_day_weight);
        let metrics = BalanceMetricsCalculator::new().compute(&entries);

        debug!(
            efficiency = metrics.efficiency,
            balance_difference = metrics.balance_difference,
            "均衡排程完成"
        );

        (entries, metrics)
    }

    /// 贪心排序
    ///
    /// 每一轮对剩余客户全部重新评分, 选出 priority_score 最高者：
    /// 1) balance_improvement = max(0, 当前差距 - 选入后差距)
    /// 2) weight_factor = 客户重量 / 当日总重量 * weight_factor_scale
    /// 3) area_preference = 主导线 == 落后线 ? area_preference_bonus : 0
    ///
    /// 并列规则: 同分时保留输入顺序中最先出现的客户
    pub fn build_sequence(
        &self,
        records: &[ClientDayRecord],
        total_day_weight: f64,
    ) -> Vec<ScheduleEntry> {
        // 剩余客户以下标表示, 保持输入顺序
        let mut remaining: Vec<usize> = (0..records.len()).collect();
        let mut state = LoadState::default();
        let mut entries = Vec::with_capacity(records.len());

        while !remaining.is_empty() {
            let (position, score) = self.select_next(records, &remaining, &state, total_day_weight);
            let record = &records[remaining[position]];
            let sequence = entries.len() + 1;

            let reason = self.derive_reason(record, &score, &state, total_day_weight, sequence);
            state = state.after(record);

            entries.push(ScheduleEntry {
                sequence,
                client_id: record.client_id.clone(),
                client_name: record.client_name.clone(),
                total_weight: record.total_weight,
                estimated_mangle_items: record.estimated_mangle_items,
                estimated_doblado_items: record.estimated_doblado_items,
                mangle_percentage: record.mangle_percentage,
                doblado_percentage: record.doblado_percentage,
                cumulative_mangle_load: state.cumulative_mangle,
                cumulative_doblado_load: state.cumulative_doblado,
                load_balance: state.diff(),
                priority_score: score.priority_score,
                reason,
            });

            remaining.remove(position);
        }

        entries
    }

    /// 选出本轮得分最高的客户
    ///
    /// # 返回
    /// (在 remaining 中的位置, 评分明细)
    fn select_next(
        &self,
        records: &[ClientDayRecord],
        remaining: &[usize],
        state: &LoadState,
        total_day_weight: f64,
    ) -> (usize, CandidateScore) {
        let mut best_position = 0;
        let mut best_score =
            score_candidate(&records[remaining[0]], state, total_day_weight, &self.weights);

        for (position, &idx) in remaining.iter().enumerate().skip(1) {
            let score = score_candidate(&records[idx], state, total_day_weight, &self.weights);
            if score.priority_score > best_score.priority_score + SCORE_EPSILON {
                best_position = position;
                best_score = score;
            }
        }

        (best_position, best_score)
    }

    /// 生成排序原因（按优先级取第一个满足的条件）
    ///
    /// `state` 为选入之前的累计负载
    fn derive_reason(
        &self,
        record: &ClientDayRecord,
        score: &CandidateScore,
        state: &LoadState,
        total_day_weight: f64,
        sequence: usize,
    ) -> ScheduleReason {
        if score.balance_improvement > 0.0 {
            ScheduleReason::ImprovesBalance
        } else if record.total_weight > self.weights.high_volume_share * total_day_weight {
            ScheduleReason::HighVolumeClient
        } else if sequence == 1 {
            ScheduleReason::SeedSelection
        } else if matches_deficit_line(record, state) {
            ScheduleReason::BalancesDeficitLine
        } else {
            ScheduleReason::SequentialProcessing
        }
    }
}

impl Default for BalanceScheduler {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}
