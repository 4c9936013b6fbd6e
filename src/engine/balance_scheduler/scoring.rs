use crate::config::balance_config::ScoringWeights;
use crate::domain::client_day::ClientDayRecord;
use crate::domain::types::Line;

/// 两线累计负载
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadState {
    pub cumulative_mangle: f64,
    pub cumulative_doblado: f64,
}

impl LoadState {
    pub fn diff(&self) -> f64 {
        (self.cumulative_mangle - self.cumulative_doblado).abs()
    }

    /// 当前落后的处理线；两线相等时没有落后线
    pub fn behind_line(&self) -> Option<Line> {
        if self.cumulative_mangle < self.cumulative_doblado {
            Some(Line::Mangle)
        } else if self.cumulative_doblado < self.cumulative_mangle {
            Some(Line::Doblado)
        } else {
            None
        }
    }

    pub(super) fn after(&self, record: &ClientDayRecord) -> LoadState {
        LoadState {
            cumulative_mangle: self.cumulative_mangle + record.estimated_mangle_items,
            cumulative_doblado: self.cumulative_doblado + record.estimated_doblado_items,
        }
    }
}

/// 单个候选客户在某一轮的评分明细
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub balance_improvement: f64,
    pub weight_factor: f64,
    pub area_preference: f64,
    pub priority_score: f64,
}

/// 客户主导线；两线占比相等时没有主导线
pub(super) fn dominant_line(record: &ClientDayRecord) -> Option<Line> {
    if record.mangle_percentage > record.doblado_percentage {
        Some(Line::Mangle)
    } else if record.doblado_percentage > record.mangle_percentage {
        Some(Line::Doblado)
    } else {
        None
    }
}

/// 主导线是否恰为当前落后线
pub(super) fn matches_deficit_line(record: &ClientDayRecord, state: &LoadState) -> bool {
    match (state.behind_line(), dominant_line(record)) {
        (Some(behind), Some(dominant)) => behind == dominant,
        _ => false,
    }
}

pub(super) fn score_candidate(
    record: &ClientDayRecord,
    state: &LoadState,
    total_day_weight: f64,
    weights: &ScoringWeights,
) -> CandidateScore {
    let current_diff = state.diff();
    let after_diff = state.after(record).diff();
    let balance_improvement = (current_diff - after_diff).max(0.0);

    // 当日总重量为 0 (或非法) 时不计重量因子
    let weight_factor = if total_day_weight > 0.0 && total_day_weight.is_finite() {
        record.total_weight / total_day_weight * weights.weight_factor_scale
    } else {
        0.0
    };

    let area_preference = if matches_deficit_line(record, state) {
        weights.area_preference_bonus
    } else {
        0.0
    };

    CandidateScore {
        balance_improvement,
        weight_factor,
        area_preference,
        priority_score: balance_improvement * weights.balance_improvement_weight
            + weight_factor
            + area_preference,
    }
}
