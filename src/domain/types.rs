// ==========================================
// 洗涤分线排程系统 - 领域类型定义
// ==========================================
// 红线: 每件衣物只能归属一条处理线, 不存在"未分类"状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 处理线 (Processing Line)
// ==========================================
// Mangle: 平烫线 (床单/被套/台布等平面织物)
// Doblado: 人工折叠线
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Line {
    Mangle,  // 平烫线
    Doblado, // 折叠线
}

impl Line {
    /// 另一条处理线
    pub fn other(self) -> Line {
        match self {
            Line::Mangle => Line::Doblado,
            Line::Doblado => Line::Mangle,
        }
    }

    /// 从数据库/配置字符串解析（大小写不敏感）
    ///
    /// # 返回
    /// - Some(Line): 识别成功
    /// - None: 无法识别
    pub fn parse(value: &str) -> Option<Line> {
        match value.trim().to_uppercase().as_str() {
            "MANGLE" => Some(Line::Mangle),
            "DOBLADO" => Some(Line::Doblado),
            _ => None,
        }
    }

    /// i18n 键
    pub fn i18n_key(self) -> &'static str {
        match self {
            Line::Mangle => "line.mangle",
            Line::Doblado => "line.doblado",
        }
    }

    /// 本地化显示名
    pub fn label(self) -> String {
        crate::i18n::t(self.i18n_key())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Mangle => write!(f, "MANGLE"),
            Line::Doblado => write!(f, "DOBLADO"),
        }
    }
}

// ==========================================
// 分类来源 (Classification Origin)
// ==========================================
// 人工覆写永远优先于关键字默认规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationOrigin {
    Override,    // 人工覆写表
    DefaultRule, // 关键字默认规则
}

impl ClassificationOrigin {
    pub fn i18n_key(self) -> &'static str {
        match self {
            ClassificationOrigin::Override => "classification_origin.override",
            ClassificationOrigin::DefaultRule => "classification_origin.default_rule",
        }
    }
}

impl fmt::Display for ClassificationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationOrigin::Override => write!(f, "OVERRIDE"),
            ClassificationOrigin::DefaultRule => write!(f, "DEFAULT_RULE"),
        }
    }
}

// ==========================================
// 排序原因 (Schedule Reason)
// ==========================================
// 红线: 排程中每一步都必须输出 reason
// 判定优先级: ImprovesBalance > HighVolumeClient > SeedSelection
//            > BalancesDeficitLine > SequentialProcessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleReason {
    ImprovesBalance,      // 缩小两线差距
    HighVolumeClient,     // 大客户 (超过当日重量阈值)
    SeedSelection,        // 首位种子选择
    BalancesDeficitLine,  // 主导线恰为落后线
    SequentialProcessing, // 无区分因素, 顺序处理
}

impl ScheduleReason {
    /// i18n 键
    pub fn i18n_key(self) -> &'static str {
        match self {
            ScheduleReason::ImprovesBalance => "schedule_reason.improves_balance",
            ScheduleReason::HighVolumeClient => "schedule_reason.high_volume_client",
            ScheduleReason::SeedSelection => "schedule_reason.seed_selection",
            ScheduleReason::BalancesDeficitLine => "schedule_reason.balances_deficit_line",
            ScheduleReason::SequentialProcessing => "schedule_reason.sequential_processing",
        }
    }

    /// 当前语言下的可读标签
    pub fn label(self) -> String {
        crate::i18n::t(self.i18n_key())
    }
}

impl fmt::Display for ScheduleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleReason::ImprovesBalance => write!(f, "IMPROVES_BALANCE"),
            ScheduleReason::HighVolumeClient => write!(f, "HIGH_VOLUME_CLIENT"),
            ScheduleReason::SeedSelection => write!(f, "SEED_SELECTION"),
            ScheduleReason::BalancesDeficitLine => write!(f, "BALANCES_DEFICIT_LINE"),
            ScheduleReason::SequentialProcessing => write!(f, "SEQUENTIAL_PROCESSING"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_parse_and_display() {
        assert_eq!(Line::parse("mangle"), Some(Line::Mangle));
        assert_eq!(Line::parse(" DOBLADO "), Some(Line::Doblado));
        assert_eq!(Line::parse("press"), None);
        assert_eq!(Line::Mangle.to_string(), "MANGLE");
        assert_eq!(Line::Mangle.other(), Line::Doblado);
    }

    #[test]
    fn test_reason_serde_code() {
        let json = serde_json::to_string(&ScheduleReason::HighVolumeClient).unwrap();
        assert_eq!(json, "\"HIGH_VOLUME_CLIENT\"");
        assert_eq!(
            ScheduleReason::BalancesDeficitLine.to_string(),
            "BALANCES_DEFICIT_LINE"
        );
    }
}
