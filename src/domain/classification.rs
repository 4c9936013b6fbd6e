// ==========================================
// 洗涤分线排程系统 - 产品分线分类
// ==========================================
// 职责: 分类结果 + 人工覆写表快照
// 红线: 覆写表在一次计算内只读; 覆写变更后下游结果必须整体重算
// ==========================================

use crate::domain::types::{ClassificationOrigin, Line};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 规范化产品名, 作为分类查找键
///
/// 规则: 去首尾空白 + 小写 + 内部连续空白压缩为单个空格
pub fn normalize_product_key(product_name: &str) -> String {
    product_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ==========================================
// ClassificationEntry - 分类结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub product_key: String,
    pub line: Line,
    pub origin: ClassificationOrigin,
}

// ==========================================
// OverrideEntry - 人工覆写记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub line: Line,
    pub example_product_name: String,
}

// ==========================================
// OverrideTable - 覆写表快照
// ==========================================
// 键已规范化; 空表合法
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideTable {
    entries: HashMap<String, OverrideEntry>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以原始产品名写入覆写（内部自动规范化）
    pub fn insert(&mut self, product_name: &str, line: Line) {
        self.entries.insert(
            normalize_product_key(product_name),
            OverrideEntry {
                line,
                example_product_name: product_name.trim().to_string(),
            },
        );
    }

    /// 以已规范化的键写入（仓储层加载使用）
    pub fn insert_normalized(&mut self, product_key: String, entry: OverrideEntry) {
        self.entries.insert(product_key, entry);
    }

    pub fn get(&self, product_key: &str) -> Option<&OverrideEntry> {
        self.entries.get(product_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OverrideEntry)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_product_key() {
        assert_eq!(normalize_product_key("  Queen   Flat\tSheet "), "queen flat sheet");
        assert_eq!(normalize_product_key(""), "");
        assert_eq!(normalize_product_key("SÁBANA"), "sábana");
    }

    #[test]
    fn test_override_table_normalizes_on_insert() {
        let mut table = OverrideTable::new();
        table.insert(" Scrub  Shirt", Line::Mangle);

        let entry = table.get("scrub shirt").unwrap();
        assert_eq!(entry.line, Line::Mangle);
        assert_eq!(entry.example_product_name, "Scrub  Shirt");
        assert_eq!(table.len(), 1);
    }
}
