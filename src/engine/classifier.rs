// ==========================================
// 洗涤分线排程系统 - 产品分线分类引擎
// ==========================================
// 职责: 产品名 → 处理线 (Mangle / Doblado)
// 输入: 产品名 + 覆写表快照
// 输出: Line (永远有结果, 不报错)
// ==========================================
// 规则:
// 1) 覆写表命中 → 覆写结果
// 2) 关键字子串命中 → Mangle
// 3) 其余 → Doblado
// ==========================================

use crate::config::balance_config::default_mangle_keywords;
use crate::domain::classification::{normalize_product_key, ClassificationEntry, OverrideTable};
use crate::domain::types::{ClassificationOrigin, Line};

// ==========================================
// ProductClassifier - 分线分类引擎
// ==========================================
// 除关键字规则外不持有任何状态; 覆写表每次调用显式传入
#[derive(Debug, Clone)]
pub struct ProductClassifier {
    mangle_keywords: Vec<String>,
}

impl ProductClassifier {
    /// 构造函数
    ///
    /// # 参数
    /// - `mangle_keywords`: 平烫线关键字 (有序, 内部规范化, 空串丢弃)
    pub fn new(mangle_keywords: Vec<String>) -> Self {
        let mangle_keywords = mangle_keywords
            .iter()
            .map(|k| normalize_product_key(k))
            .filter(|k| !k.is_empty())
            .collect();
        Self { mangle_keywords }
    }

    pub fn mangle_keywords(&self) -> &[String] {
        &self.mangle_keywords
    }

    /// 分类产品名
    pub fn classify(&self, product_name: &str, overrides: &OverrideTable) -> Line {
        self.classify_entry(product_name, overrides).line
    }

    /// 分类产品名并返回来源 (用于分类预览/解释)
    pub fn classify_entry(
        &self,
        product_name: &str,
        overrides: &OverrideTable,
    ) -> ClassificationEntry {
        let product_key = normalize_product_key(product_name);

        if let Some(entry) = overrides.get(&product_key) {
            return ClassificationEntry {
                product_key,
                line: entry.line,
                origin: ClassificationOrigin::Override,
            };
        }

        let line = self.default_rule(&product_key);
        ClassificationEntry {
            product_key,
            line,
            origin: ClassificationOrigin::DefaultRule,
        }
    }

    /// 关键字默认规则 (输入须已规范化)
    fn default_rule(&self, product_key: &str) -> Line {
        if self
            .mangle_keywords
            .iter()
            .any(|keyword| product_key.contains(keyword.as_str()))
        {
            Line::Mangle
        } else {
            Line::Doblado
        }
    }
}

impl Default for ProductClassifier {
    fn default() -> Self {
        Self::new(default_mangle_keywords())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_rule() {
        let classifier = ProductClassifier::default();
        let overrides = OverrideTable::new();

        assert_eq!(classifier.classify("Queen Flat Sheet", &overrides), Line::Mangle);
        assert_eq!(classifier.classify("DUVET COVER king", &overrides), Line::Mangle);
        assert_eq!(classifier.classify("Servilleta blanca", &overrides), Line::Mangle);
        assert_eq!(classifier.classify("Scrub Shirt", &overrides), Line::Doblado);
        assert_eq!(classifier.classify("", &overrides), Line::Doblado);
    }

    #[test]
    fn test_override_takes_precedence() {
        let classifier = ProductClassifier::default();
        let mut overrides = OverrideTable::new();
        overrides.insert("scrub   shirt", Line::Mangle);
        overrides.insert("Sheet Bag", Line::Doblado);

        let entry = classifier.classify_entry("  Scrub Shirt ", &overrides);
        assert_eq!(entry.line, Line::Mangle);
        assert_eq!(entry.origin, ClassificationOrigin::Override);
        assert_eq!(entry.product_key, "scrub shirt");

        // 覆写可把关键字命中的产品改回折叠线
        assert_eq!(classifier.classify("sheet bag", &overrides), Line::Doblado);
    }

    #[test]
    fn test_default_rule_origin() {
        let classifier = ProductClassifier::new(vec![" Bath  Towel ".to_string(), "".to_string()]);
        assert_eq!(classifier.mangle_keywords(), &["bath towel".to_string()]);

        let entry = classifier.classify_entry("Large bath towel", &OverrideTable::new());
        assert_eq!(entry.line, Line::Mangle);
        assert_eq!(entry.origin, ClassificationOrigin::DefaultRule);
    }
}
