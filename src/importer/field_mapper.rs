// ==========================================
// 洗涤分线排程系统 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 标准字段映射 + 类型转换
// 红线: 单元格值无法解析时置为 None 并记录 DQ 告警, 不阻断导入
// ==========================================

use crate::domain::intake::{ItemRecord, WeightRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 支持的时间戳文本格式（按顺序尝试）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%d%H%M%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// ===== 标准字段 → 列名别名（均为小写） =====
const CLIENT_ID: &[&str] = &["client_id", "cliente_id", "id_cliente", "客户编号"];
const CLIENT_NAME: &[&str] = &["client_name", "cliente", "nombre_cliente", "客户名称"];
const WEIGHT: &[&str] = &["weight", "peso", "weight_kg", "重量"];
const TIMESTAMP: &[&str] = &["timestamp", "fecha", "fecha_hora", "称重时间"];
const PRODUCT_NAME: &[&str] = &["product_name", "producto", "product", "产品名称"];
const QUANTITY: &[&str] = &["quantity", "cantidad", "qty", "件数"];
const ADDED_AT: &[&str] = &["added_at", "fecha_registro", "timestamp", "录入时间"];

// ==========================================
// DqWarning - 数据质量告警
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqWarning {
    pub row_number: usize,         // 原始文件行号（表头为第 1 行）
    pub client_id: Option<String>, // 客户编号（如果可解析）
    pub field: String,             // 告警字段
    pub message: String,           // 告警描述
}

// ==========================================
// IntakeFieldMapper - 入厂记录字段映射器
// ==========================================
pub struct IntakeFieldMapper;

impl IntakeFieldMapper {
    /// 校验必需列: 客户编号列必须存在
    pub fn check_required_columns(&self, rows: &[RawRow]) -> ImportResult<()> {
        let has_client_column = rows
            .iter()
            .any(|row| CLIENT_ID.iter().any(|alias| row.contains_key(*alias)));
        if rows.is_empty() || has_client_column {
            Ok(())
        } else {
            Err(ImportError::MissingColumn(CLIENT_ID.join("/")))
        }
    }

    /// 映射称重行
    pub fn map_weight_row(
        &self,
        row: &RawRow,
        row_number: usize,
        warnings: &mut Vec<DqWarning>,
    ) -> WeightRecord {
        let client_id = get_string(row, CLIENT_ID).unwrap_or_default();
        let client_name = get_string(row, CLIENT_NAME).unwrap_or_else(|| client_id.clone());
        let mut ctx = RowContext::new(row_number, &client_id, warnings);

        if client_id.is_empty() {
            ctx.warn("client_id", "客户编号缺失".to_string());
        }

        let weight = ctx.parse_f64(row, WEIGHT, "weight");
        let timestamp = ctx.parse_datetime(row, TIMESTAMP, "timestamp");

        WeightRecord {
            client_id,
            client_name,
            weight,
            timestamp,
        }
    }

    /// 映射件数行
    pub fn map_item_row(
        &self,
        row: &RawRow,
        row_number: usize,
        warnings: &mut Vec<DqWarning>,
    ) -> ItemRecord {
        let client_id = get_string(row, CLIENT_ID).unwrap_or_default();
        let client_name = get_string(row, CLIENT_NAME).unwrap_or_else(|| client_id.clone());
        let mut ctx = RowContext::new(row_number, &client_id, warnings);

        if client_id.is_empty() {
            ctx.warn("client_id", "客户编号缺失".to_string());
        }

        let product_name = get_string(row, PRODUCT_NAME);
        let quantity = ctx.parse_f64(row, QUANTITY, "quantity");
        let added_at = ctx.parse_datetime(row, ADDED_AT, "added_at");

        ItemRecord {
            client_id,
            client_name,
            product_name,
            quantity,
            added_at,
        }
    }
}

/// 提取字符串字段, 按别名顺序取第一个非空值
fn get_string(row: &RawRow, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// 解析时间戳文本
///
/// 纯数字且不符合 YYYYMMDDhhmmss 时按 Excel 日期序列号处理
pub fn parse_datetime_text(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    value.parse::<f64>().ok().and_then(excel_serial_to_datetime)
}

/// Excel 序列号（1900 日期系统）→ 时间
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    base.checked_add_signed(Duration::seconds(seconds))
}

/// 小数逗号归一化
///
/// 仅当恰有一个逗号、没有小数点、且逗号后不是恰好三位数字时视为小数逗号
/// ("12,5" → "12.5"); "1,250" / "1,250.5" 等无法确定含义, 返回 None
pub fn normalize_decimal_comma(value: &str) -> Option<String> {
    if !value.contains(',') {
        return Some(value.to_string());
    }
    if value.contains('.') || value.matches(',').count() > 1 {
        return None;
    }
    let fraction = value.rsplit(',').next().unwrap_or("");
    if fraction.len() == 3 && fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(value.replace(',', "."))
}

// ==========================================
// RowContext - 单行映射上下文（收集告警）
// ==========================================
struct RowContext<'a> {
    row_number: usize,
    client_id: Option<String>,
    warnings: &'a mut Vec<DqWarning>,
}

impl<'a> RowContext<'a> {
    fn new(row_number: usize, client_id: &str, warnings: &'a mut Vec<DqWarning>) -> Self {
        Self {
            row_number,
            client_id: (!client_id.is_empty()).then(|| client_id.to_string()),
            warnings,
        }
    }

    fn warn(&mut self, field: &str, message: String) {
        self.warnings.push(DqWarning {
            row_number: self.row_number,
            client_id: self.client_id.clone(),
            field: field.to_string(),
            message,
        });
    }

    fn parse_f64(&mut self, row: &RawRow, aliases: &[&str], field: &str) -> Option<f64> {
        let value = match get_string(row, aliases) {
            Some(v) => v,
            None => {
                self.warn(field, "值缺失".to_string());
                return None;
            }
        };
        let normalized = match normalize_decimal_comma(&value) {
            Some(v) => v,
            None => {
                self.warn(field, format!("逗号含义不明确（千位分隔符或小数点）: {}", value));
                return None;
            }
        };
        match normalized.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                self.warn(field, format!("无法解析为数值: {}", value));
                None
            }
        }
    }

    fn parse_datetime(
        &mut self,
        row: &RawRow,
        aliases: &[&str],
        field: &str,
    ) -> Option<NaiveDateTime> {
        let value = match get_string(row, aliases) {
            Some(v) => v,
            None => {
                self.warn(field, "时间缺失".to_string());
                return None;
            }
        };
        let parsed = parse_datetime_text(&value);
        if parsed.is_none() {
            self.warn(field, format!("无法解析为时间: {}", value));
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_weight_row_with_spanish_headers() {
        let mut warnings = Vec::new();
        let record = IntakeFieldMapper.map_weight_row(
            &row(&[
                ("cliente_id", "C1"),
                ("cliente", "Hotel Sol"),
                ("peso", "120,5"),
                ("fecha", "2026-03-02 08:15:00"),
            ]),
            2,
            &mut warnings,
        );

        assert_eq!(record.client_id, "C1");
        assert_eq!(record.client_name, "Hotel Sol");
        assert_eq!(record.weight, Some(120.5));
        assert!(record.timestamp.is_some());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_bad_values_become_none_with_warnings() {
        let mut warnings = Vec::new();
        let record = IntakeFieldMapper.map_item_row(
            &row(&[
                ("client_id", "C2"),
                ("product_name", "Bath Towel"),
                ("quantity", "many"),
                ("added_at", "yesterday"),
            ]),
            5,
            &mut warnings,
        );

        assert_eq!(record.client_name, "C2");
        assert_eq!(record.quantity, None);
        assert_eq!(record.added_at, None);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.row_number == 5));
        assert_eq!(warnings[0].field, "quantity");
        assert_eq!(warnings[0].client_id.as_deref(), Some("C2"));
    }

    #[test]
    fn test_missing_client_column_rejected() {
        let rows = vec![row(&[("weight", "10")])];
        let result = IntakeFieldMapper.check_required_columns(&rows);
        assert!(matches!(result, Err(ImportError::MissingColumn(_))));
        assert!(IntakeFieldMapper.check_required_columns(&[]).is_ok());
    }

    #[test]
    fn test_parse_datetime_variants() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime_text("2026-03-02T08:00:00"), Some(expected));
        assert_eq!(parse_datetime_text("20260302080000"), Some(expected));
        assert_eq!(parse_datetime_text("02/03/2026 08:00"), Some(expected));
        // Excel 序列号: 46083 = 2026-03-02
        assert_eq!(parse_datetime_text("46083.3333333333"), Some(expected));
        assert_eq!(parse_datetime_text("not a date"), None);
    }

    #[test]
    fn test_decimal_comma_rules() {
        assert_eq!(normalize_decimal_comma("12,5").as_deref(), Some("12.5"));
        assert_eq!(normalize_decimal_comma("120").as_deref(), Some("120"));
        assert_eq!(normalize_decimal_comma("0,75").as_deref(), Some("0.75"));
        assert_eq!(normalize_decimal_comma("1,250"), None);
        assert_eq!(normalize_decimal_comma("1,250.5"), None);
        assert_eq!(normalize_decimal_comma("1,2,3"), None);
    }

    #[test]
    fn test_thousands_separator_is_not_read_as_decimal() {
        let mut warnings = Vec::new();
        let record = IntakeFieldMapper.map_weight_row(
            &row(&[
                ("client_id", "C1"),
                ("weight", "1,250"),
                ("timestamp", "2026-03-02 08:15:00"),
            ]),
            2,
            &mut warnings,
        );
        assert_eq!(record.weight, None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "weight");
        assert_eq!(warnings[0].client_id.as_deref(), Some("C1"));

        let mut warnings = Vec::new();
        let record = IntakeFieldMapper.map_weight_row(
            &row(&[
                ("client_id", "C1"),
                ("weight", "12,5"),
                ("timestamp", "2026-03-02 08:15:00"),
            ]),
            3,
            &mut warnings,
        );
        assert_eq!(record.weight, Some(12.5));
        assert!(warnings.is_empty());
    }
}
