// ==========================================
// 洗涤分线排程系统 - 导入层
// ==========================================
// 职责: 外部数据导入,生成内部数据
// 支持: Excel (.xlsx/.xls/.ods), CSV
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod intake_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{DqWarning, IntakeFieldMapper};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use intake_importer::{IntakeImportSummary, IntakeImporter};
