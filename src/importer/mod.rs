// ==========================================
// 假期排班记录系统 - 导入层
// ==========================================
// 职责: 表格上传 → 员工 upsert + 假期记录
// 支持: CSV, Excel (.xlsx/.xls)
// ==========================================

// 模块声明
pub mod column_resolver;
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod import_reconciler;
pub mod vacation_importer_impl;
pub mod vacation_importer_trait;

// 重导出核心类型
pub use column_resolver::{resolve_columns, ColumnMap, FieldAliases, FieldKey};
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, RawRow, TabularData, UniversalFileParser};
pub use import_reconciler::{ImportReconciler, ImportSummary, MAX_DIAGNOSTICS};
pub use vacation_importer_impl::VacationImporterImpl;

// 重导出 Trait 接口
pub use file_parser::FileParser;
pub use vacation_importer_trait::VacationImporter;
