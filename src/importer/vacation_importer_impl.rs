// ==========================================
// 假期排班记录系统 - 假期导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 行数检查 → 列名解析 → 逐行对账（单事务） → 汇总
// 红线: 超行数/缺必需列整批拒绝，不写入任何数据
// ==========================================

use crate::config::read_settings;
use crate::db::begin_unit_of_work;
use crate::engine::shift_policy::{RandomShiftPolicy, ShiftPlaceholderPolicy};
use crate::importer::column_resolver::{resolve_columns, FieldAliases, FieldKey};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{TabularData, UniversalFileParser};
use crate::importer::import_reconciler::{ImportReconciler, ImportSummary};
use crate::importer::vacation_importer_trait::VacationImporter;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// VacationImporterImpl - 假期导入器实现
// ==========================================
pub struct VacationImporterImpl {
    // 数据访问
    conn: Arc<Mutex<Connection>>,

    // 导入组件
    file_parser: UniversalFileParser,
    aliases: FieldAliases,
    shift_policy: Arc<dyn ShiftPlaceholderPolicy>,
}

impl VacationImporterImpl {
    /// 创建导入器（默认别名表 + 随机班次占位）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self::with_components(conn, FieldAliases::default(), Arc::new(RandomShiftPolicy))
    }

    /// # 参数
    /// - conn: 数据库连接
    /// - aliases: 列名别名表
    /// - shift_policy: 新员工班次占位策略
    pub fn with_components(
        conn: Arc<Mutex<Connection>>,
        aliases: FieldAliases,
        shift_policy: Arc<dyn ShiftPlaceholderPolicy>,
    ) -> Self {
        Self {
            conn,
            file_parser: UniversalFileParser,
            aliases,
            shift_policy,
        }
    }

    /// 解析完成后的同步导入主体
    fn import_table(&self, batch_id: &str, table: TabularData) -> ImportResult<ImportSummary> {
        let started = Instant::now();

        let mut conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::InternalError(format!("锁获取失败: {}", e)))?;
        let settings = read_settings(&conn)
            .map_err(|e| ImportError::DatabaseTransactionError(e.to_string()))?;

        // === 步骤 2: 行数上限 ===
        if table.rows.len() > settings.max_import_rows {
            warn!(
                rows = table.rows.len(),
                max = settings.max_import_rows,
                "行数超出上限，整批拒绝"
            );
            return Err(ImportError::TooManyRows {
                rows: table.rows.len(),
                max: settings.max_import_rows,
            });
        }

        // === 步骤 3: 列名解析 ===
        let columns = resolve_columns(&table.headers, &self.aliases);
        let missing = columns.missing(&FieldKey::REQUIRED);
        if !missing.is_empty() {
            let labels: Vec<String> = missing.iter().map(|k| k.label().to_string()).collect();
            warn!(headers = ?table.headers, missing = ?labels, "缺少必需列");
            return Err(ImportError::MissingColumns(labels));
        }
        debug!(columns = ?columns, "列映射完成");

        // === 步骤 4: 逐行对账 ===
        let reconciler = ImportReconciler::new(
            self.shift_policy.clone(),
            settings.enforce_overlap_on_import,
        );
        let mut tx = begin_unit_of_work(&mut conn)?;
        let mut summary = reconciler.reconcile(&mut tx, &table.rows, &columns);
        tx.commit().map_err(|e| {
            error!(error = %e, "导入事务提交失败");
            ImportError::DatabaseTransactionError(e.to_string())
        })?;

        summary.batch_id = batch_id.to_string();
        summary.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            batch_id = %batch_id,
            total = summary.total_rows,
            employees_created = summary.employees_created,
            entries_created = summary.entries_created,
            rejected = summary.rejected_count,
            elapsed_ms = summary.elapsed_ms,
            "假期数据导入完成"
        );
        Ok(summary)
    }
}

#[async_trait::async_trait]
impl VacationImporter for VacationImporterImpl {
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportSummary> {
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let path = file_path.as_ref();
        info!(batch_id = %batch_id, file_path = %path.display(), "开始导入假期数据");

        // === 步骤 1: 解析文件 ===
        let table = self.file_parser.parse_path(path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        debug!(rows = table.rows.len(), headers = ?table.headers, "文件解析完成");

        self.import_table(&batch_id, table)
    }

    #[instrument(skip(self, bytes), fields(batch_id, size = bytes.len()))]
    async fn import_bytes(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ImportSummary> {
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(batch_id = %batch_id, file_name, "开始导入假期数据（内存内容）");

        let table = self.file_parser.parse_bytes(file_name, bytes).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        debug!(rows = table.rows.len(), headers = ?table.headers, "文件解析完成");

        self.import_table(&batch_id, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::KEY_MAX_IMPORT_ROWS;
    use crate::engine::shift_policy::FixedShiftPolicy;

    fn setup_importer() -> (Arc<Mutex<Connection>>, VacationImporterImpl) {
        let conn = Arc::new(Mutex::new(crate::db::open_and_init(":memory:").unwrap()));
        let importer = VacationImporterImpl::with_components(
            conn.clone(),
            FieldAliases::default(),
            Arc::new(FixedShiftPolicy::new("T1")),
        );
        (conn, importer)
    }

    fn count(conn: &Arc<Mutex<Connection>>, table: &str) -> i64 {
        conn.lock()
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn test_import_bytes_csv() {
        let (conn, importer) = setup_importer();
        let csv = "Inicial,Final,#,Nombre,Gozo,Planta\n\
                   2024-01-01,2024-01-03,E1,John Doe,3,Planta 3\n\
                   2024-01-10,2024-01-11,E2,\"Roe, Jane\",2,\n";
        let summary = importer.import_bytes("upload.csv", csv.as_bytes()).await.unwrap();

        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.employees_created, 2);
        assert_eq!(summary.entries_created, 2);
        assert_eq!(summary.rejected_count, 0);
        assert!(!summary.batch_id.is_empty());
        assert_eq!(count(&conn, "vacation_entry"), 2);
    }

    #[tokio::test]
    async fn test_missing_columns_rejects_batch() {
        let (conn, importer) = setup_importer();
        let csv = "Gozo,Planta\n3,P3\n";
        let err = importer.import_bytes("upload.csv", csv.as_bytes()).await.unwrap_err();
        match err {
            ImportError::MissingColumns(labels) => {
                assert_eq!(labels, vec!["Inicial", "Final", "#", "Nombre"]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
        assert_eq!(count(&conn, "employee"), 0);
    }

    #[tokio::test]
    async fn test_row_cap_from_config() {
        let (conn, importer) = setup_importer();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO config_kv (key, value) VALUES (?1, '1')",
                [KEY_MAX_IMPORT_ROWS],
            )
            .unwrap();

        let csv = "Inicial,Final,#,Nombre\n\
                   2024-01-01,2024-01-01,E1,Doe John\n\
                   2024-01-02,2024-01-02,E2,Roe Jane\n";
        let err = importer.import_bytes("upload.csv", csv.as_bytes()).await.unwrap_err();
        assert!(matches!(err, ImportError::TooManyRows { rows: 2, max: 1 }));
        assert_eq!(count(&conn, "employee"), 0);
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let (_, importer) = setup_importer();
        let err = importer.import_bytes("upload.txt", b"a,b\n").await.unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }
}
