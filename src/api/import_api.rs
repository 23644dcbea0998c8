// ==========================================
// 假期排班记录系统 - 导入 API
// ==========================================
// 职责: 封装批量导入（文件路径 / 上传内容）
// 说明: 整批失败映射为 ApiError::Import；行级失败在汇总的 errors 中
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::api::error::{ApiError, ApiResult};
use crate::engine::shift_policy::ShiftPlaceholderPolicy;
use crate::importer::column_resolver::FieldAliases;
use crate::importer::import_reconciler::ImportSummary;
use crate::importer::vacation_importer_impl::VacationImporterImpl;
use crate::importer::vacation_importer_trait::VacationImporter;

/// 导入API
pub struct ImportApi {
    importer: VacationImporterImpl,
}

impl ImportApi {
    /// 创建新的ImportApi实例（随机班次占位）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            importer: VacationImporterImpl::new(conn),
        }
    }

    /// 指定班次占位策略（测试中使用固定班次）
    pub fn with_shift_policy(
        conn: Arc<Mutex<Connection>>,
        shift_policy: Arc<dyn ShiftPlaceholderPolicy>,
    ) -> Self {
        Self {
            importer: VacationImporterImpl::with_components(
                conn,
                FieldAliases::default(),
                shift_policy,
            ),
        }
    }

    /// 导入磁盘文件
    ///
    /// # 参数
    /// - file_path: 文件路径（.csv / .xlsx / .xls）
    ///
    /// # 返回
    /// - Ok(ImportSummary): 导入汇总
    /// - Err(ApiError::Import): 整批失败
    pub async fn import_file(&self, file_path: &str) -> ApiResult<ImportSummary> {
        if file_path.trim().is_empty() {
            return Err(ApiError::ValidationError("文件路径不能为空".to_string()));
        }

        self.importer.import_file(file_path).await.map_err(|e| {
            warn!(file_path, error = %e, "导入失败");
            ApiError::from(e)
        })
    }

    /// 导入上传内容
    ///
    /// # 参数
    /// - file_name: 上传文件名（用于判断格式）
    /// - bytes: 文件内容
    pub async fn import_bytes(&self, file_name: &str, bytes: &[u8]) -> ApiResult<ImportSummary> {
        if bytes.is_empty() {
            return Err(ApiError::ValidationError("上传内容为空".to_string()));
        }

        self.importer
            .import_bytes(file_name, bytes)
            .await
            .map_err(|e| {
                warn!(file_name, error = %e, "导入失败");
                ApiError::from(e)
            })
    }
}
