// ==========================================
// 假期排班记录系统 - 假期导入 Trait
// ==========================================
// 职责: 定义批量导入接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::import_reconciler::ImportSummary;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// VacationImporter Trait
// ==========================================
// 用途: 假期批量导入主接口
// 实现者: VacationImporterImpl
#[async_trait]
pub trait VacationImporter: Send + Sync {
    /// 从磁盘文件导入（.csv / .xlsx / .xls）
    ///
    /// # 返回
    /// - Ok(ImportSummary): 计数与行级诊断（单行失败不影响整批）
    /// - Err(ImportError): 整批失败（格式不支持、缺列、超行数、数据库错误）
    ///
    /// # 导入流程
    /// 1. 文件解析（按扩展名分派）
    /// 2. 行数上限检查
    /// 3. 列名解析与必需列检查
    /// 4. 逐行对账（单事务，每行一个保存点）
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P)
        -> ImportResult<ImportSummary>;

    /// 从内存内容导入（上传场景）
    ///
    /// # 参数
    /// - file_name: 原始文件名（仅用于扩展名分派）
    /// - bytes: 文件内容
    async fn import_bytes(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ImportSummary>;
}
