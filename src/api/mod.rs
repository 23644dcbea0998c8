// ==========================================
// 假期排班记录系统 - API 层
// ==========================================
// 职责: 员工/假期 CRUD 与批量导入入口
// 红线: 每次调用在一个工作单元内完成；领域错误与运行错误分开返回
// ==========================================

pub mod employee_api;
pub mod error;
pub mod import_api;
pub mod vacation_api;
pub mod validator;

// 重导出核心类型
pub use employee_api::EmployeeApi;
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use vacation_api::{EmployeeVacationOutcome, VacationApi, VacationListItem};

use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// 获取共享连接锁；锁中毒视为连接错误
pub(crate) fn lock_connection(conn: &Mutex<Connection>) -> ApiResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| ApiError::DatabaseConnectionError(format!("锁获取失败: {}", e)))
}
