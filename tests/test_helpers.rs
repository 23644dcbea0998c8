// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、API 构造、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use vacation_ledger::api::{EmployeeApi, ImportApi, VacationApi};
use vacation_ledger::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use vacation_ledger::domain::{Employee, EmployeeUpsert};
use vacation_ledger::engine::FixedShiftPolicy;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = Connection::open(&db_path)?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(open_sqlite_connection(db_path).unwrap()))
}

/// 测试环境: 三个 API 共享同一连接
pub struct TestEnv {
    pub _temp_file: NamedTempFile,
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,
    pub employees: EmployeeApi,
    pub vacations: VacationApi,
    pub imports: ImportApi,
}

pub fn setup_env() -> TestEnv {
    vacation_ledger::logging::init_test();
    let (temp_file, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    TestEnv {
        _temp_file: temp_file,
        employees: EmployeeApi::new(conn.clone()),
        vacations: VacationApi::new(conn.clone()),
        imports: ImportApi::with_shift_policy(conn.clone(), Arc::new(FixedShiftPolicy::new("T1"))),
        conn,
        db_path,
    }
}

/// 新建在职员工
pub fn create_employee(env: &TestEnv, number: &str, name: &str) -> Employee {
    env.employees
        .upsert_by_number(&EmployeeUpsert::new(number, name))
        .unwrap()
        .employee
}

/// 统计表行数
pub fn count_rows(conn: &Arc<Mutex<Connection>>, table: &str) -> i64 {
    conn.lock()
        .unwrap()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}
