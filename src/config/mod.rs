// ==========================================
// 假期排班记录系统 - 配置层
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod settings;

pub use config_manager::{read_settings, ConfigManager};
pub use settings::LedgerSettings;

use std::path::PathBuf;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "VACATION_LEDGER_DB_PATH";

/// 默认数据库文件名
pub const DEFAULT_DB_FILE: &str = "vacation_ledger.db";

/// 获取默认数据库路径
///
/// 顺序: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(format!("./{}", DEFAULT_DB_FILE));

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let app_dir = data_dir.join("vacation-ledger-dev");

        #[cfg(not(debug_assertions))]
        let app_dir = data_dir.join("vacation-ledger");

        if std::fs::create_dir_all(&app_dir).is_ok() {
            path = app_dir.join(DEFAULT_DB_FILE);
        }
    }

    path.to_string_lossy().to_string()
}
