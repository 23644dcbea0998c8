// ==========================================
// 假期排班记录系统 - 运行配置项
// ==========================================
// 存储: config_kv 表；缺失或无法解析时使用默认值
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

// ===== 配置键 =====
pub const KEY_MAX_IMPORT_ROWS: &str = "max_import_rows";
pub const KEY_MAX_WINDOW_DAYS: &str = "max_window_days";
pub const KEY_CALENDAR_DEFAULT_SPAN_DAYS: &str = "calendar_default_span_days";
pub const KEY_ENFORCE_OVERLAP_ON_IMPORT: &str = "enforce_overlap_on_import";
pub const KEY_DEFAULT_PHOTO_URL: &str = "default_photo_url";

/// 全部已知配置键
pub const ALL_KEYS: [&str; 5] = [
    KEY_MAX_IMPORT_ROWS,
    KEY_MAX_WINDOW_DAYS,
    KEY_CALENDAR_DEFAULT_SPAN_DAYS,
    KEY_ENFORCE_OVERLAP_ON_IMPORT,
    KEY_DEFAULT_PHOTO_URL,
];

// ==========================================
// LedgerSettings - 配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// 单次导入最大行数（超出则整批拒绝）
    pub max_import_rows: usize,
    /// 列表/日历查询窗口最大天数
    pub max_window_days: i64,
    /// 日历默认跨度（天，含首尾）
    pub calendar_default_span_days: i64,
    /// 导入行是否执行重叠检查
    pub enforce_overlap_on_import: bool,
    /// 员工无照片时的占位地址
    pub default_photo_url: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            max_import_rows: 5000,
            max_window_days: 366,
            calendar_default_span_days: 14,
            enforce_overlap_on_import: false,
            default_photo_url: "/avatar.png".to_string(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(values: &HashMap<String, String>, key: &str, default: T) -> T {
    match values.get(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(key, value = %raw, "配置值无法解析，使用默认值");
                default
            }
        },
        None => default,
    }
}

fn parse_flag(values: &HashMap<String, String>, key: &str, default: bool) -> bool {
    match values.get(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        Some(v) => {
            warn!(key, value = %v, "配置值无法解析，使用默认值");
            default
        }
        None => default,
    }
}

impl LedgerSettings {
    /// 由键值表构建（未知键忽略）
    pub fn from_values(values: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let settings = Self {
            max_import_rows: parse_or(values, KEY_MAX_IMPORT_ROWS, defaults.max_import_rows),
            max_window_days: parse_or(values, KEY_MAX_WINDOW_DAYS, defaults.max_window_days),
            calendar_default_span_days: parse_or(
                values,
                KEY_CALENDAR_DEFAULT_SPAN_DAYS,
                defaults.calendar_default_span_days,
            ),
            enforce_overlap_on_import: parse_flag(
                values,
                KEY_ENFORCE_OVERLAP_ON_IMPORT,
                defaults.enforce_overlap_on_import,
            ),
            default_photo_url: values
                .get(KEY_DEFAULT_PHOTO_URL)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.default_photo_url),
        };

        // 跨度与窗口至少为 1 天
        Self {
            max_window_days: settings.max_window_days.max(1),
            calendar_default_span_days: settings.calendar_default_span_days.max(1),
            ..settings
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_empty() {
        assert_eq!(
            LedgerSettings::from_values(&HashMap::new()),
            LedgerSettings::default()
        );
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let settings = LedgerSettings::from_values(&values(&[
            (KEY_MAX_IMPORT_ROWS, "10"),
            (KEY_MAX_WINDOW_DAYS, "abc"),
            (KEY_ENFORCE_OVERLAP_ON_IMPORT, "TRUE"),
            (KEY_CALENDAR_DEFAULT_SPAN_DAYS, "0"),
        ]));
        assert_eq!(settings.max_import_rows, 10);
        assert_eq!(settings.max_window_days, 366);
        assert!(settings.enforce_overlap_on_import);
        assert_eq!(settings.calendar_default_span_days, 1);
        assert_eq!(settings.default_photo_url, "/avatar.png");
    }
}
