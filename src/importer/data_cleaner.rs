// ==========================================
// 假期排班记录系统 - 数据清洗器实现
// ==========================================
// 职责: 空白/NULL 标准化 / 日期解析 / 天数解析
// 说明: 清洗失败返回 None，由调用方决定拒绝还是视为缺失
// ==========================================

use chrono::NaiveDate;

/// 支持的日期格式（按顺序尝试）
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d/%m/%Y"];

/// 视为空值的占位文本（表格导出常见）
///
/// 仅用于日期/天数/厂区单元格；工号与姓名中 "Nan" 等是合法值
const NULL_MARKERS: [&str; 4] = ["nan", "nat", "null", "none"];

pub struct DataCleaner;

impl DataCleaner {
    /// trim 后为空则为 None（工号/姓名等身份单元格）
    pub fn normalize_text(&self, value: Option<&str>) -> Option<String> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 空白与空值占位统一为 None
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() || NULL_MARKERS.contains(&trimmed.to_lowercase().as_str()) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 解析日期
    ///
    /// # 规则
    /// - 纯日期: 2024-01-01 / 2024/01/01 / 20240101 / 01/02/2024（日/月/年）
    /// - 带时间后缀（'T' 或空格分隔）: 截取前 10 位日期部分
    pub fn parse_date(&self, value: Option<&str>) -> Option<NaiveDate> {
        let value = self.normalize_null(value)?;
        let date_part = match value.char_indices().nth(10) {
            Some((idx, c)) if c == 'T' || c == ' ' => &value[..idx],
            _ => value.as_str(),
        };
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
    }

    /// 解析天数（支持小数与逗号小数点）；解析失败、非有限值或负数视为缺失
    pub fn parse_day_count(&self, value: Option<&str>) -> Option<f64> {
        let value = self.normalize_null(value)?;
        value
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  x ")), Some("x".to_string()));
        assert_eq!(cleaner.normalize_null(Some("   ")), None);
        assert_eq!(cleaner.normalize_null(Some("NaN")), None);
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_normalize_text_keeps_marker_like_values() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_text(Some(" Nan ")), Some("Nan".to_string()));
        assert_eq!(cleaner.normalize_text(Some("None")), Some("None".to_string()));
        assert_eq!(cleaner.normalize_text(Some("  ")), None);
        assert_eq!(cleaner.normalize_text(None), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_date(Some("2024-01-03")), Some(d(2024, 1, 3)));
        assert_eq!(cleaner.parse_date(Some("2024/01/03")), Some(d(2024, 1, 3)));
        assert_eq!(cleaner.parse_date(Some("20240103")), Some(d(2024, 1, 3)));
        assert_eq!(cleaner.parse_date(Some("03/01/2024")), Some(d(2024, 1, 3)));
    }

    #[test]
    fn test_parse_date_truncates_time_suffix() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.parse_date(Some("2024-01-03T08:30:00")),
            Some(d(2024, 1, 3))
        );
        assert_eq!(
            cleaner.parse_date(Some("2024-01-03 00:00:00")),
            Some(d(2024, 1, 3))
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_date(Some("mañana")), None);
        assert_eq!(cleaner.parse_date(Some("2024-13-01")), None);
        assert_eq!(cleaner.parse_date(Some("")), None);
    }

    #[test]
    fn test_parse_day_count() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_day_count(Some("1.5")), Some(1.5));
        assert_eq!(cleaner.parse_day_count(Some("2,5")), Some(2.5));
        assert_eq!(cleaner.parse_day_count(Some("3")), Some(3.0));
        assert_eq!(cleaner.parse_day_count(Some("tres")), None);
        assert_eq!(cleaner.parse_day_count(Some("-1")), None);
        assert_eq!(cleaner.parse_day_count(Some("inf")), None);
        assert_eq!(cleaner.parse_day_count(None), None);
    }
}
