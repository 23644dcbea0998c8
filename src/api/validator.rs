// ==========================================
// 假期排班记录系统 - 输入校验器
// ==========================================
// 职责: 人工录入/查询参数的前置校验
// 红线: 校验失败一律返回 ValidationError，不触达数据库
// ==========================================

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::vacation::DateRange;

/// 校验并构造闭区间
///
/// # 返回
/// - Ok(DateRange): start ≤ end
/// - Err(ApiError::ValidationError): 结束日期早于开始日期
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> ApiResult<DateRange> {
    DateRange::new(start, end).ok_or_else(|| {
        ApiError::ValidationError(format!("结束日期 {} 早于开始日期 {}", end, start))
    })
}

/// 校验天数: 有限且非负
pub fn validate_day_count(day_count: Option<f64>) -> ApiResult<()> {
    match day_count {
        Some(v) if !v.is_finite() => Err(ApiError::ValidationError(
            "天数必须为有限数值".to_string(),
        )),
        Some(v) if v < 0.0 => Err(ApiError::ValidationError(format!(
            "天数不能为负数: {}",
            v
        ))),
        _ => Ok(()),
    }
}

/// 校验查询窗口: 合法区间且跨度不超过上限
pub fn validate_window(
    start: NaiveDate,
    end: NaiveDate,
    max_window_days: i64,
) -> ApiResult<DateRange> {
    let range = validate_range(start, end)?;
    if range.span_days() > max_window_days {
        return Err(ApiError::ValidationError(format!(
            "查询窗口 {} 天超过上限 {} 天",
            range.span_days(),
            max_window_days
        )));
    }
    Ok(range)
}

/// 假期类型: 缺省或空白取默认值
pub fn normalize_kind(kind: Option<&str>, default_kind: &str) -> String {
    match kind.map(str::trim) {
        Some(k) if !k.is_empty() => k.to_string(),
        _ => default_kind.to_string(),
    }
}

/// 可选文本: trim 后为空视为 None
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
