// ==========================================
// 假期排班记录系统 - 假期领域模型
// ==========================================
// 红线: 同一员工的假期区间不得重叠（闭区间，端点相接也算重叠）
// 删除语义: 硬删除（无下游依赖）
// ==========================================

use crate::domain::types::{EntrySource, PageRequest, Plant};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 默认假期类型
pub const DEFAULT_VACATION_KIND: &str = "Paid Vacation";

// ==========================================
// DateRange - 闭区间日期范围
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// 构造区间；end < start 返回 None
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if end < start {
            None
        } else {
            Some(Self { start, end })
        }
    }

    /// 闭区间相交: A.start ≤ B.end AND A.end ≥ B.start
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// 区间包含的天数（含首尾）
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

// ==========================================
// VacationEntry - 假期记录
// ==========================================
// 对齐: vacation_entry 表
// 说明: 只持有 employee_id，员工信息需显式查询
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationEntry {
    pub id: i64,
    pub employee_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: String,
    pub day_count: Option<f64>, // 支持半天粒度，如 1.5
    pub source: EntrySource,
}

impl VacationEntry {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// 待插入的假期行
#[derive(Debug, Clone, PartialEq)]
pub struct NewVacationRow {
    pub employee_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: String,
    pub day_count: Option<f64>,
    pub source: EntrySource,
}

// ==========================================
// 输入 DTO
// ==========================================

/// 新建假期（员工已存在）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVacationEntry {
    pub employee_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: Option<String>,
    pub day_count: Option<f64>,
    pub source: Option<EntrySource>,
}

/// 与员工 upsert 一并创建的假期（员工 ID 由 upsert 决定）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationDraft {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: Option<String>,
    pub day_count: Option<f64>,
}

/// 假期局部更新
///
/// `day_count`: None 不修改；Some(None) 清空；Some(Some(v)) 设值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VacationPatch {
    pub employee_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub kind: Option<String>,
    pub day_count: Option<Option<f64>>,
}

impl VacationPatch {
    /// 是否修改了重叠校验相关字段（员工/起止日期）
    pub fn touches_range(&self) -> bool {
        self.employee_id.is_some() || self.start_date.is_some() || self.end_date.is_some()
    }
}

// ==========================================
// 查询
// ==========================================

/// 假期列表查询（时间窗口必填）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationQuery {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub search: Option<String>,
    pub plant: Option<Plant>,
    pub shift_code: Option<String>,
    pub page: PageRequest,
}

impl VacationQuery {
    pub fn new(window_start: NaiveDate, window_end: NaiveDate) -> Self {
        Self {
            window_start,
            window_end,
            search: None,
            plant: None,
            shift_code: None,
            page: PageRequest::default(),
        }
    }
}

/// 日历查询；start 缺省为今天，end 缺省为 start + (跨度-1) 天
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub plant: Option<Plant>,
    pub search: Option<String>,
}

/// 日历条目中的员工摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: i64,
    pub employee_number: String,
    pub full_name: String,
    pub short_name: String,
    pub plant: Plant,
    pub shift_code: Option<String>,
    pub area: Option<String>,
    pub photo_url: String,
}

/// 日历条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarItem {
    pub entry_id: i64,
    pub range: DateRange,
    pub kind: String,
    pub day_count: Option<f64>,
    pub employee: EmployeeSummary,
}

/// 日历视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarView {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub items: Vec<CalendarItem>,
}
