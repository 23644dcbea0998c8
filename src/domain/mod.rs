// ==========================================
// 假期排班记录系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑
// ==========================================

pub mod employee;
pub mod types;
pub mod vacation;

// 重导出核心类型
pub use employee::{
    Employee, EmployeePatch, EmployeeQuery, EmployeeUpsert, NewEmployee, UpsertOutcome,
};
pub use types::{EntrySource, Page, PageRequest, Plant};
pub use vacation::{
    CalendarItem, CalendarQuery, CalendarView, DateRange, EmployeeSummary, NewVacationEntry,
    NewVacationRow, VacationDraft, VacationEntry, VacationPatch, VacationQuery,
    DEFAULT_VACATION_KIND,
};
