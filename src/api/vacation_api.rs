// ==========================================
// 假期排班记录系统 - 假期 API
// ==========================================
// 职责: 假期新增/更新/删除/列表/日历，员工+假期原子创建
// 红线: 同一员工假期闭区间不得重叠（新增与改动区间的更新都要检查）
// 红线: 重叠检查与写入处于同一 BEGIN IMMEDIATE 工作单元
// ==========================================

use chrono::{Duration, Local, NaiveDate};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::api::employee_api::EmployeeApi;
use crate::api::error::{ApiError, ApiResult};
use crate::api::lock_connection;
use crate::api::validator::{normalize_kind, validate_day_count, validate_range, validate_window};
use crate::config::read_settings;
use crate::db::begin_unit_of_work;
use crate::domain::employee::{Employee, EmployeeUpsert};
use crate::domain::types::{EntrySource, Page};
use crate::domain::vacation::{
    CalendarItem, CalendarQuery, CalendarView, DateRange, EmployeeSummary, NewVacationEntry,
    NewVacationRow, VacationDraft, VacationEntry, VacationPatch, VacationQuery,
    DEFAULT_VACATION_KIND,
};
use crate::engine::overlap_checker::OverlapChecker;
use crate::repository::employee_repo::EmployeeRepository;
use crate::repository::vacation_repo::VacationRepository;

/// 原子创建的结果
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EmployeeVacationOutcome {
    pub employee: Employee,
    pub employee_created: bool,
    pub entry: VacationEntry,
}

/// 假期列表条目（显式携带员工）
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VacationListItem {
    pub entry: VacationEntry,
    pub employee: Employee,
}

/// 引用的员工必须存在且在职
fn require_active_employee(conn: &Connection, employee_id: i64) -> ApiResult<Employee> {
    match EmployeeRepository::new(conn).find_by_id(employee_id)? {
        Some(employee) if employee.active => Ok(employee),
        Some(_) => Err(ApiError::ReferenceInvalid(format!(
            "员工 {} 已停用",
            employee_id
        ))),
        None => Err(ApiError::ReferenceInvalid(format!(
            "员工 {} 不存在",
            employee_id
        ))),
    }
}

/// 重叠则返回 Conflict
fn ensure_no_overlap(
    conn: &Connection,
    employee_id: i64,
    range: &DateRange,
    exclude_entry_id: Option<i64>,
) -> ApiResult<()> {
    if let Some(conflict) =
        OverlapChecker::new(conn).find_conflict(employee_id, range, exclude_entry_id)?
    {
        warn!(
            employee_id,
            conflicting = ?conflict.conflicting_entry_ids,
            "假期区间重叠，拒绝写入"
        );
        return Err(conflict.into());
    }
    Ok(())
}

fn employee_summary(employee: &Employee, default_photo_url: &str) -> EmployeeSummary {
    EmployeeSummary {
        id: employee.id,
        employee_number: employee.employee_number.clone(),
        full_name: employee.full_name.clone(),
        short_name: employee.display_short_name(),
        plant: employee.plant,
        shift_code: employee.shift_code.clone(),
        area: employee.area.clone(),
        photo_url: employee
            .photo_url
            .clone()
            .unwrap_or_else(|| default_photo_url.to_string()),
    }
}

// ==========================================
// VacationApi - 假期 API
// ==========================================
pub struct VacationApi {
    conn: Arc<Mutex<Connection>>,
}

impl VacationApi {
    /// 创建新的VacationApi实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 新建假期（员工已存在）
    ///
    /// # 返回
    /// - Err(ApiError::ValidationError): end < start 或天数非法
    /// - Err(ApiError::ReferenceInvalid): 员工不存在或已停用
    /// - Err(ApiError::Conflict): 与该员工已有假期重叠（端点相接也算）
    pub fn create_entry(&self, input: &NewVacationEntry) -> ApiResult<VacationEntry> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = begin_unit_of_work(&mut conn)?;
        let entry = Self::create_entry_tx(&tx, input)?;
        tx.commit()?;

        info!(
            entry_id = entry.id,
            employee_id = entry.employee_id,
            start = %entry.start_date,
            end = %entry.end_date,
            "假期已创建"
        );
        Ok(entry)
    }

    pub fn create_entry_tx(conn: &Connection, input: &NewVacationEntry) -> ApiResult<VacationEntry> {
        let range = validate_range(input.start_date, input.end_date)?;
        validate_day_count(input.day_count)?;
        require_active_employee(conn, input.employee_id)?;
        ensure_no_overlap(conn, input.employee_id, &range, None)?;

        let row = NewVacationRow {
            employee_id: input.employee_id,
            start_date: range.start,
            end_date: range.end,
            kind: normalize_kind(input.kind.as_deref(), DEFAULT_VACATION_KIND),
            day_count: input.day_count,
            source: input.source.unwrap_or(EntrySource::Manual),
        };
        let id = VacationRepository::new(conn).insert(&row)?;

        Ok(VacationEntry {
            id,
            employee_id: row.employee_id,
            start_date: row.start_date,
            end_date: row.end_date,
            kind: row.kind,
            day_count: row.day_count,
            source: row.source,
        })
    }

    /// 员工 upsert + 假期创建，全有或全无
    ///
    /// 说明：假期校验/重叠失败时，本次新建或改写的员工一并回滚
    pub fn create_employee_and_vacation(
        &self,
        employee: &EmployeeUpsert,
        draft: &VacationDraft,
    ) -> ApiResult<EmployeeVacationOutcome> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = begin_unit_of_work(&mut conn)?;

        let upserted = EmployeeApi::upsert_by_number_tx(&tx, employee)?;
        let entry = Self::create_entry_tx(
            &tx,
            &NewVacationEntry {
                employee_id: upserted.employee.id,
                start_date: draft.start_date,
                end_date: draft.end_date,
                kind: draft.kind.clone(),
                day_count: draft.day_count,
                source: Some(EntrySource::Manual),
            },
        )?;
        tx.commit()?;

        info!(
            employee_id = upserted.employee.id,
            employee_created = upserted.created,
            entry_id = entry.id,
            "员工与假期已原子创建"
        );
        Ok(EmployeeVacationOutcome {
            employee: upserted.employee,
            employee_created: upserted.created,
            entry,
        })
    }

    /// 局部更新假期
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 记录不存在
    /// - Err(ApiError::ReferenceInvalid): 改派到不存在/已停用员工
    /// - Err(ApiError::Conflict): 改动员工或区间后与其它记录重叠（排除自身）
    pub fn update_entry(&self, id: i64, patch: &VacationPatch) -> ApiResult<VacationEntry> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = begin_unit_of_work(&mut conn)?;
        let entry = Self::update_entry_tx(&tx, id, patch)?;
        tx.commit()?;

        info!(entry_id = id, "假期已更新");
        Ok(entry)
    }

    pub fn update_entry_tx(
        conn: &Connection,
        id: i64,
        patch: &VacationPatch,
    ) -> ApiResult<VacationEntry> {
        let repo = VacationRepository::new(conn);
        let mut entry = repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("VacationEntry(id={})不存在", id)))?;

        if let Some(employee_id) = patch.employee_id {
            if employee_id != entry.employee_id {
                require_active_employee(conn, employee_id)?;
            }
            entry.employee_id = employee_id;
        }
        if let Some(start) = patch.start_date {
            entry.start_date = start;
        }
        if let Some(end) = patch.end_date {
            entry.end_date = end;
        }
        if let Some(kind) = patch.kind.as_deref() {
            entry.kind = normalize_kind(Some(kind), DEFAULT_VACATION_KIND);
        }
        if let Some(day_count) = patch.day_count {
            validate_day_count(day_count)?;
            entry.day_count = day_count;
        }

        let range = validate_range(entry.start_date, entry.end_date)?;
        if patch.touches_range() {
            ensure_no_overlap(conn, entry.employee_id, &range, Some(entry.id))?;
        } else {
            debug!(entry_id = id, "未改动员工/区间，跳过重叠检查");
        }

        repo.update(&entry)?;
        Ok(entry)
    }

    /// 删除假期（硬删除）
    pub fn delete_entry(&self, id: i64) -> ApiResult<()> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = begin_unit_of_work(&mut conn)?;
        let rows = VacationRepository::new(&tx).delete(id)?;
        if rows == 0 {
            return Err(ApiError::NotFound(format!("VacationEntry(id={})不存在", id)));
        }
        tx.commit()?;

        info!(entry_id = id, "假期已删除");
        Ok(())
    }

    /// 按 ID 查询假期
    pub fn get_entry(&self, id: i64) -> ApiResult<VacationEntry> {
        let conn = lock_connection(&self.conn)?;
        VacationRepository::new(&conn)
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("VacationEntry(id={})不存在", id)))
    }

    /// 某员工全部假期（按开始日期升序）
    pub fn list_employee_entries(&self, employee_id: i64) -> ApiResult<Vec<VacationEntry>> {
        let conn = lock_connection(&self.conn)?;
        EmployeeRepository::new(&conn).get_by_id(employee_id)?;
        Ok(VacationRepository::new(&conn).list_by_employee(employee_id)?)
    }

    /// 时间窗口内的假期分页列表
    ///
    /// # 返回
    /// - Err(ApiError::ValidationError): 窗口倒置或跨度超过 max_window_days
    pub fn list_vacation_entries(&self, query: &VacationQuery) -> ApiResult<Page<VacationListItem>> {
        let conn = lock_connection(&self.conn)?;
        let settings = read_settings(&conn)?;
        validate_window(query.window_start, query.window_end, settings.max_window_days)?;

        let (rows, total) = VacationRepository::new(&conn).list_in_window(query)?;
        let page = query.page.normalized();
        Ok(Page {
            items: rows
                .into_iter()
                .map(|(entry, employee)| VacationListItem { entry, employee })
                .collect(),
            total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    /// 日历视图（start 缺省为今天）
    pub fn calendar(&self, query: &CalendarQuery) -> ApiResult<CalendarView> {
        self.calendar_on(query, Local::now().date_naive())
    }

    /// 日历视图，以 today 作为缺省起始日
    ///
    /// 说明：只返回在职员工；end 缺省为 start + (默认跨度 - 1) 天
    pub fn calendar_on(&self, query: &CalendarQuery, today: NaiveDate) -> ApiResult<CalendarView> {
        let conn = lock_connection(&self.conn)?;
        let settings = read_settings(&conn)?;

        let start = query.start.unwrap_or(today);
        let end = match query.end {
            Some(end) => end,
            None => Duration::try_days(settings.calendar_default_span_days - 1)
                .and_then(|span| start.checked_add_signed(span))
                .ok_or_else(|| {
                    ApiError::ValidationError(format!("日历起始日期 {} 超出可表示范围", start))
                })?,
        };
        let window = validate_window(start, end, settings.max_window_days)?;

        let rows = VacationRepository::new(&conn).calendar_items(
            &window,
            query.plant,
            query.search.as_deref(),
        )?;
        let items = rows
            .into_iter()
            .map(|(entry, employee)| CalendarItem {
                entry_id: entry.id,
                range: entry.range(),
                kind: entry.kind,
                day_count: entry.day_count,
                employee: employee_summary(&employee, &settings.default_photo_url),
            })
            .collect::<Vec<_>>();

        debug!(start = %window.start, end = %window.end, items = items.len(), "日历查询");
        Ok(CalendarView {
            start: window.start,
            end: window.end,
            items,
        })
    }
}
