// ==========================================
// 假期排班记录系统 - 员工 API
// ==========================================
// 职责: 员工新增/按工号 upsert/局部更新/软删除/查询
// 红线: 每次调用一个工作单元（BEGIN IMMEDIATE）
// 红线: 更新路径只应用输入中出现的字段，不清空已有值
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::lock_connection;
use crate::api::validator::clean_optional;
use crate::db::begin_unit_of_work;
use crate::domain::employee::{
    Employee, EmployeePatch, EmployeeQuery, EmployeeUpsert, NewEmployee, UpsertOutcome,
};
use crate::domain::types::Page;
use crate::engine::{canonicalize, derive_short_name, normalize_plant};
use crate::repository::employee_repo::EmployeeRepository;

/// 派生简称；空结果视为 None
fn derived_short_name(full_name: &str) -> Option<String> {
    let short = derive_short_name(full_name);
    if short.is_empty() {
        None
    } else {
        Some(short)
    }
}

/// 校验工号: trim 后非空
fn require_number(raw: &str) -> ApiResult<String> {
    let number = raw.trim();
    if number.is_empty() {
        return Err(ApiError::ValidationError("工号不能为空".to_string()));
    }
    Ok(number.to_string())
}

/// 规范化姓名并校验非空
fn require_name(
    full_name: Option<&str>,
    surname: Option<&str>,
    given_name: Option<&str>,
) -> ApiResult<String> {
    let canonical = canonicalize(full_name, surname, given_name);
    if canonical.is_empty() {
        return Err(ApiError::ValidationError(
            "姓名不能为空（需提供 full_name 或 surname/given_name）".to_string(),
        ));
    }
    Ok(canonical)
}

// ==========================================
// EmployeeApi - 员工 API
// ==========================================
pub struct EmployeeApi {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeApi {
    /// 创建新的EmployeeApi实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 按工号新增或更新员工
    ///
    /// # 返回
    /// - Ok(UpsertOutcome): created=true 表示新建
    /// - Err(ApiError::ValidationError): 工号或姓名缺失
    pub fn upsert_by_number(&self, input: &EmployeeUpsert) -> ApiResult<UpsertOutcome> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = begin_unit_of_work(&mut conn)?;
        let outcome = Self::upsert_by_number_tx(&tx, input)?;
        tx.commit()?;

        info!(
            employee_id = outcome.employee.id,
            employee_number = %outcome.employee.employee_number,
            created = outcome.created,
            "员工 upsert 完成"
        );
        Ok(outcome)
    }

    /// 在调用方的工作单元内 upsert
    ///
    /// 说明：
    /// - 新建: 缺省厂区为 Plant 1，缺省简称由规范姓名派生，active=true
    /// - 更新: 姓名总是改写；其它字段仅在输入非空时覆盖；不改变 active
    pub fn upsert_by_number_tx(
        conn: &Connection,
        input: &EmployeeUpsert,
    ) -> ApiResult<UpsertOutcome> {
        let number = require_number(&input.employee_number)?;
        let full_name = require_name(
            input.full_name.as_deref(),
            input.surname.as_deref(),
            input.given_name.as_deref(),
        )?;
        let short_name = clean_optional(input.short_name.as_deref());
        let area = clean_optional(input.area.as_deref());
        let shift_code = clean_optional(input.shift_code.as_deref());
        let plant = clean_optional(input.plant.as_deref());
        let photo_url = clean_optional(input.photo_url.as_deref());

        let repo = EmployeeRepository::new(conn);
        match repo.find_by_number(&number)? {
            Some(mut employee) => {
                employee.full_name = full_name;
                if short_name.is_some() {
                    employee.short_name = short_name;
                } else if employee.short_name.is_none() {
                    employee.short_name = derived_short_name(&employee.full_name);
                }
                if area.is_some() {
                    employee.area = area;
                }
                if shift_code.is_some() {
                    employee.shift_code = shift_code;
                }
                if let Some(raw) = plant.as_deref() {
                    employee.plant = normalize_plant(Some(raw));
                }
                if photo_url.is_some() {
                    employee.photo_url = photo_url;
                }

                repo.update(&employee)?;
                debug!(employee_id = employee.id, "已更新现有员工");
                Ok(UpsertOutcome {
                    employee,
                    created: false,
                })
            }
            None => {
                let short_name = short_name.or_else(|| derived_short_name(&full_name));
                let new_employee = NewEmployee {
                    employee_number: number,
                    full_name,
                    short_name,
                    area,
                    shift_code,
                    plant: normalize_plant(plant.as_deref()),
                    photo_url,
                    active: true,
                };
                let id = repo.insert(&new_employee)?;
                let employee = repo.get_by_id(id)?;
                debug!(employee_id = id, "已新建员工");
                Ok(UpsertOutcome {
                    employee,
                    created: true,
                })
            }
        }
    }

    /// 新建员工；工号已存在（含已停用）返回 Conflict
    pub fn create_employee(&self, input: &EmployeeUpsert) -> ApiResult<Employee> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = begin_unit_of_work(&mut conn)?;

        let number = require_number(&input.employee_number)?;
        if let Some(existing) = EmployeeRepository::new(&tx).find_by_number(&number)? {
            return Err(ApiError::Conflict(format!(
                "工号 {} 已存在 (id={})",
                number, existing.id
            )));
        }
        let outcome = Self::upsert_by_number_tx(&tx, input)?;
        tx.commit()?;

        info!(employee_id = outcome.employee.id, employee_number = %number, "员工已创建");
        Ok(outcome.employee)
    }

    /// 局部更新员工
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): id 不存在
    /// - Err(ApiError::Conflict): 更正后的工号已被占用
    ///
    /// 说明：文本字段给出空白值表示清空；姓名相关字段任一给出即重新规范化
    pub fn update_employee(&self, id: i64, patch: &EmployeePatch) -> ApiResult<Employee> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = begin_unit_of_work(&mut conn)?;
        let employee = Self::update_employee_tx(&tx, id, patch)?;
        tx.commit()?;

        info!(employee_id = id, active = employee.active, "员工已更新");
        Ok(employee)
    }

    pub fn update_employee_tx(
        conn: &Connection,
        id: i64,
        patch: &EmployeePatch,
    ) -> ApiResult<Employee> {
        let repo = EmployeeRepository::new(conn);
        let mut employee = repo.get_by_id(id)?;

        if let Some(raw) = patch.employee_number.as_deref() {
            let number = require_number(raw)?;
            if number != employee.employee_number {
                if let Some(other) = repo.find_by_number(&number)? {
                    return Err(ApiError::Conflict(format!(
                        "工号 {} 已被员工 {} 使用",
                        number, other.id
                    )));
                }
                employee.employee_number = number;
            }
        }

        if patch.touches_name() {
            employee.full_name = require_name(
                patch.full_name.as_deref(),
                patch.surname.as_deref(),
                patch.given_name.as_deref(),
            )?;
        }
        if let Some(short) = patch.short_name.as_deref() {
            employee.short_name = clean_optional(Some(short));
        }
        if let Some(area) = patch.area.as_deref() {
            employee.area = clean_optional(Some(area));
        }
        if let Some(shift) = patch.shift_code.as_deref() {
            employee.shift_code = clean_optional(Some(shift));
        }
        if let Some(plant) = patch.plant.as_deref() {
            employee.plant = normalize_plant(Some(plant));
        }
        if let Some(photo) = patch.photo_url.as_deref() {
            employee.photo_url = clean_optional(Some(photo));
        }
        if let Some(active) = patch.active {
            employee.active = active;
        }

        repo.update(&employee)?;
        Ok(employee)
    }

    /// 软删除（active=false），不级联假期记录
    pub fn soft_delete_employee(&self, id: i64) -> ApiResult<()> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = begin_unit_of_work(&mut conn)?;
        let rows = EmployeeRepository::new(&tx).set_active(id, false)?;
        if rows == 0 {
            return Err(ApiError::NotFound(format!("Employee(id={})不存在", id)));
        }
        tx.commit()?;

        info!(employee_id = id, "员工已停用");
        Ok(())
    }

    /// 按 ID 查询（含已停用）
    pub fn get_employee(&self, id: i64) -> ApiResult<Employee> {
        let conn = lock_connection(&self.conn)?;
        Ok(EmployeeRepository::new(&conn).get_by_id(id)?)
    }

    /// 按工号查询（含已停用）
    pub fn find_by_number(&self, employee_number: &str) -> ApiResult<Option<Employee>> {
        let number = require_number(employee_number)?;
        let conn = lock_connection(&self.conn)?;
        Ok(EmployeeRepository::new(&conn).find_by_number(&number)?)
    }

    /// 员工分页列表
    pub fn list_employees(&self, query: &EmployeeQuery) -> ApiResult<Page<Employee>> {
        let conn = lock_connection(&self.conn)?;
        let (items, total) = EmployeeRepository::new(&conn).list(query)?;
        let page = query.page.normalized();
        Ok(Page {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    /// 对全部存量员工重新应用厂区归一化
    ///
    /// # 返回
    /// - Ok(usize): 实际改写的行数
    pub fn normalize_stored_plants(&self) -> ApiResult<usize> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = begin_unit_of_work(&mut conn)?;

        let repo = EmployeeRepository::new(&tx);
        let mut changed = 0;
        for (id, raw) in repo.list_raw_plants()? {
            let plant = normalize_plant(raw.as_deref());
            if raw.as_deref() != Some(plant.as_str()) {
                changed += repo.update_plant(id, plant)?;
            }
        }
        tx.commit()?;

        info!(changed, "存量厂区归一化完成");
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Plant;

    fn setup_api() -> EmployeeApi {
        let conn = crate::db::open_and_init(":memory:").unwrap();
        EmployeeApi::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let api = setup_api();
        let mut input = EmployeeUpsert::new(" 119397 ", "Jorge Andres Valdez Vazquez");
        input.plant = Some("planta 3".to_string());

        let first = api.upsert_by_number(&input).unwrap();
        assert!(first.created);
        assert_eq!(first.employee.employee_number, "119397");
        assert_eq!(first.employee.full_name, "Valdez Vazquez, Jorge Andres");
        assert_eq!(first.employee.short_name.as_deref(), Some("Jorge Valdez"));
        assert_eq!(first.employee.plant, Plant::Three);

        let second = api.upsert_by_number(&input).unwrap();
        assert!(!second.created);
        assert_eq!(second.employee, first.employee);
    }

    #[test]
    fn test_upsert_keeps_fields_absent_from_input() {
        let api = setup_api();
        let mut input = EmployeeUpsert::new("E1", "Doe, John");
        input.area = Some("Laminado".to_string());
        input.shift_code = Some("T2".to_string());
        api.upsert_by_number(&input).unwrap();

        let outcome = api
            .upsert_by_number(&EmployeeUpsert::new("E1", "Doe, Johnny"))
            .unwrap();
        assert_eq!(outcome.employee.full_name, "Doe, Johnny");
        assert_eq!(outcome.employee.area.as_deref(), Some("Laminado"));
        assert_eq!(outcome.employee.shift_code.as_deref(), Some("T2"));
    }

    #[test]
    fn test_upsert_requires_number_and_name() {
        let api = setup_api();
        assert!(matches!(
            api.upsert_by_number(&EmployeeUpsert::new("  ", "Doe, John")),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            api.upsert_by_number(&EmployeeUpsert::new("E1", "   ")),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_normalize_stored_plants_counts_changes() {
        let api = setup_api();
        {
            let conn = api.conn.lock().unwrap();
            conn.execute_batch(
                "INSERT INTO employee (employee_number, full_name, plant) VALUES ('A', 'A', 'Plant 1');
                 INSERT INTO employee (employee_number, full_name, plant) VALUES ('B', 'B', 'p3');
                 INSERT INTO employee (employee_number, full_name, plant) VALUES ('C', 'C', 'x');",
            )
            .unwrap();
        }
        assert_eq!(api.normalize_stored_plants().unwrap(), 2);
        assert_eq!(api.normalize_stored_plants().unwrap(), 0);

        let b = api.find_by_number("B").unwrap().unwrap();
        assert_eq!(b.plant, Plant::Three);
    }
}
