// ==========================================
// 假期排班记录系统 - 员工数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 仓储借用调用方的工作单元连接（事务/保存点），不自持连接
// ==========================================

use crate::domain::employee::{Employee, EmployeeQuery, NewEmployee};
use crate::domain::types::Plant;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::FilterBuilder;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

/// employee 表查询列（别名 e）
pub(crate) const EMPLOYEE_COLUMNS: &str = "e.id, e.employee_number, e.full_name, e.short_name, \
     e.area, e.shift_code, e.plant, e.photo_url, e.active";

/// 从结果行映射员工（base 为起始列下标，便于联表查询复用）
pub(crate) fn map_employee(row: &Row<'_>, base: usize) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(base)?,
        employee_number: row.get(base + 1)?,
        full_name: row.get(base + 2)?,
        short_name: row.get(base + 3)?,
        area: row.get(base + 4)?,
        shift_code: row.get(base + 5)?,
        plant: Plant::from_db_str(&row.get::<_, String>(base + 6)?),
        photo_url: row.get(base + 7)?,
        active: row.get(base + 8)?,
    })
}

// ==========================================
// EmployeeRepository - 员工仓储
// ==========================================
pub struct EmployeeRepository<'c> {
    conn: &'c Connection,
}

impl<'c> EmployeeRepository<'c> {
    /// 基于工作单元连接创建仓储
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// 按内部 ID 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employee e WHERE e.id = ?1", EMPLOYEE_COLUMNS);
        let employee = self
            .conn
            .query_row(&sql, params![id], |row| map_employee(row, 0))
            .optional()?;
        Ok(employee)
    }

    /// 按内部 ID 查询，不存在时返回 NotFound
    pub fn get_by_id(&self, id: i64) -> RepositoryResult<Employee> {
        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Employee".to_string(),
            id: id.to_string(),
        })
    }

    /// 按业务键（工号）查询
    pub fn find_by_number(&self, employee_number: &str) -> RepositoryResult<Option<Employee>> {
        let sql = format!(
            "SELECT {} FROM employee e WHERE e.employee_number = ?1",
            EMPLOYEE_COLUMNS
        );
        let employee = self
            .conn
            .query_row(&sql, params![employee_number], |row| map_employee(row, 0))
            .optional()?;
        Ok(employee)
    }

    /// 插入员工，返回新 ID
    pub fn insert(&self, employee: &NewEmployee) -> RepositoryResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO employee (
                employee_number, full_name, short_name, area,
                shift_code, plant, photo_url, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                employee.employee_number,
                employee.full_name,
                employee.short_name,
                employee.area,
                employee.shift_code,
                employee.plant.as_str(),
                employee.photo_url,
                employee.active,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 整行回写可变字段
    pub fn update(&self, employee: &Employee) -> RepositoryResult<()> {
        let rows = self.conn.execute(
            r#"
            UPDATE employee SET
                employee_number = ?2,
                full_name = ?3,
                short_name = ?4,
                area = ?5,
                shift_code = ?6,
                plant = ?7,
                photo_url = ?8,
                active = ?9,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                employee.id,
                employee.employee_number,
                employee.full_name,
                employee.short_name,
                employee.area,
                employee.shift_code,
                employee.plant.as_str(),
                employee.photo_url,
                employee.active,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Employee".to_string(),
                id: employee.id.to_string(),
            });
        }
        Ok(())
    }

    /// 仅更新厂区
    pub fn update_plant(&self, id: i64, plant: Plant) -> RepositoryResult<usize> {
        let rows = self.conn.execute(
            "UPDATE employee SET plant = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![id, plant.as_str()],
        )?;
        Ok(rows)
    }

    /// 设置启用标记（软删除/恢复）
    pub fn set_active(&self, id: i64, active: bool) -> RepositoryResult<usize> {
        let rows = self.conn.execute(
            "UPDATE employee SET active = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![id, active],
        )?;
        Ok(rows)
    }

    /// 读取全部员工的原始厂区文本（用于存量归一化）
    pub fn list_raw_plants(&self) -> RepositoryResult<Vec<(i64, Option<String>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, plant FROM employee ORDER BY id ASC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// 分页列表（按 ID 倒序）
    ///
    /// # 返回
    /// - (当前页员工, 符合条件的总数)
    pub fn list(&self, query: &EmployeeQuery) -> RepositoryResult<(Vec<Employee>, i64)> {
        let mut filters = FilterBuilder::new();
        if !query.include_inactive {
            filters.push("e.active = 1", vec![]);
        }
        filters
            .push_eq("e.plant", query.plant.map(|p| p.as_str()))
            .push_eq("e.shift_code", query.shift_code.as_deref())
            .push_search(
                &["e.full_name", "e.employee_number"],
                query.search.as_deref(),
            );

        let where_sql = filters.where_sql();

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM employee e{}", where_sql),
            params_from_iter(filters.values()),
            |row| row.get(0),
        )?;

        let mut values = filters.values();
        values.push(Value::from(query.page.limit()));
        values.push(Value::from(query.page.offset()));

        let sql = format!(
            "SELECT {} FROM employee e{} ORDER BY e.id DESC LIMIT ? OFFSET ?",
            EMPLOYEE_COLUMNS, where_sql
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values), |row| map_employee(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PageRequest;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn
    }

    fn make_employee(number: &str, name: &str, plant: Plant) -> NewEmployee {
        NewEmployee {
            employee_number: number.to_string(),
            full_name: name.to_string(),
            short_name: None,
            area: None,
            shift_code: Some("T1".to_string()),
            plant,
            photo_url: None,
            active: true,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let conn = setup_test_db();
        let repo = EmployeeRepository::new(&conn);

        let id = repo
            .insert(&make_employee("119397", "Valdez Vazquez, Jorge Andres", Plant::One))
            .unwrap();

        let by_id = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(by_id.employee_number, "119397");
        assert!(by_id.active);

        let by_number = repo.find_by_number("119397").unwrap().unwrap();
        assert_eq!(by_number.id, id);
        assert!(repo.find_by_number("nope").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_number_rejected() {
        let conn = setup_test_db();
        let repo = EmployeeRepository::new(&conn);
        repo.insert(&make_employee("E1", "Doe, John", Plant::One)).unwrap();

        let err = repo
            .insert(&make_employee("E1", "Roe, Jane", Plant::Three))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_list_filters_and_order() {
        let conn = setup_test_db();
        let repo = EmployeeRepository::new(&conn);
        let a = repo.insert(&make_employee("E1", "Doe, John", Plant::One)).unwrap();
        let b = repo.insert(&make_employee("E2", "Roe, Jane", Plant::Three)).unwrap();
        let c = repo.insert(&make_employee("X3", "Poe, Edgar", Plant::Three)).unwrap();
        repo.set_active(c, false).unwrap();

        let (items, total) = repo.list(&EmployeeQuery::default()).unwrap();
        assert_eq!(total, 2);
        assert_eq!(items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![b, a]);

        let query = EmployeeQuery {
            plant: Some(Plant::Three),
            include_inactive: true,
            ..Default::default()
        };
        let (items, _) = repo.list(&query).unwrap();
        assert_eq!(items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![c, b]);

        let query = EmployeeQuery {
            search: Some("DOE".to_string()),
            ..Default::default()
        };
        let (items, total) = repo.list(&query).unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].id, a);

        let query = EmployeeQuery {
            search: Some("e2".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&query).unwrap().1, 1);
    }

    #[test]
    fn test_list_pagination() {
        let conn = setup_test_db();
        let repo = EmployeeRepository::new(&conn);
        for i in 0..5 {
            repo.insert(&make_employee(&format!("E{}", i), "Doe, John", Plant::One))
                .unwrap();
        }
        let query = EmployeeQuery {
            page: PageRequest::new(2, 2),
            ..Default::default()
        };
        let (items, total) = repo.list(&query).unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].employee_number, "E2");
    }

    #[test]
    fn test_update_missing_row_is_not_found() {
        let conn = setup_test_db();
        let repo = EmployeeRepository::new(&conn);
        let ghost = Employee {
            id: 42,
            employee_number: "G".to_string(),
            full_name: "Ghost".to_string(),
            short_name: None,
            area: None,
            shift_code: None,
            plant: Plant::One,
            photo_url: None,
            active: true,
        };
        assert!(matches!(
            repo.update(&ghost).unwrap_err(),
            RepositoryError::NotFound { .. }
        ));
    }
}
