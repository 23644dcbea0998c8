// ==========================================
// 假期排班记录系统 - 假期数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（重叠判定由 engine 调用 exists_overlap 完成）
// 说明: 日期以 YYYY-MM-DD 文本存储，区间比较直接用文本比较
// ==========================================

use crate::domain::employee::Employee;
use crate::domain::types::{EntrySource, Plant};
use crate::domain::vacation::{DateRange, NewVacationRow, VacationEntry, VacationQuery};
use crate::repository::employee_repo::{map_employee, EMPLOYEE_COLUMNS};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_builder::FilterBuilder;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

/// vacation_entry 表查询列（别名 v）
const VACATION_COLUMNS: &str =
    "v.id, v.employee_id, v.start_date, v.end_date, v.kind, v.day_count, v.source";

const VACATION_COLUMN_COUNT: usize = 7;

fn map_vacation(row: &Row<'_>) -> rusqlite::Result<VacationEntry> {
    Ok(VacationEntry {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        kind: row.get(4)?,
        day_count: row.get(5)?,
        source: EntrySource::from_db_str(&row.get::<_, String>(6)?),
    })
}

/// 联表行: 假期列在前，员工列在后
fn map_vacation_with_employee(row: &Row<'_>) -> rusqlite::Result<(VacationEntry, Employee)> {
    Ok((map_vacation(row)?, map_employee(row, VACATION_COLUMN_COUNT)?))
}

// ==========================================
// VacationRepository - 假期仓储
// ==========================================
pub struct VacationRepository<'c> {
    conn: &'c Connection,
}

impl<'c> VacationRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<VacationEntry>> {
        let sql = format!(
            "SELECT {} FROM vacation_entry v WHERE v.id = ?1",
            VACATION_COLUMNS
        );
        let entry = self
            .conn
            .query_row(&sql, params![id], map_vacation)
            .optional()?;
        Ok(entry)
    }

    /// 插入假期，返回新 ID
    pub fn insert(&self, row: &NewVacationRow) -> RepositoryResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO vacation_entry (
                employee_id, start_date, end_date, kind, day_count, source
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                row.employee_id,
                row.start_date,
                row.end_date,
                row.kind,
                row.day_count,
                row.source.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// 整行回写（source 不可修改）
    pub fn update(&self, entry: &VacationEntry) -> RepositoryResult<()> {
        let rows = self.conn.execute(
            r#"
            UPDATE vacation_entry SET
                employee_id = ?2,
                start_date = ?3,
                end_date = ?4,
                kind = ?5,
                day_count = ?6
            WHERE id = ?1
            "#,
            params![
                entry.id,
                entry.employee_id,
                entry.start_date,
                entry.end_date,
                entry.kind,
                entry.day_count,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "VacationEntry".to_string(),
                id: entry.id.to_string(),
            });
        }
        Ok(())
    }

    /// 硬删除，返回受影响行数
    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let rows = self
            .conn
            .execute("DELETE FROM vacation_entry WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    /// 是否存在与区间相交的已存记录（闭区间）
    ///
    /// # 参数
    /// - `exclude_id`: 更新场景下排除记录自身
    pub fn exists_overlap(
        &self,
        employee_id: i64,
        range: &DateRange,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let exists: bool = self.conn.query_row(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM vacation_entry
                WHERE employee_id = ?1
                  AND start_date <= ?3
                  AND end_date >= ?2
                  AND (?4 IS NULL OR id <> ?4)
            )
            "#,
            params![employee_id, range.start, range.end, exclude_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// 与区间相交的记录 ID（用于冲突诊断）
    pub fn overlapping_ids(
        &self,
        employee_id: i64,
        range: &DateRange,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id FROM vacation_entry
            WHERE employee_id = ?1
              AND start_date <= ?3
              AND end_date >= ?2
              AND (?4 IS NULL OR id <> ?4)
            ORDER BY start_date ASC, id ASC
            "#,
        )?;
        let ids = stmt
            .query_map(params![employee_id, range.start, range.end, exclude_id], |row| {
                row.get(0)
            })?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// 员工名下全部假期（按开始日期）
    pub fn list_by_employee(&self, employee_id: i64) -> RepositoryResult<Vec<VacationEntry>> {
        let sql = format!(
            "SELECT {} FROM vacation_entry v WHERE v.employee_id = ?1 ORDER BY v.start_date ASC, v.id ASC",
            VACATION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![employee_id], map_vacation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// 时间窗口内的假期分页列表（含员工信息）
    ///
    /// 排序: start_date 倒序，同日按 id 倒序
    pub fn list_in_window(
        &self,
        query: &VacationQuery,
    ) -> RepositoryResult<(Vec<(VacationEntry, Employee)>, i64)> {
        let mut filters = FilterBuilder::new();
        filters
            .push(
                "v.start_date <= ? AND v.end_date >= ?",
                vec![
                    Value::from(query.window_end.to_string()),
                    Value::from(query.window_start.to_string()),
                ],
            )
            .push_eq("e.plant", query.plant.map(|p| p.as_str()))
            .push_eq("e.shift_code", query.shift_code.as_deref())
            .push_search(
                &["e.full_name", "e.employee_number"],
                query.search.as_deref(),
            );

        let where_sql = filters.where_sql();
        let from_sql = "FROM vacation_entry v JOIN employee e ON e.id = v.employee_id";

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) {}{}", from_sql, where_sql),
            params_from_iter(filters.values()),
            |row| row.get(0),
        )?;

        let mut values = filters.values();
        values.push(Value::from(query.page.limit()));
        values.push(Value::from(query.page.offset()));

        let sql = format!(
            "SELECT {}, {} {}{} ORDER BY v.start_date DESC, v.id DESC LIMIT ? OFFSET ?",
            VACATION_COLUMNS, EMPLOYEE_COLUMNS, from_sql, where_sql
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values), map_vacation_with_employee)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((items, total))
    }

    /// 日历数据: 与窗口相交的假期，仅在职员工
    pub fn calendar_items(
        &self,
        window: &DateRange,
        plant: Option<Plant>,
        search: Option<&str>,
    ) -> RepositoryResult<Vec<(VacationEntry, Employee)>> {
        let mut filters = FilterBuilder::new();
        filters
            .push(
                "v.start_date <= ? AND v.end_date >= ?",
                vec![
                    Value::from(window.end.to_string()),
                    Value::from(window.start.to_string()),
                ],
            )
            .push("e.active = 1", vec![])
            .push_eq("e.plant", plant.map(|p| p.as_str()))
            .push_search(&["e.full_name", "e.employee_number"], search);

        let sql = format!(
            "SELECT {}, {} FROM vacation_entry v JOIN employee e ON e.id = v.employee_id{} \
             ORDER BY v.start_date ASC, v.id ASC",
            VACATION_COLUMNS,
            EMPLOYEE_COLUMNS,
            filters.where_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(filters.values()), map_vacation_with_employee)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::employee::NewEmployee;
    use crate::repository::employee_repo::EmployeeRepository;
    use chrono::NaiveDate;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn insert_employee(conn: &Connection, number: &str, name: &str, plant: Plant) -> i64 {
        EmployeeRepository::new(conn)
            .insert(&NewEmployee {
                employee_number: number.to_string(),
                full_name: name.to_string(),
                short_name: None,
                area: None,
                shift_code: Some("T1".to_string()),
                plant,
                photo_url: None,
                active: true,
            })
            .unwrap()
    }

    fn row(employee_id: i64, start: u32, end: u32) -> NewVacationRow {
        NewVacationRow {
            employee_id,
            start_date: d(start),
            end_date: d(end),
            kind: "Paid Vacation".to_string(),
            day_count: Some((end - start + 1) as f64),
            source: EntrySource::Manual,
        }
    }

    #[test]
    fn test_insert_find_delete() {
        let conn = setup_test_db();
        let emp = insert_employee(&conn, "E1", "Doe, John", Plant::One);
        let repo = VacationRepository::new(&conn);

        let id = repo.insert(&row(emp, 1, 3)).unwrap();
        let entry = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(entry.start_date, d(1));
        assert_eq!(entry.end_date, d(3));
        assert_eq!(entry.day_count, Some(3.0));

        assert_eq!(repo.delete(id).unwrap(), 1);
        assert!(repo.find_by_id(id).unwrap().is_none());
        assert_eq!(repo.delete(id).unwrap(), 0);
    }

    #[test]
    fn test_exists_overlap_inclusive_bounds() {
        let conn = setup_test_db();
        let emp = insert_employee(&conn, "E1", "Doe, John", Plant::One);
        let other = insert_employee(&conn, "E2", "Roe, Jane", Plant::One);
        let repo = VacationRepository::new(&conn);
        let id = repo.insert(&row(emp, 1, 3)).unwrap();

        let touching = DateRange::new(d(3), d(5)).unwrap();
        let disjoint = DateRange::new(d(4), d(6)).unwrap();

        assert!(repo.exists_overlap(emp, &touching, None).unwrap());
        assert!(!repo.exists_overlap(emp, &disjoint, None).unwrap());
        assert!(!repo.exists_overlap(other, &touching, None).unwrap());
        assert!(!repo.exists_overlap(emp, &touching, Some(id)).unwrap());
        assert_eq!(repo.overlapping_ids(emp, &touching, None).unwrap(), vec![id]);
    }

    #[test]
    fn test_foreign_key_enforced() {
        let conn = setup_test_db();
        let err = VacationRepository::new(&conn)
            .insert(&row(999, 1, 2))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }

    #[test]
    fn test_list_in_window_order_and_filters() {
        let conn = setup_test_db();
        let a = insert_employee(&conn, "E1", "Doe, John", Plant::One);
        let b = insert_employee(&conn, "E2", "Roe, Jane", Plant::Three);
        let repo = VacationRepository::new(&conn);

        let early = repo.insert(&row(a, 1, 2)).unwrap();
        let late = repo.insert(&row(b, 10, 12)).unwrap();
        repo.insert(&row(a, 25, 28)).unwrap();

        let query = VacationQuery::new(d(1), d(15));
        let (items, total) = repo.list_in_window(&query).unwrap();
        assert_eq!(total, 2);
        assert_eq!(
            items.iter().map(|(v, _)| v.id).collect::<Vec<_>>(),
            vec![late, early]
        );
        assert_eq!(items[0].1.employee_number, "E2");

        let mut query = VacationQuery::new(d(1), d(30));
        query.plant = Some(Plant::Three);
        let (items, total) = repo.list_in_window(&query).unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].0.id, late);

        let mut query = VacationQuery::new(d(1), d(30));
        query.search = Some("doe".to_string());
        assert_eq!(repo.list_in_window(&query).unwrap().1, 2);
    }

    #[test]
    fn test_calendar_items_skip_inactive() {
        let conn = setup_test_db();
        let a = insert_employee(&conn, "E1", "Doe, John", Plant::One);
        let b = insert_employee(&conn, "E2", "Roe, Jane", Plant::One);
        let repo = VacationRepository::new(&conn);
        repo.insert(&row(a, 2, 4)).unwrap();
        repo.insert(&row(b, 3, 5)).unwrap();
        EmployeeRepository::new(&conn).set_active(b, false).unwrap();

        let window = DateRange::new(d(1), d(14)).unwrap();
        let items = repo.calendar_items(&window, None, None).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].1.id, a);
    }
}
