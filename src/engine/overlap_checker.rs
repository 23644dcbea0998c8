// ==========================================
// 假期排班记录系统 - 重叠检查器
// ==========================================
// 规则: 闭区间相交 stored.start ≤ end AND stored.end ≥ start
// 红线: 必须与随后的插入/更新处于同一事务（BEGIN IMMEDIATE 工作单元）
// 红线: Engine 不拼 SQL，查询委托给 VacationRepository
// ==========================================

use crate::domain::vacation::DateRange;
use crate::repository::error::RepositoryResult;
use crate::repository::vacation_repo::VacationRepository;
use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

/// 重叠冲突详情
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapConflict {
    pub employee_id: i64,
    pub range: DateRange,
    pub conflicting_entry_ids: Vec<i64>,
}

impl OverlapConflict {
    /// 面向调用方的冲突描述
    pub fn message(&self) -> String {
        let ids = self
            .conflicting_entry_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "员工 {} 的假期 {} ~ {} 与已有记录重叠 (entry_id: {})",
            self.employee_id, self.range.start, self.range.end, ids
        )
    }
}

// ==========================================
// OverlapChecker
// ==========================================
pub struct OverlapChecker<'c> {
    vacations: VacationRepository<'c>,
}

impl<'c> OverlapChecker<'c> {
    /// # 参数
    /// - conn: 当前工作单元（事务或保存点）的连接
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            vacations: VacationRepository::new(conn),
        }
    }

    /// 候选区间是否与该员工已存记录相交
    ///
    /// # 参数
    /// - exclude_entry_id: 更新时排除自身
    pub fn has_overlap(
        &self,
        employee_id: i64,
        range: &DateRange,
        exclude_entry_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let exists = self
            .vacations
            .exists_overlap(employee_id, range, exclude_entry_id)?;
        debug!(
            employee_id,
            start = %range.start,
            end = %range.end,
            exclude_entry_id = ?exclude_entry_id,
            exists,
            "重叠检查"
        );
        Ok(exists)
    }

    /// 查找冲突；无冲突返回 None
    pub fn find_conflict(
        &self,
        employee_id: i64,
        range: &DateRange,
        exclude_entry_id: Option<i64>,
    ) -> RepositoryResult<Option<OverlapConflict>> {
        if !self.has_overlap(employee_id, range, exclude_entry_id)? {
            return Ok(None);
        }
        let conflicting_entry_ids =
            self.vacations
                .overlapping_ids(employee_id, range, exclude_entry_id)?;
        Ok(Some(OverlapConflict {
            employee_id,
            range: *range,
            conflicting_entry_ids,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::EntrySource;
    use crate::domain::vacation::NewVacationRow;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn setup() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO employee (employee_number, full_name) VALUES ('X', 'Doe, John')",
            [],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        (conn, id)
    }

    #[test]
    fn test_shared_boundary_conflicts() {
        let (conn, emp) = setup();
        let entry_id = VacationRepository::new(&conn)
            .insert(&NewVacationRow {
                employee_id: emp,
                start_date: d(1),
                end_date: d(10),
                kind: "Paid Vacation".to_string(),
                day_count: None,
                source: EntrySource::Manual,
            })
            .unwrap();

        let checker = OverlapChecker::new(&conn);
        let candidate = DateRange::new(d(10), d(15)).unwrap();
        let conflict = checker.find_conflict(emp, &candidate, None).unwrap().unwrap();
        assert_eq!(conflict.conflicting_entry_ids, vec![entry_id]);
        assert!(conflict.message().contains("2024-06-10"));

        // 更新自身不算冲突
        assert!(!checker.has_overlap(emp, &candidate, Some(entry_id)).unwrap());

        let later = DateRange::new(d(11), d(15)).unwrap();
        assert!(checker.find_conflict(emp, &later, None).unwrap().is_none());
    }
}
