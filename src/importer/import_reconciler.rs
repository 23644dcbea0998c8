// ==========================================
// 假期排班记录系统 - 导入对账器
// ==========================================
// 职责: 逐行落库（员工按工号 upsert + 创建假期）
// 红线: 单行失败不得中断整批；每行一个 SAVEPOINT，失败只回滚本行
// 红线: 导入不覆盖已存在员工的姓名等字段，只在厂区有值且不同时更新厂区
// ==========================================

use crate::domain::employee::NewEmployee;
use crate::domain::types::EntrySource;
use crate::domain::vacation::{DateRange, NewVacationRow, DEFAULT_VACATION_KIND};
use crate::engine::name_canonicalizer::{canonicalize, derive_short_name};
use crate::engine::overlap_checker::OverlapChecker;
use crate::engine::plant_normalizer::normalize_plant;
use crate::engine::shift_policy::{RandomShiftPolicy, ShiftPlaceholderPolicy};
use crate::importer::column_resolver::{ColumnMap, FieldKey};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::file_parser::RawRow;
use crate::repository::employee_repo::EmployeeRepository;
use crate::repository::error::RepositoryError;
use crate::repository::vacation_repo::VacationRepository;
use rusqlite::{Connection, Transaction};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 诊断信息条数上限
pub const MAX_DIAGNOSTICS: usize = 20;

/// 数据行在表格中的行号（表头占第 1 行）
fn sheet_row_number(index: usize) -> usize {
    index + 2
}

// ==========================================
// ImportSummary - 导入汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub total_rows: usize,
    pub employees_created: usize,
    pub entries_created: usize,
    pub rejected_count: usize,
    /// 行级诊断（最多 20 条）
    pub errors: Vec<String>,
    pub elapsed_ms: u64,
}

impl ImportSummary {
    fn record_rejection(&mut self, row_number: usize, reason: &str) {
        self.rejected_count += 1;
        if self.errors.len() < MAX_DIAGNOSTICS {
            self.errors.push(format!("第 {} 行: {}", row_number, reason));
        }
    }
}

/// 行处理失败
#[derive(Debug)]
enum RowRejection {
    /// 数据不合格（预期内的拒绝）
    Invalid(String),
    /// 落库等非预期失败
    Unexpected(String),
}

impl RowRejection {
    fn reason(&self) -> &str {
        match self {
            RowRejection::Invalid(msg) | RowRejection::Unexpected(msg) => msg,
        }
    }
}

impl From<RepositoryError> for RowRejection {
    fn from(err: RepositoryError) -> Self {
        RowRejection::Unexpected(format!("处理失败: {}", err))
    }
}

/// 单行成功结果
struct RowOutcome {
    employee_created: bool,
}

// ==========================================
// ImportReconciler
// ==========================================
pub struct ImportReconciler {
    shift_policy: Arc<dyn ShiftPlaceholderPolicy>,
    enforce_overlap: bool,
    cleaner: DataCleaner,
}

impl Default for ImportReconciler {
    fn default() -> Self {
        Self::new(Arc::new(RandomShiftPolicy), false)
    }
}

impl ImportReconciler {
    /// # 参数
    /// - shift_policy: 新员工班次占位策略
    /// - enforce_overlap: 导入行是否执行重叠检查
    pub fn new(shift_policy: Arc<dyn ShiftPlaceholderPolicy>, enforce_overlap: bool) -> Self {
        Self {
            shift_policy,
            enforce_overlap,
            cleaner: DataCleaner,
        }
    }

    /// 逐行对账
    ///
    /// # 参数
    /// - tx: 本次导入请求的事务（调用方负责提交）
    /// - rows: 数据行（不含表头）
    /// - columns: 已确认必需列齐全的列映射
    ///
    /// # 返回
    /// - ImportSummary: 计数与诊断；batch_id/elapsed_ms 由调用方填写
    pub fn reconcile(
        &self,
        tx: &mut Transaction<'_>,
        rows: &[RawRow],
        columns: &ColumnMap,
    ) -> ImportSummary {
        let mut summary = ImportSummary {
            total_rows: rows.len(),
            ..Default::default()
        };

        for (index, row) in rows.iter().enumerate() {
            let row_number = sheet_row_number(index);

            let savepoint = match tx.savepoint() {
                Ok(sp) => sp,
                Err(e) => {
                    warn!(row = row_number, error = %e, "创建保存点失败");
                    summary.record_rejection(row_number, &format!("处理失败: {}", e));
                    continue;
                }
            };

            let result = self
                .process_row(&savepoint, row, columns)
                .and_then(|outcome| {
                    savepoint
                        .commit()
                        .map(|_| outcome)
                        .map_err(|e| RowRejection::Unexpected(format!("处理失败: {}", e)))
                });

            match result {
                Ok(outcome) => {
                    if outcome.employee_created {
                        summary.employees_created += 1;
                    }
                    summary.entries_created += 1;
                }
                Err(rejection) => {
                    match &rejection {
                        RowRejection::Invalid(msg) => {
                            debug!(row = row_number, reason = %msg, "行被拒绝")
                        }
                        RowRejection::Unexpected(msg) => {
                            warn!(row = row_number, reason = %msg, "行处理异常")
                        }
                    }
                    summary.record_rejection(row_number, rejection.reason());
                }
            }
        }

        info!(
            total = summary.total_rows,
            employees_created = summary.employees_created,
            entries_created = summary.entries_created,
            rejected = summary.rejected_count,
            "导入对账完成"
        );
        summary
    }

    /// 处理单行（在保存点内执行）
    fn process_row(
        &self,
        conn: &Connection,
        row: &RawRow,
        columns: &ColumnMap,
    ) -> Result<RowOutcome, RowRejection> {
        // 1. 日期
        let start = self
            .cleaner
            .parse_date(columns.value(row, FieldKey::StartDate));
        let end = self.cleaner.parse_date(columns.value(row, FieldKey::EndDate));
        let range = match (start, end) {
            (Some(start), Some(end)) => DateRange::new(start, end).ok_or_else(|| {
                RowRejection::Invalid(format!("结束日期 {} 早于开始日期 {}", end, start))
            })?,
            _ => {
                return Err(RowRejection::Invalid(
                    "开始/结束日期缺失或无法解析".to_string(),
                ))
            }
        };

        // 2. 工号与姓名
        let employee_number = self
            .cleaner
            .normalize_text(columns.value(row, FieldKey::EmployeeNumber))
            .ok_or_else(|| RowRejection::Invalid("工号为空".to_string()))?;
        let raw_name = self
            .cleaner
            .normalize_text(columns.value(row, FieldKey::Name))
            .ok_or_else(|| RowRejection::Invalid("姓名为空".to_string()))?;

        // 3. 天数（解析失败视为缺失）
        let day_count = self
            .cleaner
            .parse_day_count(columns.value(row, FieldKey::DayCount));

        // 4. 厂区（列缺失或空单元格归为 Plant 1）
        let plant_cell = self
            .cleaner
            .normalize_null(columns.value(row, FieldKey::Plant));
        let plant = normalize_plant(plant_cell.as_deref());

        // 5. 员工 upsert
        let employees = EmployeeRepository::new(conn);
        let (employee_id, employee_created) = match employees.find_by_number(&employee_number)? {
            Some(existing) => {
                if existing.plant != plant {
                    employees.update_plant(existing.id, plant)?;
                    debug!(
                        employee_number = %employee_number,
                        from = %existing.plant,
                        to = %plant,
                        "导入更新厂区"
                    );
                }
                (existing.id, false)
            }
            None => {
                let full_name = canonicalize(Some(&raw_name), None, None);
                let short_name = derive_short_name(&full_name);
                let id = employees.insert(&NewEmployee {
                    employee_number: employee_number.clone(),
                    full_name,
                    short_name: (!short_name.is_empty()).then_some(short_name),
                    area: None,
                    shift_code: Some(self.shift_policy.assign_shift()),
                    plant,
                    photo_url: None,
                    active: true,
                })?;
                (id, true)
            }
        };

        // 可选: 重叠检查（同一事务内，已导入的前序行可见）
        if self.enforce_overlap {
            if let Some(conflict) =
                OverlapChecker::new(conn).find_conflict(employee_id, &range, None)?
            {
                return Err(RowRejection::Invalid(conflict.message()));
            }
        }

        // 6. 假期
        VacationRepository::new(conn).insert(&NewVacationRow {
            employee_id,
            start_date: range.start,
            end_date: range.end,
            kind: DEFAULT_VACATION_KIND.to_string(),
            day_count,
            source: EntrySource::Import,
        })?;

        Ok(RowOutcome { employee_created })
    }
}
