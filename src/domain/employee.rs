// ==========================================
// 假期排班记录系统 - 员工领域模型
// ==========================================
// 业务键: employee_number（外部工号，唯一）
// 删除语义: 软删除（active=false），保留假期记录引用
// ==========================================

use crate::domain::types::{PageRequest, Plant};
use serde::{Deserialize, Serialize};

// ==========================================
// Employee - 员工
// ==========================================
// 对齐: employee 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    // ===== 主键 =====
    pub id: i64,                 // 内部 ID（数据库分配）
    pub employee_number: String, // 业务键（工号）

    // ===== 姓名 =====
    pub full_name: String,          // 规范姓名 "Surname, GivenName"
    pub short_name: Option<String>, // 显示简称

    // ===== 归属 =====
    pub area: Option<String>,
    pub shift_code: Option<String>, // T1/T2/T3 等，不做枚举约束
    pub plant: Plant,

    // ===== 其它 =====
    pub photo_url: Option<String>,
    pub active: bool,
}

impl Employee {
    /// 显示用简称: short_name 缺失时取规范姓名逗号前部分
    pub fn display_short_name(&self) -> String {
        match self.short_name.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => self
                .full_name
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string(),
        }
    }
}

// ==========================================
// NewEmployee - 待插入员工行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub employee_number: String,
    pub full_name: String,
    pub short_name: Option<String>,
    pub area: Option<String>,
    pub shift_code: Option<String>,
    pub plant: Plant,
    pub photo_url: Option<String>,
    pub active: bool,
}

// ==========================================
// EmployeeUpsert - 按工号新增/更新的输入
// ==========================================
// 姓名可给整串 full_name，或拆分的 surname/given_name
// 除工号与姓名外的字段均为可选；缺失字段在更新路径上不覆盖已有值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeUpsert {
    pub employee_number: String,
    pub full_name: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub short_name: Option<String>,
    pub area: Option<String>,
    pub shift_code: Option<String>,
    pub plant: Option<String>,
    pub photo_url: Option<String>,
}

impl EmployeeUpsert {
    /// 仅工号 + 整串姓名的便捷构造
    pub fn new(employee_number: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            employee_number: employee_number.into(),
            full_name: Some(full_name.into()),
            ..Default::default()
        }
    }
}

/// 按工号 upsert 的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub employee: Employee,
    pub created: bool,
}

// ==========================================
// EmployeePatch - 局部更新
// ==========================================
// 只应用 Some 的字段；employee_number 仅用于显式更正
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeePatch {
    pub employee_number: Option<String>,
    pub full_name: Option<String>,
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub short_name: Option<String>,
    pub area: Option<String>,
    pub shift_code: Option<String>,
    pub plant: Option<String>,
    pub photo_url: Option<String>,
    pub active: Option<bool>,
}

impl EmployeePatch {
    pub fn touches_name(&self) -> bool {
        self.full_name.is_some() || self.surname.is_some() || self.given_name.is_some()
    }
}

// ==========================================
// EmployeeQuery - 列表查询条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeQuery {
    /// 姓名/工号模糊匹配（不区分大小写）
    pub search: Option<String>,
    pub plant: Option<Plant>,
    pub shift_code: Option<String>,
    /// 是否包含已软删除员工
    pub include_inactive: bool,
    pub page: PageRequest,
}
