// ==========================================
// 假期排班记录系统 - 列名解析器
// ==========================================
// 职责: 将表头模糊匹配到逻辑字段
// 规则: 先按别名顺序精确匹配；无命中再做前缀匹配（表头按文件顺序，别名按列出顺序）
// 说明: 解析器从不失败，只报告有无；必需列缺失由调用方判定
// ==========================================

use crate::engine::text_folding::fold_key;
use crate::importer::file_parser::RawRow;
use serde::Serialize;
use std::collections::HashMap;

// ==========================================
// FieldKey - 逻辑字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKey {
    StartDate,
    EndDate,
    EmployeeNumber,
    Name,
    DayCount,
    Plant,
}

impl FieldKey {
    /// 导入必需字段
    pub const REQUIRED: [FieldKey; 4] = [
        FieldKey::StartDate,
        FieldKey::EndDate,
        FieldKey::EmployeeNumber,
        FieldKey::Name,
    ];

    /// 诊断信息中使用的列标签
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::StartDate => "Inicial",
            FieldKey::EndDate => "Final",
            FieldKey::EmployeeNumber => "#",
            FieldKey::Name => "Nombre",
            FieldKey::DayCount => "Gozo",
            FieldKey::Plant => "Planta",
        }
    }
}

// ==========================================
// FieldAliases - 字段别名表（有序）
// ==========================================
#[derive(Debug, Clone)]
pub struct FieldAliases {
    entries: Vec<(FieldKey, Vec<String>)>,
}

impl FieldAliases {
    pub fn new(entries: Vec<(FieldKey, Vec<String>)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(FieldKey, Vec<String>)> {
        self.entries.iter()
    }
}

fn aliases(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self::new(vec![
            (
                FieldKey::StartDate,
                aliases(&["inicial", "inicio", "fecha inicial", "start", "startdate"]),
            ),
            (
                FieldKey::EndDate,
                aliases(&[
                    "final",
                    "fin",
                    "fecha final",
                    "end",
                    "enddate",
                    "termino",
                    "regreso",
                ]),
            ),
            (
                FieldKey::EmployeeNumber,
                aliases(&["#", "num", "numero", "no", "id", "employee id", "empleado"]),
            ),
            (
                FieldKey::Name,
                aliases(&["nombre", "name", "empleado nombre", "nombre completo", "empleado"]),
            ),
            (
                FieldKey::DayCount,
                aliases(&["gozo", "dias", "dias gozo", "days"]),
            ),
            (FieldKey::Plant, aliases(&["planta", "plant", "site", "sede"])),
        ])
    }
}

// ==========================================
// ColumnMap - 解析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMap {
    columns: HashMap<FieldKey, String>,
}

impl ColumnMap {
    /// 字段对应的原始表头；未匹配返回 None
    pub fn column(&self, key: FieldKey) -> Option<&str> {
        self.columns.get(&key).map(String::as_str)
    }

    /// 缺失的字段
    pub fn missing(&self, required: &[FieldKey]) -> Vec<FieldKey> {
        required
            .iter()
            .copied()
            .filter(|key| !self.columns.contains_key(key))
            .collect()
    }

    /// 读取行中该字段的单元格（列未匹配或单元格不存在返回 None）
    pub fn value<'r>(&self, row: &'r RawRow, key: FieldKey) -> Option<&'r str> {
        self.column(key)
            .and_then(|header| row.get(header))
            .map(String::as_str)
    }
}

/// 解析列映射
///
/// # 参数
/// - headers: 表头（文件顺序）
/// - wants: 各字段的别名表
///
/// # 返回
/// - ColumnMap: 未匹配字段不出现在映射中
pub fn resolve_columns(headers: &[String], wants: &FieldAliases) -> ColumnMap {
    // 折叠表头 → 原始表头（重复折叠键保留首次出现）
    let mut folded_headers: Vec<(String, &String)> = Vec::with_capacity(headers.len());
    for header in headers {
        let folded = fold_key(header);
        if folded.is_empty() || folded_headers.iter().any(|(f, _)| *f == folded) {
            continue;
        }
        folded_headers.push((folded, header));
    }

    let mut columns = HashMap::new();
    for (key, alias_list) in wants.iter() {
        let folded_aliases: Vec<String> = alias_list.iter().map(|a| fold_key(a)).collect();

        // 精确匹配
        let exact = folded_aliases.iter().find_map(|alias| {
            folded_headers
                .iter()
                .find(|(folded, _)| folded == alias)
                .map(|(_, original)| *original)
        });

        // 前缀匹配
        let matched = exact.or_else(|| {
            folded_headers.iter().find_map(|(folded, original)| {
                folded_aliases
                    .iter()
                    .any(|alias| !alias.is_empty() && folded.starts_with(alias.as_str()))
                    .then_some(*original)
            })
        });

        if let Some(original) = matched {
            columns.insert(*key, original.clone());
        }
    }

    ColumnMap { columns }
}
