// ==========================================
// 假期排班记录系统 - SQL 构建工具
// ==========================================
// 职责: 列表查询的动态 WHERE 拼接（参数化，不拼接值）
// ==========================================

use crate::db::SEARCH_FOLD_FN;
use crate::engine::text_folding::fold_search;
use rusqlite::types::Value;

/// 动态过滤条件构建器
///
/// 子句中使用匿名占位符 `?`，值按 push 顺序绑定。
#[derive(Debug, Default)]
pub struct FilterBuilder {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个条件及其绑定值
    pub fn push(&mut self, clause: &str, values: Vec<Value>) -> &mut Self {
        self.clauses.push(clause.to_string());
        self.values.extend(values);
        self
    }

    /// 可选的精确匹配条件（空白值忽略）
    pub fn push_eq(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.map(str::trim).filter(|s| !s.is_empty()) {
            self.push(&format!("{} = ?", column), vec![Value::from(v.to_string())]);
        }
        self
    }

    /// 可选的模糊匹配条件: 任一列包含关键字（不区分大小写与重音）
    pub fn push_search(&mut self, columns: &[&str], search: Option<&str>) -> &mut Self {
        if let Some(pattern) = search.and_then(like_pattern) {
            let clause = columns
                .iter()
                .map(|c| format!("{}({}) LIKE ? ESCAPE '\\'", SEARCH_FOLD_FN, c))
                .collect::<Vec<_>>()
                .join(" OR ");
            let values = columns.iter().map(|_| Value::from(pattern.clone())).collect();
            self.push(&format!("({})", clause), values);
        }
        self
    }

    /// WHERE 子句（无条件时为空串）
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// 绑定值（克隆，便于 count 与分页查询复用）
    pub fn values(&self) -> Vec<Value> {
        self.values.clone()
    }
}

/// 构建 LIKE 模式: 检索折叠 + 转义 `%`/`_`/`\` + 前后 `%`；空白关键字返回 None
pub fn like_pattern(search: &str) -> Option<String> {
    let trimmed = search.trim();
    if trimmed.is_empty() {
        return None;
    }
    let escaped = fold_search(trimmed)
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("  Doe "), Some("%doe%".to_string()));
        assert_eq!(like_pattern("50%"), Some("%50\\%%".to_string()));
        assert_eq!(like_pattern("   "), None);
        assert_eq!(like_pattern("MARÍA"), Some("%maria%".to_string()));
    }

    #[test]
    fn test_filter_builder_sql() {
        let mut fb = FilterBuilder::new();
        assert_eq!(fb.where_sql(), "");

        fb.push_eq("e.plant", Some("Plant 3"))
            .push_eq("e.shift_code", Some("  "))
            .push_search(&["e.full_name", "e.employee_number"], Some("doe"));
        assert_eq!(
            fb.where_sql(),
            " WHERE e.plant = ? AND (search_fold(e.full_name) LIKE ? ESCAPE '\\' OR search_fold(e.employee_number) LIKE ? ESCAPE '\\')"
        );
        assert_eq!(fb.values().len(), 3);
    }
}
