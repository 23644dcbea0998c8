// ==========================================
// 假期排班记录系统 - 姓名规范化
// ==========================================
// 规范形式: "Surname, GivenName"
// 纯函数，无失败路径（总是返回字符串，可能为空）
// ==========================================

/// 折叠空白: 去首尾 + 连续空白压缩为单个空格
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 组合姓/名: 两者都非空 → "姓, 名"；只有一个 → 该值；都空 → ""
fn combine(surname: &str, given_name: &str) -> String {
    match (surname.is_empty(), given_name.is_empty()) {
        (false, false) => format!("{}, {}", surname, given_name),
        (false, true) => surname.to_string(),
        (true, false) => given_name.to_string(),
        (true, true) => String::new(),
    }
}

/// 规范化姓名
///
/// # 规则
/// 1. surname/given_name 任一给出（非空白）→ 各自折叠空白后组合
/// 2. 否则处理 raw_name:
///    - 含逗号: 按第一个逗号切分，两侧 trim 后组合
///    - ≥3 段: 末两段为姓，其余为名
///    - 2 段: 视为 "名 姓"，交换为 "姓, 名"
///    - 0/1 段: 原样（trim）返回
pub fn canonicalize(
    raw_name: Option<&str>,
    surname: Option<&str>,
    given_name: Option<&str>,
) -> String {
    let surname = surname.map(collapse_whitespace).unwrap_or_default();
    let given_name = given_name.map(collapse_whitespace).unwrap_or_default();
    if !surname.is_empty() || !given_name.is_empty() {
        return combine(&surname, &given_name);
    }

    let raw = collapse_whitespace(raw_name.unwrap_or_default());
    if let Some((left, right)) = raw.split_once(',') {
        return combine(left.trim(), right.trim());
    }

    let tokens: Vec<&str> = raw.split(' ').filter(|t| !t.is_empty()).collect();
    match tokens.len() {
        0 | 1 => raw,
        2 => combine(tokens[1], tokens[0]),
        n => {
            let surname = tokens[n - 2..].join(" ");
            let given = tokens[..n - 2].join(" ");
            combine(&surname, &given)
        }
    }
}

/// 由规范姓名派生显示简称
///
/// - 含逗号: "名的首段 姓的首段"
/// - 否则 ≥2 段: 前两段
/// - 否则原样返回；空输入返回空
pub fn derive_short_name(canonical: &str) -> String {
    let canonical = canonical.trim();
    if canonical.is_empty() {
        return String::new();
    }

    if let Some((surname_part, given_part)) = canonical.split_once(',') {
        let surname_first = surname_part.split_whitespace().next().unwrap_or_default();
        let given_first = given_part.split_whitespace().next().unwrap_or_default();
        return [given_first, surname_first]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
    }

    let tokens: Vec<&str> = canonical.split_whitespace().collect();
    if tokens.len() >= 2 {
        format!("{} {}", tokens[0], tokens[1])
    } else {
        canonical.to_string()
    }
}
