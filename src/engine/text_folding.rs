// ==========================================
// 假期排班记录系统 - 文本折叠
// ==========================================
// 用于表头/厂区等宽松匹配: 重音元音 → 基础元音
// ==========================================

/// 重音元音折叠为 ASCII 基础元音（ñ 等其它字符保持不变）
pub fn fold_accents(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            other => other,
        })
        .collect()
}

/// 匹配键: trim + 小写 + 重音折叠
pub fn fold_key(value: &str) -> String {
    fold_accents(&value.trim().to_lowercase())
}

/// 检索键: 小写 + 重音折叠（保留空白，用于子串匹配）
pub fn fold_search(value: &str) -> String {
    fold_accents(&value.to_lowercase())
}
