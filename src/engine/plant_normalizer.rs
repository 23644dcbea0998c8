// ==========================================
// 假期排班记录系统 - 厂区归一化
// ==========================================
// 输出只有两个规范值: "Plant 1" / "Plant 3"
// 无法识别的输入静默回落到 "Plant 1"，不报错
// ==========================================

use crate::domain::types::Plant;
use crate::engine::text_folding::fold_accents;

/// 需剥离的字面记号（按顺序，长记号在前）
const STRIP_TOKENS: [&str; 5] = ["planta", "plant", "pl", "p", "#"];

/// 识别为 Plant 1 的残留值
const PLANT_ONE_FORMS: [&str; 4] = ["1", "01", "uno", "one"];

/// 识别为 Plant 3 的残留值
const PLANT_THREE_FORMS: [&str; 4] = ["3", "03", "tres", "three"];

/// 归一化厂区名称
///
/// # 规则
/// 1. 空值 → Plant 1
/// 2. 小写、去空白，剥离 "planta"/"plant"/"pl"/"p"/"#" 及首尾句点（"Pl. 3."）
/// 3. 残留 1/01/uno/one → Plant 1；3/03/tres/three → Plant 3
/// 4. 其它 → Plant 1
pub fn normalize_plant(raw: Option<&str>) -> Plant {
    let raw = match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Plant::default(),
    };

    let mut residual: String = fold_accents(&raw.to_lowercase())
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    for token in STRIP_TOKENS {
        residual = residual.replace(token, "");
    }
    let residual = residual.trim_matches('.');

    if PLANT_ONE_FORMS.contains(&residual) {
        Plant::One
    } else if PLANT_THREE_FORMS.contains(&residual) {
        Plant::Three
    } else {
        Plant::One
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_defaults_to_plant_one() {
        assert_eq!(normalize_plant(None), Plant::One);
        assert_eq!(normalize_plant(Some("")), Plant::One);
        assert_eq!(normalize_plant(Some("   ")), Plant::One);
    }

    #[test]
    fn test_common_spellings() {
        assert_eq!(normalize_plant(Some("Planta 3")), Plant::Three);
        assert_eq!(normalize_plant(Some("PLANT 3")), Plant::Three);
        assert_eq!(normalize_plant(Some("P3")), Plant::Three);
        assert_eq!(normalize_plant(Some("#03")), Plant::Three);
        assert_eq!(normalize_plant(Some("Pl. 3.")), Plant::Three);
        assert_eq!(normalize_plant(Some("3")), Plant::Three);
        assert_eq!(normalize_plant(Some("Planta Tres")), Plant::Three);
        assert_eq!(normalize_plant(Some("Plant 1")), Plant::One);
        assert_eq!(normalize_plant(Some("planta uno")), Plant::One);
        assert_eq!(normalize_plant(Some("01")), Plant::One);
    }

    #[test]
    fn test_unrecognized_falls_back_to_plant_one() {
        assert_eq!(normalize_plant(Some("Plant 2")), Plant::One);
        assert_eq!(normalize_plant(Some("Monterrey")), Plant::One);
        assert_eq!(normalize_plant(Some("33")), Plant::One);
    }

    #[test]
    fn test_output_is_always_one_of_two_labels() {
        let inputs = ["", "x", "Planta 3", "p", "#", "...", "tres.", "ÚNO", "plant one"];
        for raw in inputs {
            let label = normalize_plant(Some(raw)).as_str();
            assert!(label == "Plant 1" || label == "Plant 3", "{}", raw);
        }
    }
}
