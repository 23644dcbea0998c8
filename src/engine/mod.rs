// ==========================================
// 假期排班记录系统 - 引擎层
// ==========================================
// 职责: 实现业务规则（姓名/厂区规范化、重叠判定、占位策略）
// 红线: Engine 不拼 SQL
// ==========================================

pub mod name_canonicalizer;
pub mod overlap_checker;
pub mod plant_normalizer;
pub mod shift_policy;
pub mod text_folding;

// 重导出核心引擎
pub use name_canonicalizer::{canonicalize, derive_short_name};
pub use overlap_checker::{OverlapChecker, OverlapConflict};
pub use plant_normalizer::normalize_plant;
pub use shift_policy::{FixedShiftPolicy, RandomShiftPolicy, ShiftPlaceholderPolicy};
pub use text_folding::{fold_accents, fold_key};
