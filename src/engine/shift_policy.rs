// ==========================================
// 假期排班记录系统 - 未知班次占位策略
// ==========================================
// 导入新建员工时班次未知，按策略给出占位值
// 默认随机取 T1/T2/T3；测试注入固定值
// ==========================================

use rand::Rng;

/// 占位班次集合
pub const PLACEHOLDER_SHIFTS: [&str; 3] = ["T1", "T2", "T3"];

/// 班次占位策略
pub trait ShiftPlaceholderPolicy: Send + Sync {
    fn assign_shift(&self) -> String;
}

/// 随机占位（默认）
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomShiftPolicy;

impl ShiftPlaceholderPolicy for RandomShiftPolicy {
    fn assign_shift(&self) -> String {
        let idx = rand::thread_rng().gen_range(0..PLACEHOLDER_SHIFTS.len());
        PLACEHOLDER_SHIFTS[idx].to_string()
    }
}

/// 固定占位
#[derive(Debug, Clone)]
pub struct FixedShiftPolicy(pub String);

impl FixedShiftPolicy {
    pub fn new(shift_code: impl Into<String>) -> Self {
        Self(shift_code.into())
    }
}

impl ShiftPlaceholderPolicy for FixedShiftPolicy {
    fn assign_shift(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_policy_stays_in_set() {
        let policy = RandomShiftPolicy;
        for _ in 0..50 {
            let shift = policy.assign_shift();
            assert!(PLACEHOLDER_SHIFTS.contains(&shift.as_str()));
        }
    }

    #[test]
    fn test_fixed_policy() {
        assert_eq!(FixedShiftPolicy::new("T2").assign_shift(), "T2");
    }
}
