// ==========================================
// 假期排班记录系统 - 领域类型定义
// ==========================================
// 职责: 厂区、记录来源、分页等基础值类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 厂区 (Plant)
// ==========================================
// 红线: 只允许两个规范值，其它输入一律回落到 Plant 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Plant {
    #[default]
    #[serde(rename = "Plant 1")]
    One,
    #[serde(rename = "Plant 3")]
    Three,
}

impl Plant {
    /// 规范标签（与数据库存储一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            Plant::One => "Plant 1",
            Plant::Three => "Plant 3",
        }
    }

    /// 从数据库字符串解析（非规范值走归一化）
    pub fn from_db_str(s: &str) -> Self {
        crate::engine::plant_normalizer::normalize_plant(Some(s))
    }
}

impl fmt::Display for Plant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 假期记录来源 (Entry Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    #[default]
    Manual, // 人工录入
    Import, // 批量导入
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Manual => "manual",
            EntrySource::Import => "import",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s.trim() {
            "import" | "excel" => EntrySource::Import,
            _ => EntrySource::Manual,
        }
    }
}

impl fmt::Display for EntrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 分页
// ==========================================

/// 单页最大条数
pub const MAX_PAGE_SIZE: u32 = 100;

/// 默认单页条数
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 分页请求（page 从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// 规整分页参数: page ≥ 1, page_size ∈ [1, 100]
    pub fn normalized(&self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.normalized().page_size as i64
    }

    pub fn offset(&self) -> i64 {
        let p = self.normalized();
        (p.page as i64 - 1) * p.page_size as i64
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}
