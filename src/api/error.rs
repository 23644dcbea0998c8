// ==========================================
// 假期排班记录系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 分类: 领域错误（校验/未找到/冲突/引用无效/导入）与运行错误（数据库/内部）
// ==========================================

use crate::engine::overlap_checker::OverlapConflict;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 领域错误（调用方可修正输入后重试）
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 同一员工假期区间重叠
    #[error("假期冲突: {0}")]
    Conflict(String),

    /// 员工不存在或已停用
    #[error("引用无效: {0}")]
    ReferenceInvalid(String),

    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    // ==========================================
    // 运行错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),
}

impl ApiError {
    /// 是否为领域错误（区别于数据库/内部等运行错误）
    pub fn is_domain_error(&self) -> bool {
        match self {
            ApiError::ValidationError(_)
            | ApiError::NotFound(_)
            | ApiError::Conflict(_)
            | ApiError::ReferenceInvalid(_) => true,
            ApiError::Import(err) => matches!(
                err,
                ImportError::UnsupportedFormat(_)
                    | ImportError::FileNotFound(_)
                    | ImportError::TooManyRows { .. }
                    | ImportError::MissingColumns(_)
                    | ImportError::CsvParseError(_)
                    | ImportError::ExcelParseError(_)
            ),
            _ => false,
        }
    }
}

impl From<OverlapConflict> for ApiError {
    fn from(conflict: OverlapConflict) -> Self {
        ApiError::Conflict(conflict.message())
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            // 工号唯一约束（如并发新建同一工号）
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ReferenceInvalid(format!("外键约束违反: {}", msg))
            }
        }
    }
}

// 事务开启/提交失败
impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::from(err).into()
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Employee".to_string(),
            id: "7".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Employee"));
                assert!(msg.contains("7"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError =
            RepositoryError::DatabaseQueryError("disk I/O error".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseError(_)));
        assert!(!api_err.is_domain_error());
    }

    #[test]
    fn test_domain_error_classification() {
        assert!(ApiError::Conflict("x".to_string()).is_domain_error());
        assert!(ApiError::ReferenceInvalid("x".to_string()).is_domain_error());
        assert!(ApiError::from(ImportError::TooManyRows { rows: 2, max: 1 }).is_domain_error());
        assert!(!ApiError::from(ImportError::DatabaseTransactionError("x".to_string()))
            .is_domain_error());
        assert!(!ApiError::DatabaseConnectionError("x".to_string()).is_domain_error());
    }
}
