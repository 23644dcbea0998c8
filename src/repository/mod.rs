// ==========================================
// 假期排班记录系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 仓储借用调用方的连接/事务，事务边界由 API 层控制
// ==========================================

pub mod employee_repo;
pub mod error;
pub mod sql_builder;
pub mod vacation_repo;

// 重导出核心仓储
pub use employee_repo::EmployeeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use vacation_repo::VacationRepository;
