// ==========================================
// 假期排班记录系统 - 命令行入口
// ==========================================
// 用法:
//   vacation-ledger import <file>
//   vacation-ledger calendar [start] [end] [plant] [q]
//   vacation-ledger seed
//   vacation-ledger normalize-plants
// 说明: 日期格式 YYYY-MM-DD；占位参数可写 "-"；输出为 JSON
// ==========================================

use chrono::{Duration, Local, NaiveDate};
use std::error::Error;
use std::sync::{Arc, Mutex};
use vacation_ledger::api::{ApiError, EmployeeApi, ImportApi, VacationApi};
use vacation_ledger::config::get_default_db_path;
use vacation_ledger::db::open_and_init;
use vacation_ledger::domain::{CalendarQuery, EmployeeUpsert, VacationDraft};
use vacation_ledger::engine::normalize_plant;

const USAGE: &str = "用法: vacation-ledger <import <file> | calendar [start] [end] [plant] [q] | seed | normalize-plants>";

/// 可选位置参数: 缺省、空白或 "-" 视为 None
fn optional_arg(value: Option<&String>) -> Option<&str> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "-")
}

fn parse_date_arg(value: Option<&String>) -> Result<Option<NaiveDate>, Box<dyn Error>> {
    match optional_arg(value) {
        Some(v) => Ok(Some(
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map_err(|e| format!("日期格式错误 {}: {}", v, e))?,
        )),
        None => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    vacation_ledger::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("");

    let db_path = get_default_db_path();
    tracing::info!(
        app = vacation_ledger::APP_NAME,
        version = vacation_ledger::VERSION,
        db_path = %db_path,
        "启动"
    );
    let conn = Arc::new(Mutex::new(open_and_init(&db_path)?));

    match command {
        "import" => {
            let file = optional_arg(args.get(1)).ok_or(USAGE)?;
            let summary = ImportApi::new(conn).import_file(file).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "calendar" => {
            let query = CalendarQuery {
                start: parse_date_arg(args.get(1))?,
                end: parse_date_arg(args.get(2))?,
                plant: optional_arg(args.get(3)).map(|p| normalize_plant(Some(p))),
                search: optional_arg(args.get(4)).map(str::to_string),
            };
            let view = VacationApi::new(conn).calendar(&query)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        "seed" => {
            let today = Local::now().date_naive();
            let mut employee = EmployeeUpsert::new("119397", "Valdez Vazquez, Jorge Andres");
            employee.plant = Some("Plant 1".to_string());
            employee.shift_code = Some("T1".to_string());
            let draft = VacationDraft {
                start_date: today,
                end_date: today + Duration::days(2),
                kind: None,
                day_count: Some(3.0),
            };

            match VacationApi::new(conn).create_employee_and_vacation(&employee, &draft) {
                Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
                // 重复执行时示例假期已存在
                Err(ApiError::Conflict(msg)) => println!("已存在示例数据: {}", msg),
                Err(e) => return Err(e.into()),
            }
        }
        "normalize-plants" => {
            let changed = EmployeeApi::new(conn).normalize_stored_plants()?;
            println!("{}", serde_json::json!({ "changed": changed }));
        }
        _ => {
            eprintln!("{}", USAGE);
            return Err(format!("未知命令: {}", command).into());
        }
    }

    Ok(())
}
