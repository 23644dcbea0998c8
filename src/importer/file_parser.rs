// ==========================================
// 假期排班记录系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输入: 内存字节或文件路径
// 输出: 表头（文件顺序）+ 行记录（HashMap<列名, 值>）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// 原始行记录
pub type RawRow = HashMap<String, String>;

/// 解析后的表格数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularData {
    /// 表头（保持文件中的列顺序）
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析内存中的文件内容
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<TabularData>;

    /// 解析磁盘文件
    fn parse_path(&self, file_path: &Path) -> ImportResult<TabularData> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }
        let bytes = std::fs::read(file_path)?;
        self.parse_bytes(&bytes)
    }
}

/// 解码文本: 优先 UTF-8（去 BOM），失败时回退 Windows-1252
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(error = %e, "UTF-8 解码失败，回退 Windows-1252");
            let (cow, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            cow.into_owned()
        }
    }
}

/// 将表头与数据行组装为行记录；完全空白的行跳过，重复表头取第一列
fn collect_row<I>(headers: &[String], cells: I) -> Option<RawRow>
where
    I: IntoIterator<Item = String>,
{
    let mut row_map = HashMap::new();
    for (col_idx, value) in cells.into_iter().enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if header.is_empty() {
                continue;
            }
            row_map
                .entry(header.clone())
                .or_insert_with(|| value.trim().to_string());
        }
    }
    if row_map.values().all(|v| v.is_empty()) {
        None
    } else {
        Some(row_map)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<TabularData> {
        let text = decode_text(bytes);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(row) = collect_row(&headers, record.iter().map(str::to_string)) {
                rows.push(row);
            }
        }

        debug!(columns = headers.len(), rows = rows.len(), "CSV 解析完成");
        Ok(TabularData { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

/// 单元格转文本: 日期单元格输出 YYYY-MM-DD
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => value.date().format("%Y-%m-%d").to_string(),
            None => dt.as_f64().to_string(),
        },
        other => other.to_string().trim().to_string(),
    }
}

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<TabularData> {
        // 根据内容识别 xlsx/xls
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows_iter = range.rows();
        let header_row = match rows_iter.next() {
            Some(row) => row,
            None => return Ok(TabularData::default()),
        };
        let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

        // 读取数据行
        let mut rows = Vec::new();
        for data_row in rows_iter {
            if let Some(row) = collect_row(&headers, data_row.iter().map(cell_to_string)) {
                rows.push(row);
            }
        }

        debug!(
            sheet = %sheet_name,
            columns = headers.len(),
            rows = rows.len(),
            "Excel 解析完成"
        );
        Ok(TabularData { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    fn parser_for(file_name: &str) -> ImportResult<Box<dyn FileParser>> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Box::new(CsvParser)),
            "xlsx" | "xls" => Ok(Box::new(ExcelParser)),
            _ => Err(ImportError::UnsupportedFormat(file_name.to_string())),
        }
    }

    /// 按文件名扩展名选择解析器并解析内存内容
    pub fn parse_bytes(&self, file_name: &str, bytes: &[u8]) -> ImportResult<TabularData> {
        Self::parser_for(file_name)?.parse_bytes(bytes)
    }

    /// 按扩展名选择解析器并解析磁盘文件
    pub fn parse_path<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<TabularData> {
        let path = file_path.as_ref();
        let file_name = path.to_string_lossy();
        Self::parser_for(&file_name)?.parse_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_csv_parser_keeps_header_order() {
        let data = b"Inicio,Termino,Num,Empleado\n2024-01-01,2024-01-03,E1,\"Doe, John\"\n";
        let table = CsvParser.parse_bytes(data).unwrap();

        assert_eq!(table.headers, vec!["Inicio", "Termino", "Num", "Empleado"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("Empleado"), Some(&"Doe, John".to_string()));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let data = b"Num,Nombre\nE1,Doe\n,\nE2,Roe\n";
        let table = CsvParser.parse_bytes(data).unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_csv_parser_duplicate_header_keeps_first_column() {
        let data = b"Num,Nombre,Nombre\nE1,\"Doe, John\",Otro\n";
        let table = CsvParser.parse_bytes(data).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["Nombre"], "Doe, John");
    }

    #[test]
    fn test_csv_parser_strips_bom() {
        let data = b"\xEF\xBB\xBFNum,Nombre\nE1,Doe\n";
        let table = CsvParser.parse_bytes(data).unwrap();
        assert_eq!(table.headers[0], "Num");
    }

    #[test]
    fn test_csv_parser_windows_1252_fallback() {
        // "Número" 以 Windows-1252 编码（ú = 0xFA）
        let data = b"N\xFAmero,Nombre\nE1,Pe\xF1a\n";
        let table = CsvParser.parse_bytes(data).unwrap();
        assert_eq!(table.headers[0], "Número");
        assert_eq!(table.rows[0].get("Nombre"), Some(&"Peña".to_string()));
    }

    #[test]
    fn test_parse_path_file_not_found() {
        let result = CsvParser.parse_path(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_dispatch() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Num,Nombre").unwrap();
        writeln!(temp_file, "E1,Doe").unwrap();

        let table = UniversalFileParser.parse_path(temp_file.path()).unwrap();
        assert_eq!(table.rows.len(), 1);

        let err = UniversalFileParser.parse_bytes("notes.txt", b"x").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        assert!(ExcelParser.parse_bytes(b"not a workbook").is_err());
    }
}
