//! `.sql` file adapter: whole-file read.
//!
//! Files are read in one piece. Splitting large files would risk cutting
//! statements in half; statement handling belongs to the SQL parser.

use std::{fs, path::Path};

use crate::error::{AppResult, file_error};

/// Read a `.sql` file into memory.
pub fn read(path: &Path) -> AppResult<String> {
    if path.is_dir() {
        return Err(file_error(
            path.display().to_string(),
            "不支持目录，请使用目录分析入口"
        ));
    }
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if ext.as_deref() != Some("sql") {
        return Err(file_error(
            path.display().to_string(),
            "不支持的文件类型，仅支持 .sql 文件"
        ));
    }
    fs::read_to_string(path)
        .map_err(|err| file_error(path.display().to_string(), format!("读取文件失败: {err}")))
}
