//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// MySQL 兼容性分析与 SQL 转换工具
///
/// 分析 MySQL SQL（文件、general log、目录或字符串），报告与
/// PostgreSQL/YugabyteDB 的兼容性问题，并输出转换后的 SQL 与
/// JSON/Markdown/HTML 报告。
#[derive(Parser, Debug)]
#[command(name = "sql-compat-analyzer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// 规则配置文件路径（YAML）。未指定时自动查找默认位置。
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 待分析的 SQL 文件、日志文件或目录路径。
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// 分析报告输出目录。未指定时默认为 ./output-report。
    #[arg(long = "reportPath")]
    pub report_path: Option<PathBuf>,

    /// 位置参数形式的待分析路径（与 --path 二选一）。
    #[arg(value_name = "PATH")]
    pub input: Option<PathBuf>
}

impl Cli {
    /// Path to analyze: `--path` wins over the positional argument.
    pub fn target_path(&self) -> Option<&PathBuf> {
        self.path.as_ref().or(self.input.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_path() {
        let cli = Cli::parse_from(["sql-compat-analyzer", "queries.sql"]);
        assert_eq!(cli.target_path().unwrap().to_str(), Some("queries.sql"));
    }

    #[test]
    fn test_path_flag_wins_over_positional() {
        let cli = Cli::parse_from(["sql-compat-analyzer", "--path", "a.sql", "b.sql"]);
        assert_eq!(cli.target_path().unwrap().to_str(), Some("a.sql"));
    }

    #[test]
    fn test_report_path_flag_name() {
        let cli = Cli::parse_from(["sql-compat-analyzer", "--reportPath", "out", "a.sql"]);
        assert_eq!(cli.report_path.unwrap().to_str(), Some("out"));
    }

    #[test]
    fn test_no_target() {
        let cli = Cli::parse_from(["sql-compat-analyzer"]);
        assert!(cli.target_path().is_none());
    }
}
