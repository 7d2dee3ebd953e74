use std::{io::Write, sync::Arc, thread};

use sql_compat_analyzer::{analyzer::Analyzer, config::RuleSet, error::AnalysisError};
use tempfile::TempDir;

fn analyzer_with(yaml: &str) -> Analyzer {
    let rules = Arc::new(RuleSet::from_yaml(yaml).unwrap());
    Analyzer::from_rules(rules).unwrap()
}

const FUNCTION_RULES: &str = r#"
rules:
  - name: group_concat_to_string_agg
    description: GROUP_CONCAT 为 MySQL 特有的聚合函数
    category: function
    when: {pattern: GROUP_CONCAT}
    then: {action: replace_function, target: STRING_AGG}
  - name: ifnull_to_coalesce
    description: IFNULL 为 MySQL 特有函数
    category: function
    when: {pattern: IFNULL}
    then: {action: replace_function, target: COALESCE}
"#;

const SYNTAX_RULES: &str = r#"
rules:
  - name: auto_increment_to_serial
    description: AUTO_INCREMENT 为 MySQL 特有的自增语法
    category: syntax
    when: {pattern: AUTO_INCREMENT}
    then: {action: replace_constraint, target: SERIAL}
  - name: backtick_identifiers
    description: 反引号标识符为 MySQL 特有
    category: syntax
    when: {pattern: "`"}
    then: {action: replace_quotes, target: '"'}
"#;

const DATATYPE_RULES: &str = r#"
rules:
  - name: tinyint_to_smallint
    description: TINYINT 在目标数据库中不受支持
    category: datatype
    when: {pattern: TINYINT}
    then: {action: replace_type, target: SMALLINT}
"#;

const MIXED_RULES: &str = r#"
rules:
  - name: group_concat_to_string_agg
    description: GROUP_CONCAT 为 MySQL 特有的聚合函数
    category: function
    when: {pattern: GROUP_CONCAT}
    then: {action: replace_function, target: STRING_AGG}
  - name: tinyint_to_smallint
    description: TINYINT 在目标数据库中不受支持
    category: datatype
    when: {pattern: TINYINT}
    then: {action: replace_type, target: SMALLINT}
"#;

const CHARSET_RULES: &str = r#"
rules:
  - name: utf8mb4_charset
    description: UTF8MB4 字符集在目标数据库中对应 UTF8
    category: charset
    when: {pattern: UTF8MB4}
    then: {action: replace_charset, target: UTF8}
"#;

#[test]
fn test_group_concat_rewritten_to_string_agg() {
    let analyzer = analyzer_with(FUNCTION_RULES);
    let result = analyzer
        .analyze_sql("SELECT GROUP_CONCAT(name) FROM users", "input_string")
        .unwrap();

    assert_eq!(result.issues.len(), 1);
    let issue = &result.issues[0];
    assert_eq!(issue.checker, "FunctionChecker");
    assert!(issue.message.contains("GROUP_CONCAT"));
    assert!(issue.message.contains("STRING_AGG"));
    assert!(issue.autofix.available);
    assert_eq!(issue.autofix.code, "GROUP_CONCAT -> STRING_AGG");

    assert!(result.transformed_sql.contains("STRING_AGG(name)"));
    assert!(!result.transformed_sql.contains("GROUP_CONCAT"));
}

#[test]
fn test_auto_increment_removed() {
    let analyzer = analyzer_with(SYNTAX_RULES);
    let sql = "CREATE TABLE t (id INT AUTO_INCREMENT PRIMARY KEY, name VARCHAR(255), tags JSON)";
    let result = analyzer.analyze_sql(sql, "input_string").unwrap();

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].checker, "SyntaxChecker");
    assert!(result.issues[0].message.contains("AUTO_INCREMENT"));

    let transformed = result.transformed_sql.to_uppercase();
    assert!(!transformed.contains("AUTO_INCREMENT"));
    assert!(transformed.contains("PRIMARY KEY"));
    assert!(transformed.contains("JSON"));
}

#[test]
fn test_tinyint_becomes_smallint() {
    let analyzer = analyzer_with(DATATYPE_RULES);
    let result = analyzer.analyze_sql("CREATE TABLE u (x TINYINT)", "input_string").unwrap();

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].checker, "DataTypeChecker");
    assert!(result.issues[0].message.contains("TINYINT"));
    assert!(result.issues[0].message.contains("SMALLINT"));

    let transformed = result.transformed_sql.to_uppercase();
    assert!(transformed.contains("SMALLINT"));
    assert!(!transformed.contains("TINYINT"));
}

#[test]
fn test_charset_introducer_stripped_without_matching_rule() {
    // A backtick rule is present but never exercised; the introducer is
    // stripped unconditionally by the restorer.
    let analyzer = analyzer_with(SYNTAX_RULES);
    let result = analyzer
        .analyze_sql("UPDATE users SET name = _utf8mb4'test' WHERE id = 1", "input_string")
        .unwrap();

    assert!(result.issues.is_empty());
    let lower = result.transformed_sql.to_lowercase();
    assert!(!lower.contains("_utf8mb4"));
    assert!(result.transformed_sql.contains("'test'"));
    assert!(result.transformed_sql.to_uppercase().contains("UPDATE"));
}

#[test]
fn test_no_introducer_survives_any_casing() {
    let analyzer = analyzer_with("");
    for sql in [
        "SELECT _UTF8MB4'a'",
        "SELECT _utf8'b'",
        "SELECT _latin1'c'",
        "SELECT _binary'd'",
    ] {
        let result = analyzer.analyze_sql(sql, "input_string").unwrap();
        let lower = result.transformed_sql.to_lowercase();
        for introducer in ["_utf8mb4", "_utf8", "_latin1", "_binary"] {
            assert!(
                !lower.contains(introducer),
                "introducer {introducer} survived in {}",
                result.transformed_sql
            );
        }
    }
}

#[test]
fn test_backticks_rewritten_to_double_quotes() {
    let analyzer = analyzer_with(SYNTAX_RULES);
    let result = analyzer
        .analyze_sql("SELECT `name` FROM `users`", "input_string")
        .unwrap();

    assert!(!result.issues.is_empty());
    assert!(result.issues.iter().all(|issue| issue.checker == "SyntaxChecker"));
    assert!(result.issues.iter().any(|issue| issue.message.contains("反引号")));
    assert!(!result.transformed_sql.contains('`'));
    assert!(result.transformed_sql.contains("\"name\""));
    assert!(result.transformed_sql.contains("\"users\""));
}

#[test]
fn test_table_charset_option_rewritten() {
    let analyzer = analyzer_with(CHARSET_RULES);
    let result = analyzer
        .analyze_sql(
            "CREATE TABLE t (id INT) DEFAULT CHARSET=utf8mb4",
            "input_string"
        )
        .unwrap();

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].checker, "CharsetChecker");
    assert!(result.issues[0].message.contains("utf8mb4"));

    let upper = result.transformed_sql.to_uppercase();
    assert!(!upper.contains("UTF8MB4"));
    assert!(upper.contains("UTF8"));
}

#[test]
fn test_column_charset_reported_without_rewrite() {
    // Column-level charsets only report: the charset transformations
    // accept table options alone.
    let analyzer = analyzer_with(CHARSET_RULES);
    let result = analyzer
        .analyze_sql(
            "CREATE TABLE t (name VARCHAR(20) CHARACTER SET utf8mb4)",
            "input_string"
        )
        .unwrap();

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].checker, "CharsetChecker");
    assert!(result.transformed_sql.to_uppercase().contains("UTF8MB4"));
}

#[test]
fn test_lock_tables_reported_not_rewritten() {
    let analyzer = analyzer_with(SYNTAX_RULES);
    let result = analyzer
        .analyze_sql("LOCK TABLES users READ; UNLOCK TABLES", "input_string")
        .unwrap();

    assert_eq!(result.issues.len(), 2);
    assert!(result.issues[0].message.contains("LOCK TABLES"));
    assert!(result.issues[1].message.contains("UNLOCK TABLES"));
    assert!(result.issues.iter().all(|issue| !issue.autofix.available));

    let upper = result.transformed_sql.to_uppercase();
    assert!(upper.contains("LOCK TABLES"));
    assert!(upper.contains("UNLOCK TABLES"));
}

#[test]
fn test_alter_table_types_checked() {
    let analyzer = analyzer_with(DATATYPE_RULES);
    let result = analyzer
        .analyze_sql("ALTER TABLE t ADD COLUMN flag TINYINT", "input_string")
        .unwrap();
    assert_eq!(result.issues.len(), 1);
    assert!(result.transformed_sql.to_uppercase().contains("SMALLINT"));

    let result = analyzer
        .analyze_sql("ALTER TABLE t MODIFY COLUMN flag TINYINT", "input_string")
        .unwrap();
    assert_eq!(result.issues.len(), 1);
    assert!(result.transformed_sql.to_uppercase().contains("SMALLINT"));
}

#[test]
fn test_idempotence_of_transformed_sql() {
    for (yaml, sql) in [
        (FUNCTION_RULES, "SELECT GROUP_CONCAT(name), IFNULL(a, b) FROM users"),
        (SYNTAX_RULES, "CREATE TABLE t (id INT AUTO_INCREMENT PRIMARY KEY)"),
        (DATATYPE_RULES, "CREATE TABLE u (x TINYINT, y TINYINT)"),
        (CHARSET_RULES, "CREATE TABLE t (id INT) DEFAULT CHARSET=utf8mb4"),
    ] {
        let analyzer = analyzer_with(yaml);
        let first = analyzer.analyze_sql(sql, "input_string").unwrap();
        assert!(!first.issues.is_empty(), "no issues for {sql}");
        let second = analyzer.analyze_sql(&first.transformed_sql, "input_string").unwrap();
        assert!(
            second.issues.is_empty(),
            "transformed SQL still reports issues for {sql}: {:?}",
            second.issues
        );
    }
}

#[test]
fn test_empty_checker_set_round_trip() {
    let rules = Arc::new(RuleSet::default());
    let analyzer = Analyzer::new(rules, Vec::new()).unwrap();
    let sql = "SELECT a, COUNT(*) FROM `users` WHERE b > 5 GROUP BY a";
    let result = analyzer.analyze_sql(sql, "input_string").unwrap();
    assert!(result.issues.is_empty());
    assert!(!result.transformed_sql.is_empty());

    // The restored text re-parses and restores to the same bytes.
    let again = analyzer.analyze_sql(&result.transformed_sql, "input_string").unwrap();
    assert_eq!(result.transformed_sql, again.transformed_sql);
}

#[test]
fn test_determinism_across_runs() {
    let analyzer = analyzer_with(FUNCTION_RULES);
    let sql = "SELECT GROUP_CONCAT(name) FROM users; SELECT IFNULL(a, b) FROM t";
    let first = analyzer.analyze_sql(sql, "input_string").unwrap();
    let second = analyzer.analyze_sql(sql, "input_string").unwrap();
    assert_eq!(first.transformed_sql, second.transformed_sql);
    assert_eq!(first.issues, second.issues);
}

#[test]
fn test_concurrent_analyses_share_rule_store() {
    let rules = Arc::new(RuleSet::from_yaml(FUNCTION_RULES).unwrap());
    let analyzer = Arc::new(Analyzer::from_rules(rules).unwrap());
    let sql = "SELECT GROUP_CONCAT(name) FROM users";

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            thread::spawn(move || analyzer.analyze_sql(sql, "input_string").unwrap())
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result.transformed_sql, results[0].transformed_sql);
        assert_eq!(result.issues, results[0].issues);
    }
}

#[test]
fn test_general_log_file_analysis() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("general.log");
    let mut file = std::fs::File::create(&log_path).unwrap();
    write!(
        file,
        "2023-12-23T08:00:01.234567Z     1 Connect   root@localhost on testdb\n\
         2023-12-23T08:00:02.234567Z     1 Query     SELECT * FROM users\n\
         2023-12-23T08:00:03.234567Z     1 Query     UPDATE users SET name='test' WHERE id=1\n\
         2023-12-23T08:00:04.234567Z     1 Query     SELECT IFNULL(orderid, 'N/A') FROM orders\n\
         2023-12-23T08:00:05.234567Z     1 Quit      \n"
    )
    .unwrap();

    let analyzer = analyzer_with(FUNCTION_RULES);
    let result = analyzer.analyze_file(&log_path).unwrap();

    assert!(
        result
            .issues
            .iter()
            .any(|issue| issue.checker == "FunctionChecker" && issue.message.contains("IFNULL"))
    );
    // Three statements joined with `;\n`, none of the log noise.
    assert_eq!(result.transformed_sql.matches(";\n").count(), 2);
    assert!(!result.transformed_sql.contains("Connect"));
    assert!(!result.transformed_sql.contains("Quit"));
    assert!(result.transformed_sql.contains("COALESCE"));
}

#[test]
fn test_directory_analysis_aggregates_issues() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a_types.sql"), "CREATE TABLE u (x TINYINT);\n").unwrap();
    std::fs::write(
        dir.path().join("b_queries.sql"),
        "SELECT GROUP_CONCAT(name) FROM users;\n"
    )
    .unwrap();
    std::fs::write(dir.path().join("ignored.txt"), "not sql\n").unwrap();
    std::fs::write(dir.path().join("broken.sql"), "THIS IS NOT SQL (\n").unwrap();

    let analyzer = analyzer_with(MIXED_RULES);
    let result = analyzer.analyze_directory(dir.path()).unwrap();

    assert_eq!(result.source, dir.path().display().to_string());
    assert!(result.issues.iter().any(|issue| issue.checker == "DataTypeChecker"));
    assert!(result.issues.iter().any(|issue| issue.checker == "FunctionChecker"));
    // The unparsable file is contained as an Error issue with its path.
    let error_issue = result
        .issues
        .iter()
        .find(|issue| issue.checker == "Error")
        .expect("missing error issue");
    assert!(error_issue.message.contains("分析文件失败"));
    assert!(error_issue.file.as_deref().unwrap_or_default().contains("broken.sql"));
}

#[test]
fn test_comment_only_sql_file_is_empty_result() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("comments.sql");
    std::fs::write(&path, "-- nothing here\n-- at all\n").unwrap();

    let analyzer = analyzer_with(FUNCTION_RULES);
    let result = analyzer.analyze_file(&path).unwrap();
    assert!(result.issues.is_empty());
    assert!(result.transformed_sql.is_empty());
}

#[test]
fn test_unsupported_extension_is_file_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.txt");
    std::fs::write(&path, "SELECT 1;").unwrap();

    let analyzer = analyzer_with("");
    let err = analyzer.analyze_file(&path).unwrap_err();
    assert!(matches!(err, AnalysisError::File { .. }));
}
