//! JSON report writer: canonical serialization of the report model.

use crate::model::Report;

pub fn render(report: &Report) -> String {
    serde_json::to_string_pretty(report).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::RuleSet, report::build_report};

    #[test]
    fn test_round_trips_through_serde() {
        let report = build_report(Vec::new(), &RuleSet::default(), &[]);
        let rendered = render(&report);
        let parsed: Report = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.total_analyses, 0);
        assert_eq!(parsed.total_issues, 0);
    }

    #[test]
    fn test_issues_field_is_array() {
        let results = vec![crate::model::AnalysisResult {
            sql: "SELECT 1".into(),
            source: "input_string".into(),
            ..Default::default()
        }];
        let report = build_report(results, &RuleSet::default(), &[]);
        let rendered = render(&report);
        assert!(rendered.contains("\"issues\": []"));
    }
}
