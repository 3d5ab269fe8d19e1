//! HTML rendering of compliance reports
//!
//! The output is a standalone document (inline styles only, no external
//! resources) suitable as the body of an HTML email.

use std::fmt::Write;

use review_types::{ComplianceIssue, ComplianceReport, Severity};

const HEADER_BACKGROUND: &str = "#f2f2f2";
const COMPLIANT_BANNER: &str = "This document is fully compliant. No regulatory issues were found.";

/// Row background for a severity level
pub fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Low => "#d4edda",
        Severity::Medium => "#fff3cd",
        Severity::High => "#f8d7da",
        Severity::Other(_) => "#ffffff",
    }
}

/// Render a report as a complete HTML document
pub fn render_report_html(report: &ComplianceReport) -> String {
    let mut html = String::with_capacity(2048 + report.issues.len() * 512);

    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Compliance Review Report</title>\n</head>\n\
         <body style=\"font-family: Arial, Helvetica, sans-serif;\">\n",
    );
    html.push_str("<p>Dear User,</p>\n<p>Here is your Compliance Review Report:</p>\n");
    html.push_str("<h3>Summary:</h3>\n");
    let _ = writeln!(html, "<p>{}</p>", escape_html(&report.summary));

    if report.is_compliant() {
        let _ = writeln!(
            html,
            "<div class=\"compliant-banner\" style=\"background-color:#d4edda;border:1px solid #c3e6cb;\
             padding:12px;font-weight:bold;\">{}</div>",
            COMPLIANT_BANNER
        );
    } else {
        html.push_str("<h3>Detailed Issues Found:</h3>\n");
        render_issue_table(&mut html, &report.issues);
    }

    html.push_str("<p>Thank you,<br>Compliance AI Bot</p>\n</body>\n</html>\n");
    html
}

fn render_issue_table(html: &mut String, issues: &[ComplianceIssue]) {
    let _ = writeln!(
        html,
        "<table border=\"1\" cellpadding=\"5\" cellspacing=\"0\">\n\
         <tr style=\"background-color:{};\">\
         <th>ID</th><th>Category</th><th>Severity</th><th>Regulation Reference</th>\
         <th>Violation Text</th><th>Rule Description</th><th>Recommendation</th></tr>",
        HEADER_BACKGROUND
    );

    for issue in issues {
        let _ = writeln!(
            html,
            "<tr class=\"issue-row\" style=\"background-color:{};\">\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            severity_color(&issue.severity),
            escape_html(&issue.id),
            escape_html(issue.category.as_str()),
            escape_html(issue.severity.as_str()),
            escape_html(&issue.regulation_reference),
            escape_html(&issue.exact_violation_text),
            escape_html(&issue.rule_description),
            escape_html(&issue.recommendation),
        );
    }

    html.push_str("</table>\n");
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use review_types::Category;

    fn issue(id: &str, severity: Severity) -> ComplianceIssue {
        ComplianceIssue {
            id: id.to_string(),
            category: Category::Marketing,
            severity,
            regulation_reference: "CAP Code 3.1".to_string(),
            exact_violation_text: "Guaranteed winnings".to_string(),
            rule_description: "Marketing must not mislead".to_string(),
            recommendation: "Remove the guarantee".to_string(),
        }
    }

    fn report(issues: Vec<ComplianceIssue>) -> ComplianceReport {
        ComplianceReport {
            issues,
            summary: "Review summary.".to_string(),
        }
    }

    #[test]
    fn test_compliant_report_has_banner_and_no_table() {
        let html = render_report_html(&report(vec![]));
        assert!(html.contains("compliant-banner"));
        assert!(html.contains("fully compliant"));
        assert!(!html.contains("<table"));
        assert!(html.contains("<p>Review summary.</p>"));
    }

    #[test]
    fn test_rows_are_colored_by_severity() {
        let html = render_report_html(&report(vec![
            issue("1", Severity::Low),
            issue("2", Severity::Medium),
            issue("3", Severity::High),
            issue("4", Severity::Other("Critical".to_string())),
        ]));

        assert!(html.contains("background-color:#d4edda;\"><td>1</td>"));
        assert!(html.contains("background-color:#fff3cd;\"><td>2</td>"));
        assert!(html.contains("background-color:#f8d7da;\"><td>3</td>"));
        assert!(html.contains("background-color:#ffffff;\"><td>4</td>"));
        assert!(!html.contains("compliant-banner"));
    }

    #[test]
    fn test_document_is_self_contained() {
        let html = render_report_html(&report(vec![issue("1", Severity::High)]));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(!html.contains("src="));
        assert!(!html.contains("href="));
        assert!(!html.contains("<link"));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut bad = issue("x", Severity::High);
        bad.exact_violation_text = "<script>alert('win')</script> & more".to_string();
        let html = render_report_html(&report(vec![bad]));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;win&#39;)&lt;/script&gt; &amp; more"));
    }

    proptest! {
        /// One table row per issue; banner only when there are none
        #[test]
        fn one_row_per_issue(count in 0usize..12) {
            let issues = (0..count).map(|i| issue(&i.to_string(), Severity::Medium)).collect();
            let html = render_report_html(&report(issues));

            prop_assert_eq!(html.matches("class=\"issue-row\"").count(), count);
            prop_assert_eq!(html.contains("compliant-banner"), count == 0);
            prop_assert_eq!(html.contains("<table"), count > 0);
        }
    }
}
