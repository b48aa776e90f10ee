//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use gradebook_core::model::{Classification, EvaluationResult};
use gradebook_core::report::ClassReport;
use gradebook_core::statistics::ClassStats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn status_class(classification: Classification) -> &'static str {
    match classification {
        Classification::Approved => "approved",
        Classification::Pending => "pending",
        Classification::Reproved => "reproved",
    }
}

/// Generate an HTML report from a class report.
pub fn generate_html(report: &ClassReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>gradebook report: {}</title>\n",
        html_escape(&report.class.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    let subject = report
        .class
        .subject
        .as_deref()
        .map(|s| format!(" | {}", html_escape(s)))
        .unwrap_or_default();
    let term = report
        .class
        .term
        .as_deref()
        .map(|t| format!(" | term {}", html_escape(t)))
        .unwrap_or_default();
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.class.name)));
    html.push_str(&format!(
        "<p class=\"meta\">{} students{}{} | {}</p>\n",
        report.class.student_count,
        subject,
        term,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    let stats = &report.stats;
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Approved</th><th>Pending</th><th>Reproved</th><th>Low attendance</th><th>NOA eligible</th><th>Mean average</th><th>Approval rate</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.1}%</td></tr></tbody></table>\n",
        stats.approved,
        stats.pending,
        stats.reproved,
        stats.low_attendance,
        stats.noa_eligible,
        stats.mean_final_average,
        stats.approval_rate * 100.0,
    ));

    if stats.total > 0 {
        html.push_str(&generate_bar_chart(stats));
    }

    html.push_str("</section>\n");

    // Per-student results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Student</th><th onclick=\"sortTable(1)\">Units</th><th onclick=\"sortTable(2)\">NOA</th><th onclick=\"sortTable(3)\">Attendance</th><th onclick=\"sortTable(4)\">Average</th><th onclick=\"sortTable(5)\">Status</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for e in &report.evaluations {
        let class = status_class(e.result.classification);
        let status = match e.result.fail_reason {
            Some(reason) => format!("{} ({})", e.result.classification, reason),
            None => e.result.classification.to_string(),
        };

        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.0}%</td><td>{:.2}</td><td class=\"{}\">{}</td></tr>\n",
            html_escape(&e.name),
            units_cell(&e.result),
            noa_cell(e.scores.noa1, e.scores.noa2, &e.result),
            e.scores.attendance_ratio * 100.0,
            e.result.rounded_average,
            class,
            status
        ));
    }

    html.push_str("</tbody></table>\n");

    if !report.rejected.is_empty() {
        html.push_str("<h2>Rejected records</h2>\n<ul class=\"rejected\">\n");
        for r in &report.rejected {
            html.push_str(&format!(
                "<li>{} ({}): {}</li>\n",
                html_escape(&r.name),
                html_escape(&r.student_id),
                html_escape(&r.message)
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ClassReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn units_cell(result: &EvaluationResult) -> String {
    result
        .effective_scores
        .units()
        .iter()
        .map(|u| format!("{u:.1}"))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn noa_cell(noa1: Option<f64>, noa2: Option<f64>, result: &EvaluationResult) -> String {
    let cell = |score: Option<f64>, applied: bool| match score {
        Some(s) if applied => format!("<strong>{s:.1}</strong>"),
        Some(s) => format!("{s:.1}"),
        None => "-".to_string(),
    };
    format!(
        "{} / {}",
        cell(noa1, result.noa1_applied),
        cell(noa2, result.noa2_applied)
    )
}

fn generate_bar_chart(stats: &ClassStats) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let buckets = [
        ("Approved", stats.approved, "#22c55e"),
        ("Pending", stats.pending, "#eab308"),
        ("Reproved", stats.reproved, "#ef4444"),
    ];
    let total = stats.total.max(1) as f64;
    let total_height = buckets.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, count, color)) in buckets.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let share = *count as f64 / total;
        let width = (share * max_width as f64) as usize;

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            label
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{} ({:.1}%)</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            count,
            share * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --approved: #dcfce7; --pending: #fef9c3; --reproved: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --approved: #064e3b; --pending: #713f12; --reproved: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.approved { background: var(--approved); }
.pending { background: var(--pending); }
.reproved { background: var(--reproved); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, { numeric: true }) : vb.localeCompare(va, undefined, { numeric: true });
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use gradebook_core::engine::GradeEvaluator;
    use gradebook_core::model::UnitScores;
    use gradebook_core::roster::{Roster, StudentRecord};

    fn make_test_report() -> ClassReport {
        let student = |id: &str, name: &str, scores: UnitScores| StudentRecord {
            id: id.into(),
            name: name.into(),
            scores,
            attendance_counts: None,
        };
        let roster = Roster {
            id: "9a-math".into(),
            name: "9A <Mathematics>".into(),
            subject: Some("Mathematics".into()),
            term: Some("2026".into()),
            students: vec![
                student(
                    "s-001",
                    "Ana Souza",
                    UnitScores::new([6.0, 5.5, 7.0, 7.0], 0.9).with_noa1(6.5),
                ),
                student("s-002", "Bruno Lima", UnitScores::new([8.0; 4], 0.5)),
                student("s-003", "Carla Dias", UnitScores::new([11.0, 5.0, 5.0, 5.0], 1.0)),
            ],
            malformed: Vec::new(),
        };
        GradeEvaluator::default().evaluate_roster(&roster)
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Ana Souza"));
        assert!(html.contains("6.63"));
        assert!(html.contains("Reproved (LowAttendance)"));
        assert!(html.contains("<strong>6.5</strong>"));
    }

    #[test]
    fn html_report_escapes_names() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("9A &lt;Mathematics&gt;"));
        assert!(!html.contains("<Mathematics>"));
    }

    #[test]
    fn html_report_lists_rejected_records() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("Rejected records"));
        assert!(html.contains("Carla Dias"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
