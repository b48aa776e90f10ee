//! The `gradebook run` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::config::load_policy_from;
use gradebook_core::engine::GradeEvaluator;
use gradebook_core::report::ClassReport;
use gradebook_core::roster;
use gradebook_core::statistics::{parse_filters, StatusFilter};
use gradebook_report::html::write_html_report;

pub fn execute(
    roster_path: PathBuf,
    output: PathBuf,
    format: String,
    filter: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let policy = load_policy_from(config_path.as_deref())?;
    let evaluator = GradeEvaluator::try_new(policy)?;

    let filters = match &filter {
        Some(f) => parse_filters(f).map_err(|e| anyhow::anyhow!(e))?,
        None => Vec::new(),
    };

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    for fmt in &formats {
        anyhow::ensure!(
            matches!(*fmt, "json" | "html"),
            "unknown format: {fmt} (expected json, html or all)"
        );
    }

    let rosters = roster::load_rosters(&roster_path)?;
    anyhow::ensure!(
        !rosters.is_empty(),
        "no rosters found at {}",
        roster_path.display()
    );

    for r in &rosters {
        let report = evaluator.evaluate_roster(r);

        print_summary(&report, &filters);

        std::fs::create_dir_all(&output)?;
        // The report id keeps rosters sharing a class id from overwriting each other.
        let stem = format!(
            "{}-{}-{}",
            report.class.id,
            report.created_at.format("%Y-%m-%dT%H%M%S"),
            &report.id.simple().to_string()[..8]
        );

        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("{stem}.json"));
                    report.save_json(&path)?;
                    eprintln!("Results saved to: {}", path.display());
                }
                "html" => {
                    let path = output.join(format!("{stem}.html"));
                    write_html_report(&report, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                other => anyhow::bail!("unknown format: {other}"),
            }
        }
    }

    Ok(())
}

fn print_summary(report: &ClassReport, filters: &[StatusFilter]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Student", "Unit 1", "Unit 2", "Unit 3", "Unit 4", "NOA1", "NOA2", "Attendance",
        "Average", "Status",
    ]);

    let noa = |score: Option<f64>, applied: bool| match score {
        Some(s) if applied => format!("{s:.1}*"),
        Some(s) => format!("{s:.1}"),
        None => "-".to_string(),
    };

    for e in report.filtered(filters) {
        let units = e.result.effective_scores.units();
        let status = match e.result.fail_reason {
            Some(reason) => format!("{} ({reason})", e.result.classification),
            None => e.result.classification.to_string(),
        };
        table.add_row(vec![
            Cell::new(&e.name),
            Cell::new(format!("{:.1}", units[0])),
            Cell::new(format!("{:.1}", units[1])),
            Cell::new(format!("{:.1}", units[2])),
            Cell::new(format!("{:.1}", units[3])),
            Cell::new(noa(e.scores.noa1, e.result.noa1_applied)),
            Cell::new(noa(e.scores.noa2, e.result.noa2_applied)),
            Cell::new(format!("{:.0}%", e.scores.attendance_ratio * 100.0)),
            Cell::new(format!("{:.2}", e.result.rounded_average)),
            Cell::new(status),
        ]);
    }

    let stats = &report.stats;
    println!("\n{} ({})", report.class.name, report.class.id);
    println!("{table}");
    println!(
        "{} approved, {} pending, {} reproved, {} NOA eligible (mean average {:.2})",
        stats.approved, stats.pending, stats.reproved, stats.noa_eligible, stats.mean_final_average
    );

    for r in &report.rejected {
        println!("  REJECTED: {} ({}): {}", r.name, r.student_id, r.message);
    }
}
