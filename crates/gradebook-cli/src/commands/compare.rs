//! The `gradebook compare` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::report::ClassReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    fail_on_demotion: bool,
    format: String,
) -> Result<()> {
    let baseline = ClassReport::load_json(&baseline_path)?;
    let current = ClassReport::load_json(&current_path)?;

    if baseline.class.id != current.class.id {
        tracing::warn!(
            "comparing different classes: {} vs {}",
            baseline.class.id,
            current.class.id
        );
    }

    let report = current.compare(&baseline);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} promotions, {} demotions, {} unchanged",
                report.promotions.len(),
                report.demotions.len(),
                report.unchanged
            );

            for (title, changes) in [("Promotions", &report.promotions), ("Demotions", &report.demotions)] {
                if changes.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for c in changes {
                    println!(
                        "  {} ({}) {} -> {} ({:.2} -> {:.2})",
                        c.name,
                        c.student_id,
                        c.baseline,
                        c.current,
                        c.baseline_average,
                        c.current_average
                    );
                }
            }

            if report.new_students > 0 {
                println!("\n{} new student(s)", report.new_students);
            }
            if report.removed_students > 0 {
                println!("{} removed student(s)", report.removed_students);
            }
        }
    }

    if fail_on_demotion && report.has_demotions() {
        std::process::exit(1);
    }

    Ok(())
}
