//! Quick evaluate example: minimal programmatic usage of gradebook.
//!
//! Evaluates one student before and after recovery exams, then a whole
//! roster loaded from TOML.
//!
//! ```bash
//! cargo run -p gradebook-core --example quick_evaluate
//! ```

use std::path::Path;

use gradebook_core::config::load_policy;
use gradebook_core::engine::GradeEvaluator;
use gradebook_core::roster;
use gradebook_core::UnitScores;

const ROSTER: &str = r#"
[class]
id = "demo"
name = "Demo Class"

[[students]]
id = "s-1"
name = "Ana Souza"
unit1 = 6.0
unit2 = 5.5
unit3 = 7.0
unit4 = 7.0
noa1 = 6.5
attendance = 0.9

[[students]]
id = "s-2"
name = "Bruno Lima"
unit1 = 8.0
unit2 = 8.5
unit3 = 9.0
unit4 = 7.5
classes_attended = 38
classes_total = 40
"#;

fn main() -> anyhow::Result<()> {
    // gradebook.toml, ~/.config/gradebook/config.toml or the published defaults
    let evaluator = GradeEvaluator::try_new(load_policy()?)?;

    let before = UnitScores::new([4.0, 6.0, 5.0, 6.0], 0.9);
    let result = evaluator.evaluate(&before)?;
    println!(
        "Before recovery: {:.2} -> {}",
        result.rounded_average, result.classification
    );

    let after = before.with_noa1(9.0).with_noa2(9.0);
    let result = evaluator.evaluate(&after)?;
    println!(
        "After recovery:  {:.2} -> {}",
        result.rounded_average, result.classification
    );

    let roster = roster::parse_roster_str(ROSTER, Path::new("demo.toml"))?;
    let report = evaluator.evaluate_roster(&roster);

    println!("\n{} ({} students)", report.class.name, report.class.student_count);
    for e in &report.evaluations {
        println!(
            "  {:<12} {:.2}  {}",
            e.name, e.result.rounded_average, e.result.classification
        );
    }
    println!(
        "  approval rate: {:.1}%",
        report.stats.approval_rate * 100.0
    );

    Ok(())
}
