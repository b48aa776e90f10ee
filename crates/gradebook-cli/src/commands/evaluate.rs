//! The `gradebook evaluate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::config::load_policy_from;
use gradebook_core::engine::GradeEvaluator;
use gradebook_core::model::UnitScores;

pub fn execute(
    units: [f64; 4],
    noa1: Option<f64>,
    noa2: Option<f64>,
    attendance: f64,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let policy = load_policy_from(config_path.as_deref())?;
    let evaluator = GradeEvaluator::try_new(policy)?;

    let input = UnitScores {
        noa1,
        noa2,
        ..UnitScores::new(units, attendance)
    };
    let result = evaluator.evaluate(&input)?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            let units = result
                .effective_scores
                .units()
                .iter()
                .map(|u| format!("{u:.2}"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("Effective scores: {units}");
            if result.noa1_applied {
                println!("NOA1 applied to units 1-2");
            }
            if result.noa2_applied {
                println!("NOA2 applied to units 3-4");
            }
            println!("Final average: {:.2}", result.rounded_average);
            match result.fail_reason {
                Some(reason) => println!("Classification: {} ({reason})", result.classification),
                None => println!("Classification: {}", result.classification),
            }
        }
    }

    Ok(())
}
