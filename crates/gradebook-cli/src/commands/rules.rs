//! The `gradebook rules` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::config::load_policy_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let policy = load_policy_from(config_path.as_deref())?;

    println!("Grading rules:");
    for (i, rule) in policy.rules().iter().enumerate() {
        println!("  {}. {rule}", i + 1);
    }

    Ok(())
}
