//! The `gradebook validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::roster;

pub fn execute(roster_path: PathBuf) -> Result<()> {
    let rosters = roster::load_rosters(&roster_path)?;

    let mut total_warnings = 0;

    for r in &rosters {
        println!("Roster: {} ({} students)", r.name, r.students.len() + r.malformed.len());

        let warnings = roster::validate_roster(r);
        for w in &warnings {
            let prefix = w
                .student_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All rosters valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
