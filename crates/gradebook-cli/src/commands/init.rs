//! The `gradebook init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("gradebook.toml").exists() {
        println!("gradebook.toml already exists, skipping.");
    } else {
        std::fs::write("gradebook.toml", SAMPLE_CONFIG)?;
        println!("Created gradebook.toml");
    }

    std::fs::create_dir_all("rosters")?;
    let example_path = std::path::Path::new("rosters/example.toml");
    if example_path.exists() {
        println!("rosters/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_ROSTER)?;
        println!("Created rosters/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Adjust the thresholds in gradebook.toml if your school differs");
    println!("  2. Run: gradebook validate --roster rosters/example.toml");
    println!("  3. Run: gradebook run --roster rosters/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradebook configuration

[policy]
# Final average at or above which a student is approved
approval_average = 7.0
# Final average below which a student is reproved
reproval_average = 5.0
# Attendance ratio below which a student is reproved regardless of scores
min_attendance = 0.75
"#;

const EXAMPLE_ROSTER: &str = r#"[class]
id = "example"
name = "Example Class"
subject = "Mathematics"
term = "2026"

[[students]]
id = "s-001"
name = "Ana Souza"
unit1 = 6.0
unit2 = 5.5
unit3 = 7.0
unit4 = 7.0
noa1 = 6.5
attendance = 0.9

[[students]]
id = "s-002"
name = "Bruno Lima"
unit1 = 8.0
unit2 = 8.5
unit3 = 9.0
unit4 = 7.5
classes_attended = 38
classes_total = 40

[[students]]
id = "s-003"
name = "Carla Dias"
unit1 = 3.0
unit2 = 4.0
unit3 = 3.5
unit4 = 2.0
attendance = 0.95
"#;
