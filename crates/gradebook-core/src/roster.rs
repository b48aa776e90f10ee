//! TOML class roster parser.
//!
//! Loads class rosters (one class, many students with their scores) from
//! TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::GradeEvaluator;
use crate::model::UnitScores;

/// A class with the scores of its students.
#[derive(Debug, Clone)]
pub struct Roster {
    pub id: String,
    pub name: String,
    pub subject: Option<String>,
    pub term: Option<String>,
    pub students: Vec<StudentRecord>,
    /// Students whose record could not be turned into scores.
    pub malformed: Vec<MalformedStudent>,
}

/// One student's scores in a roster.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub scores: UnitScores,
    /// Raw class counts when attendance was given that way.
    pub attendance_counts: Option<AttendanceCounts>,
}

/// A student entry that parsed as TOML but has no usable attendance.
#[derive(Debug, Clone)]
pub struct MalformedStudent {
    pub id: String,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceCounts {
    pub attended: u32,
    pub total: u32,
}

#[derive(Debug, Deserialize)]
struct TomlRosterFile {
    class: TomlClassHeader,
    #[serde(default)]
    students: Vec<TomlStudent>,
}

#[derive(Debug, Deserialize)]
struct TomlClassHeader {
    id: String,
    name: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    term: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlStudent {
    id: String,
    name: String,
    unit1: f64,
    unit2: f64,
    unit3: f64,
    unit4: f64,
    #[serde(default)]
    noa1: Option<f64>,
    #[serde(default)]
    noa2: Option<f64>,
    #[serde(default)]
    attendance: Option<f64>,
    #[serde(default)]
    classes_attended: Option<u32>,
    #[serde(default)]
    classes_total: Option<u32>,
}

impl TomlStudent {
    fn attendance(&self) -> Result<(f64, Option<AttendanceCounts>)> {
        match (self.attendance, self.classes_attended, self.classes_total) {
            (Some(ratio), None, None) => Ok((ratio, None)),
            (None, Some(attended), Some(total)) => {
                anyhow::ensure!(
                    total > 0,
                    "student {}: classes_total must be greater than zero",
                    self.id
                );
                let ratio = attended as f64 / total as f64;
                Ok((ratio, Some(AttendanceCounts { attended, total })))
            }
            (None, None, None) => anyhow::bail!(
                "student {}: missing attendance (set `attendance` or `classes_attended` and `classes_total`)",
                self.id
            ),
            (Some(_), _, _) => anyhow::bail!(
                "student {}: give either `attendance` or class counts, not both",
                self.id
            ),
            _ => anyhow::bail!(
                "student {}: `classes_attended` and `classes_total` must be given together",
                self.id
            ),
        }
    }
}

/// Parse a single TOML file into a `Roster`.
pub fn parse_roster(path: &Path) -> Result<Roster> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file: {}", path.display()))?;

    parse_roster_str(&content, path)
}

/// Parse a TOML string into a `Roster` (useful for testing).
pub fn parse_roster_str(content: &str, source_path: &Path) -> Result<Roster> {
    let parsed: TomlRosterFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut students = Vec::new();
    let mut malformed = Vec::new();

    for s in parsed.students {
        let (attendance_ratio, attendance_counts) = match s.attendance() {
            Ok(attendance) => attendance,
            Err(e) => {
                tracing::warn!("{}: {e}", source_path.display());
                malformed.push(MalformedStudent {
                    id: s.id,
                    name: s.name,
                    message: e.to_string(),
                });
                continue;
            }
        };

        students.push(StudentRecord {
            scores: UnitScores {
                unit1: s.unit1,
                unit2: s.unit2,
                unit3: s.unit3,
                unit4: s.unit4,
                noa1: s.noa1,
                noa2: s.noa2,
                attendance_ratio,
            },
            attendance_counts,
            id: s.id,
            name: s.name,
        });
    }

    Ok(Roster {
        id: parsed.class.id,
        name: parsed.class.name,
        subject: parsed.class.subject,
        term: parsed.class.term,
        students,
        malformed,
    })
}

/// Recursively load all `.toml` rosters from a directory.
pub fn load_roster_directory(dir: &Path) -> Result<Vec<Roster>> {
    let mut rosters = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            rosters.extend(load_roster_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_roster(&path) {
                Ok(roster) => rosters.push(roster),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(rosters)
}

/// Load a single roster file or every roster under a directory.
pub fn load_rosters(path: &Path) -> Result<Vec<Roster>> {
    if path.is_dir() {
        load_roster_directory(path)
    } else {
        Ok(vec![parse_roster(path)?])
    }
}

/// A warning from roster validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The student ID (if applicable).
    pub student_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a roster for common issues.
pub fn validate_roster(roster: &Roster) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if roster.students.is_empty() && roster.malformed.is_empty() {
        warnings.push(ValidationWarning {
            student_id: None,
            message: "roster has no students".into(),
        });
    }

    for student in &roster.malformed {
        warnings.push(ValidationWarning {
            student_id: Some(student.id.clone()),
            message: student.message.clone(),
        });
    }

    let mut seen_ids = std::collections::HashSet::new();
    let all_ids = roster
        .students
        .iter()
        .map(|s| &s.id)
        .chain(roster.malformed.iter().map(|s| &s.id));
    for id in all_ids {
        if !seen_ids.insert(id) {
            warnings.push(ValidationWarning {
                student_id: Some(id.clone()),
                message: format!("duplicate student ID: {id}"),
            });
        }
    }

    for student in &roster.students {
        if student.name.trim().is_empty() {
            warnings.push(ValidationWarning {
                student_id: Some(student.id.clone()),
                message: "student name is empty".into(),
            });
        }
    }

    for student in &roster.students {
        if let Some(counts) = student.attendance_counts {
            if counts.attended > counts.total {
                warnings.push(ValidationWarning {
                    student_id: Some(student.id.clone()),
                    message: format!(
                        "classes_attended ({}) exceeds classes_total ({})",
                        counts.attended, counts.total
                    ),
                });
            }
        }
    }

    // Score ranges are the evaluator's to judge.
    let evaluator = GradeEvaluator::default();
    for student in &roster.students {
        if let Err(e) = evaluator.evaluate(&student.scores) {
            warnings.push(ValidationWarning {
                student_id: Some(student.id.clone()),
                message: e.to_string(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[class]
id = "9a-math"
name = "9A Mathematics"
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
unit2 = 8.0
unit3 = 8.0
unit4 = 8.0
classes_attended = 20
classes_total = 40
"#;

    #[test]
    fn parse_valid_toml() {
        let roster = parse_roster_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(roster.id, "9a-math");
        assert_eq!(roster.subject.as_deref(), Some("Mathematics"));
        assert_eq!(roster.students.len(), 2);
        assert_eq!(roster.students[0].scores.noa1, Some(6.5));
        assert_eq!(roster.students[0].scores.attendance_ratio, 0.9);
        assert!(roster.students[0].attendance_counts.is_none());
    }

    #[test]
    fn attendance_from_class_counts() {
        let roster = parse_roster_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        let bruno = &roster.students[1];
        assert_eq!(bruno.scores.attendance_ratio, 0.5);
        assert_eq!(
            bruno.attendance_counts,
            Some(AttendanceCounts {
                attended: 20,
                total: 40
            })
        );
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[class]
id = "minimal"
name = "Minimal"

[[students]]
id = "s1"
name = "Student"
unit1 = 5
unit2 = 5
unit3 = 5
unit4 = 5
attendance = 1.0
"#;
        let roster = parse_roster_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(roster.subject.is_none());
        assert!(roster.term.is_none());
        assert!(roster.students[0].scores.noa1.is_none());
    }

    #[test]
    fn missing_attendance_marks_only_that_student() {
        let toml = r#"
[class]
id = "c"
name = "C"

[[students]]
id = "s1"
name = "Student"
unit1 = 5.0
unit2 = 5.0
unit3 = 5.0
unit4 = 5.0

[[students]]
id = "s2"
name = "Other"
unit1 = 7.0
unit2 = 7.0
unit3 = 7.0
unit4 = 7.0
attendance = 1.0
"#;
        let roster = parse_roster_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(roster.students.len(), 1);
        assert_eq!(roster.students[0].id, "s2");
        assert_eq!(roster.malformed.len(), 1);
        assert_eq!(roster.malformed[0].id, "s1");
        assert!(roster.malformed[0].message.contains("missing attendance"));

        let warnings = validate_roster(&roster);
        assert!(warnings
            .iter()
            .any(|w| w.student_id.as_deref() == Some("s1") && w.message.contains("missing attendance")));
    }

    #[test]
    fn both_attendance_forms_is_rejected() {
        let toml = r#"
[class]
id = "c"
name = "C"

[[students]]
id = "s1"
name = "Student"
unit1 = 5.0
unit2 = 5.0
unit3 = 5.0
unit4 = 5.0
attendance = 0.9
classes_attended = 9
classes_total = 10
"#;
        let roster = parse_roster_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(roster.students.is_empty());
        assert!(roster.malformed[0].message.contains("not both"));
    }

    #[test]
    fn zero_total_classes_is_rejected() {
        let toml = r#"
[class]
id = "c"
name = "C"

[[students]]
id = "s1"
name = "Student"
unit1 = 5.0
unit2 = 5.0
unit3 = 5.0
unit4 = 5.0
classes_attended = 0
classes_total = 0
"#;
        let roster = parse_roster_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(roster.students.is_empty());
        assert!(roster.malformed[0].message.contains("greater than zero"));
    }

    #[test]
    fn validate_duplicate_ids() {
        let toml = r#"
[class]
id = "dupes"
name = "Dupes"

[[students]]
id = "same"
name = "First"
unit1 = 5.0
unit2 = 5.0
unit3 = 5.0
unit4 = 5.0
attendance = 1.0

[[students]]
id = "same"
name = "Second"
unit1 = 6.0
unit2 = 6.0
unit3 = 6.0
unit4 = 6.0
attendance = 1.0
"#;
        let roster = parse_roster_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_roster(&roster);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_reports_out_of_range_scores() {
        let toml = r#"
[class]
id = "bad"
name = "Bad"

[[students]]
id = "s1"
name = "Student"
unit1 = 11.0
unit2 = 5.0
unit3 = 5.0
unit4 = 5.0
classes_attended = 12
classes_total = 10
"#;
        let roster = parse_roster_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_roster(&roster);
        assert!(warnings.iter().any(|w| w.message.contains("unit1 = 11")));
        assert!(warnings.iter().any(|w| w.message.contains("exceeds classes_total")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_roster_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("math.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml {").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let rosters = load_roster_directory(dir.path()).unwrap();
        assert_eq!(rosters.len(), 1);
        assert_eq!(rosters[0].id, "9a-math");
    }

    #[test]
    fn load_rosters_accepts_file_or_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("math.toml");
        std::fs::write(&path, VALID_TOML).unwrap();

        assert_eq!(load_rosters(&path).unwrap().len(), 1);
        assert_eq!(load_rosters(dir.path()).unwrap().len(), 1);
    }
}
