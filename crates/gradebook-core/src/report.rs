//! Class report types with JSON persistence and recovery comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GradingPolicy;
use crate::error::ScoreField;
use crate::model::{Classification, EvaluationResult, UnitScores};
use crate::statistics::{ClassStats, NoaEligibility, StatusFilter};

/// A complete evaluation of one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the class.
    pub class: ClassSummary,
    /// Policy the class was evaluated with.
    pub policy: GradingPolicy,
    /// Students that were evaluated.
    pub evaluations: Vec<StudentEvaluation>,
    /// Students whose scores failed validation.
    #[serde(default)]
    pub rejected: Vec<RejectedStudent>,
    /// Aggregate statistics.
    pub stats: ClassStats,
}

/// Summary of a class (without the student records).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    pub student_count: usize,
}

/// One evaluated student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentEvaluation {
    pub student_id: String,
    pub name: String,
    pub scores: UnitScores,
    pub result: EvaluationResult,
    #[serde(default)]
    pub noa_eligibility: NoaEligibility,
}

/// A student left out of the report because of invalid input.
///
/// `field` and `value` are set for out-of-range scores and empty for
/// records the roster parser could not turn into scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedStudent {
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub field: Option<ScoreField>,
    #[serde(default)]
    pub value: Option<f64>,
    pub message: String,
}

impl ClassReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ClassReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Evaluations matching any of `filters`; all of them when `filters` is empty.
    pub fn filtered(&self, filters: &[StatusFilter]) -> Vec<&StudentEvaluation> {
        self.evaluations
            .iter()
            .filter(|e| filters.is_empty() || filters.iter().any(|f| f.matches(e)))
            .collect()
    }

    /// Compare this report against an earlier one, typically taken before
    /// recovery exams were recorded.
    pub fn compare(&self, baseline: &ClassReport) -> RecoveryReport {
        let index = |report: &ClassReport| -> HashMap<String, (String, Classification, f64)> {
            report
                .evaluations
                .iter()
                .map(|e| {
                    (
                        e.student_id.clone(),
                        (e.name.clone(), e.result.classification, e.result.rounded_average),
                    )
                })
                .collect()
        };

        let baseline_map = index(baseline);
        let current_map = index(self);

        let mut promotions = Vec::new();
        let mut demotions = Vec::new();
        let mut unchanged = 0usize;
        let mut new_students = 0usize;

        for e in &self.evaluations {
            let Some((_, before, before_avg)) = baseline_map.get(&e.student_id) else {
                new_students += 1;
                continue;
            };
            let change = StatusChange {
                student_id: e.student_id.clone(),
                name: e.name.clone(),
                baseline: *before,
                current: e.result.classification,
                baseline_average: *before_avg,
                current_average: e.result.rounded_average,
            };
            match change.current.cmp(&change.baseline) {
                std::cmp::Ordering::Greater => promotions.push(change),
                std::cmp::Ordering::Less => demotions.push(change),
                std::cmp::Ordering::Equal => unchanged += 1,
            }
        }

        let removed_students = baseline_map
            .keys()
            .filter(|k| !current_map.contains_key(*k))
            .count();

        RecoveryReport {
            promotions,
            demotions,
            unchanged,
            new_students,
            removed_students,
        }
    }
}

/// Result of comparing two class reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryReport {
    /// Students whose classification improved.
    pub promotions: Vec<StatusChange>,
    /// Students whose classification got worse.
    pub demotions: Vec<StatusChange>,
    /// Students with the same classification.
    pub unchanged: usize,
    /// Students in current but not baseline.
    pub new_students: usize,
    /// Students in baseline but not current.
    pub removed_students: usize,
}

/// A classification change for one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub student_id: String,
    pub name: String,
    pub baseline: Classification,
    pub current: Classification,
    pub baseline_average: f64,
    pub current_average: f64,
}

impl RecoveryReport {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} promotions, {} demotions, {} unchanged\n\n",
            self.promotions.len(),
            self.demotions.len(),
            self.unchanged
        ));

        for (title, changes) in [("Promotions", &self.promotions), ("Demotions", &self.demotions)] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Student | Before | After | Average |\n");
            md.push_str("|---------|--------|-------|---------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} ({}) | {} | {} | {:.2} -> {:.2} |\n",
                    c.name,
                    c.student_id,
                    c.baseline,
                    c.current,
                    c.baseline_average,
                    c.current_average
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any student's classification got worse.
    pub fn has_demotions(&self) -> bool {
        !self.demotions.is_empty()
    }
}
