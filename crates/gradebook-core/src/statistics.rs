//! Class-level statistics, recovery exam eligibility and status filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{Classification, EvaluationResult, UnitScores};
use crate::report::StudentEvaluation;

/// Which recovery exams a student may still take.
///
/// A student is eligible for a NOA when they are not approved, did not fail
/// the attendance gate (no exam can lift that), and have not already taken it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoaEligibility {
    pub noa1: bool,
    pub noa2: bool,
}

impl NoaEligibility {
    pub fn any(&self) -> bool {
        self.noa1 || self.noa2
    }
}

/// Compute NOA eligibility from an evaluation and its input.
pub fn noa_eligibility(input: &UnitScores, result: &EvaluationResult) -> NoaEligibility {
    if result.is_approved() || result.failed_attendance() {
        return NoaEligibility::default();
    }
    NoaEligibility {
        noa1: input.noa1.is_none(),
        noa2: input.noa2.is_none(),
    }
}

/// Aggregate statistics for one class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    /// Students evaluated (rejected records excluded).
    pub total: usize,
    pub approved: usize,
    pub reproved: usize,
    pub pending: usize,
    /// Reproved students whose reasons include low attendance.
    pub low_attendance: usize,
    /// Reproved students whose reasons include a low average.
    pub low_average: usize,
    /// Students eligible for at least one recovery exam.
    pub noa_eligible: usize,
    /// Mean of the unrounded final averages.
    pub mean_final_average: f64,
    /// Fraction of evaluated students that were approved.
    pub approval_rate: f64,
}

/// Compute class statistics from student evaluations.
pub fn compute_class_stats(evaluations: &[StudentEvaluation]) -> ClassStats {
    let mut stats = ClassStats {
        total: evaluations.len(),
        ..Default::default()
    };

    for e in evaluations {
        match e.result.classification {
            Classification::Approved => stats.approved += 1,
            Classification::Pending => stats.pending += 1,
            Classification::Reproved => stats.reproved += 1,
        }
        if let Some(reason) = e.result.fail_reason {
            if reason.includes_low_attendance() {
                stats.low_attendance += 1;
            }
            if reason.includes_low_average() {
                stats.low_average += 1;
            }
        }
        if e.noa_eligibility.any() {
            stats.noa_eligible += 1;
        }
    }

    if stats.total > 0 {
        let n = stats.total as f64;
        stats.mean_final_average =
            evaluations.iter().map(|e| e.result.final_average).sum::<f64>() / n;
        stats.approval_rate = stats.approved as f64 / n;
    }

    stats
}

/// Filters offered by list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Approved,
    Reproved,
    Pending,
    /// Eligible for at least one recovery exam.
    Noa,
}

impl StatusFilter {
    pub fn matches(self, evaluation: &StudentEvaluation) -> bool {
        match self {
            StatusFilter::Approved => evaluation.result.classification == Classification::Approved,
            StatusFilter::Reproved => evaluation.result.classification == Classification::Reproved,
            StatusFilter::Pending => evaluation.result.classification == Classification::Pending,
            StatusFilter::Noa => evaluation.noa_eligibility.any(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::Approved => write!(f, "approved"),
            StatusFilter::Reproved => write!(f, "reproved"),
            StatusFilter::Pending => write!(f, "pending"),
            StatusFilter::Noa => write!(f, "noa"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approved" => Ok(StatusFilter::Approved),
            "reproved" => Ok(StatusFilter::Reproved),
            "pending" => Ok(StatusFilter::Pending),
            "noa" | "noa-eligible" => Ok(StatusFilter::Noa),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// Parse a comma-separated filter list such as `"pending,noa"`.
pub fn parse_filters(s: &str) -> Result<Vec<StatusFilter>, String> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}
