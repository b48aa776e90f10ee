//! Core data model types for gradebook.
//!
//! Inputs and outputs of a single evaluation. All values are plain data,
//! created fresh for every call and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw scores for one student in one subject, as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitScores {
    /// Unit 1 score, `0.0..=10.0`.
    pub unit1: f64,
    /// Unit 2 score, `0.0..=10.0`.
    pub unit2: f64,
    /// Unit 3 score, `0.0..=10.0`.
    pub unit3: f64,
    /// Unit 4 score, `0.0..=10.0`.
    pub unit4: f64,
    /// Recovery exam for units 1 and 2.
    #[serde(default)]
    pub noa1: Option<f64>,
    /// Recovery exam for units 3 and 4.
    #[serde(default)]
    pub noa2: Option<f64>,
    /// Fraction of classes attended, `0.0..=1.0`.
    pub attendance_ratio: f64,
}

impl UnitScores {
    /// Scores without any recovery exam.
    pub fn new(units: [f64; 4], attendance_ratio: f64) -> Self {
        Self {
            unit1: units[0],
            unit2: units[1],
            unit3: units[2],
            unit4: units[3],
            noa1: None,
            noa2: None,
            attendance_ratio,
        }
    }

    pub fn with_noa1(mut self, score: f64) -> Self {
        self.noa1 = Some(score);
        self
    }

    pub fn with_noa2(mut self, score: f64) -> Self {
        self.noa2 = Some(score);
        self
    }

    /// The four raw unit scores in order.
    pub fn units(&self) -> [f64; 4] {
        [self.unit1, self.unit2, self.unit3, self.unit4]
    }
}

/// Unit scores after recovery-exam substitution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveUnitScores {
    pub unit1: f64,
    pub unit2: f64,
    pub unit3: f64,
    pub unit4: f64,
}

impl EffectiveUnitScores {
    pub fn units(&self) -> [f64; 4] {
        [self.unit1, self.unit2, self.unit3, self.unit4]
    }

    pub fn sum(&self) -> f64 {
        self.unit1 + self.unit2 + self.unit3 + self.unit4
    }
}

/// Final academic standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Reproved,
    Pending,
    Approved,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Approved => write!(f, "Approved"),
            Classification::Reproved => write!(f, "Reproved"),
            Classification::Pending => write!(f, "Pending"),
        }
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approved" => Ok(Classification::Approved),
            "reproved" => Ok(Classification::Reproved),
            "pending" => Ok(Classification::Pending),
            other => Err(format!("unknown classification: {other}")),
        }
    }
}

/// Why a student was reproved. Both gates can fail at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    LowAverage,
    LowAttendance,
    LowAttendanceAndAverage,
}

impl FailReason {
    /// Combine the outcome of the attendance and average gates.
    /// Returns `None` when neither failed.
    pub fn from_gates(low_attendance: bool, low_average: bool) -> Option<Self> {
        match (low_attendance, low_average) {
            (true, true) => Some(FailReason::LowAttendanceAndAverage),
            (true, false) => Some(FailReason::LowAttendance),
            (false, true) => Some(FailReason::LowAverage),
            (false, false) => None,
        }
    }

    pub fn includes_low_attendance(self) -> bool {
        matches!(
            self,
            FailReason::LowAttendance | FailReason::LowAttendanceAndAverage
        )
    }

    pub fn includes_low_average(self) -> bool {
        matches!(
            self,
            FailReason::LowAverage | FailReason::LowAttendanceAndAverage
        )
    }
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::LowAverage => write!(f, "LowAverage"),
            FailReason::LowAttendance => write!(f, "LowAttendance"),
            FailReason::LowAttendanceAndAverage => write!(f, "LowAttendance+LowAverage"),
        }
    }
}

/// Outcome of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Unit scores used for the average.
    pub effective_scores: EffectiveUnitScores,
    /// Unrounded mean of the effective scores; classification uses this.
    pub final_average: f64,
    /// `final_average` rounded half away from zero to two decimals.
    pub rounded_average: f64,
    pub noa1_applied: bool,
    pub noa2_applied: bool,
    pub classification: Classification,
    /// Present only when `classification` is `Reproved`.
    #[serde(default)]
    pub fail_reason: Option<FailReason>,
}

impl EvaluationResult {
    pub fn is_approved(&self) -> bool {
        self.classification == Classification::Approved
    }

    /// Whether the attendance gate failed.
    pub fn failed_attendance(&self) -> bool {
        self.fail_reason
            .is_some_and(|reason| reason.includes_low_attendance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_display_and_parse() {
        assert_eq!(Classification::Approved.to_string(), "Approved");
        assert_eq!(Classification::Pending.to_string(), "Pending");
        assert_eq!(
            "REPROVED".parse::<Classification>().unwrap(),
            Classification::Reproved
        );
        assert!("passed".parse::<Classification>().is_err());
    }

    #[test]
    fn classification_orders_from_worst_to_best() {
        assert!(Classification::Reproved < Classification::Pending);
        assert!(Classification::Pending < Classification::Approved);
    }

    #[test]
    fn fail_reason_combines_gates() {
        assert_eq!(FailReason::from_gates(false, false), None);
        assert_eq!(
            FailReason::from_gates(true, false),
            Some(FailReason::LowAttendance)
        );
        let both = FailReason::from_gates(true, true).unwrap();
        assert!(both.includes_low_attendance());
        assert!(both.includes_low_average());
        assert_eq!(both.to_string(), "LowAttendance+LowAverage");
    }

    #[test]
    fn unit_scores_builder() {
        let scores = UnitScores::new([1.0, 2.0, 3.0, 4.0], 0.8)
            .with_noa1(5.0)
            .with_noa2(6.0);
        assert_eq!(scores.units(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(scores.noa1, Some(5.0));
        assert_eq!(scores.noa2, Some(6.0));
    }

    #[test]
    fn unit_scores_deserialize_without_noa() {
        let json = r#"{"unit1":7,"unit2":7,"unit3":7,"unit4":7,"attendance_ratio":1.0}"#;
        let scores: UnitScores = serde_json::from_str(json).unwrap();
        assert!(scores.noa1.is_none());
        assert!(scores.noa2.is_none());
        assert_eq!(scores.unit4, 7.0);
    }
}
