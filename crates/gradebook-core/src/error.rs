//! Evaluation error types.
//!
//! The evaluator has a single failure mode: malformed input. Errors carry the
//! offending field and value so callers can map them onto form validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An input field of [`UnitScores`](crate::model::UnitScores).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    Unit1,
    Unit2,
    Unit3,
    Unit4,
    Noa1,
    Noa2,
    AttendanceRatio,
}

impl ScoreField {
    /// Inclusive bounds accepted for this field.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            ScoreField::AttendanceRatio => (0.0, 1.0),
            _ => (0.0, 10.0),
        }
    }

    /// Returns `true` if `value` is finite and inside [`bounds`](Self::bounds).
    pub fn accepts(self, value: f64) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }

    fn range_label(self) -> String {
        let (min, max) = self.bounds();
        format!("{min:.1}..={max:.1}")
    }
}

impl fmt::Display for ScoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreField::Unit1 => write!(f, "unit1"),
            ScoreField::Unit2 => write!(f, "unit2"),
            ScoreField::Unit3 => write!(f, "unit3"),
            ScoreField::Unit4 => write!(f, "unit4"),
            ScoreField::Noa1 => write!(f, "noa1"),
            ScoreField::Noa2 => write!(f, "noa2"),
            ScoreField::AttendanceRatio => write!(f, "attendance_ratio"),
        }
    }
}

/// Errors returned by [`GradeEvaluator::evaluate`](crate::engine::GradeEvaluator::evaluate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// A score or the attendance ratio lies outside its allowed range
    /// (non-finite values included).
    #[error("invalid score range: {field} = {value} (allowed {})", .field.range_label())]
    InvalidScoreRange { field: ScoreField, value: f64 },
}

impl EvaluationError {
    /// The field that failed validation.
    pub fn field(&self) -> ScoreField {
        match self {
            EvaluationError::InvalidScoreRange { field, .. } => *field,
        }
    }

    /// The rejected value.
    pub fn value(&self) -> f64 {
        match self {
            EvaluationError::InvalidScoreRange { value, .. } => *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert!(ScoreField::Unit1.accepts(0.0));
        assert!(ScoreField::Unit1.accepts(10.0));
        assert!(!ScoreField::Unit1.accepts(10.0001));
        assert!(!ScoreField::Noa2.accepts(-0.01));
        assert!(ScoreField::AttendanceRatio.accepts(1.0));
        assert!(!ScoreField::AttendanceRatio.accepts(1.5));
        assert!(!ScoreField::Unit3.accepts(f64::NAN));
        assert!(!ScoreField::Unit3.accepts(f64::INFINITY));
    }

    #[test]
    fn error_message_names_field_and_value() {
        let err = EvaluationError::InvalidScoreRange {
            field: ScoreField::Unit1,
            value: 11.0,
        };
        assert_eq!(err.to_string(), "invalid score range: unit1 = 11 (allowed 0.0..=10.0)");
        assert_eq!(err.field(), ScoreField::Unit1);
        assert_eq!(err.value(), 11.0);
    }

    #[test]
    fn attendance_error_reports_ratio_bounds() {
        let err = EvaluationError::InvalidScoreRange {
            field: ScoreField::AttendanceRatio,
            value: 1.2,
        };
        assert!(err.to_string().contains("attendance_ratio = 1.2"));
        assert!(err.to_string().contains("0.0..=1.0"));
    }
}
