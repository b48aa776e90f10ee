//! Grade evaluation engine.
//!
//! Turns four unit scores, the optional recovery exams (NOA1 for units 1-2,
//! NOA2 for units 3-4) and an attendance ratio into a final average and a
//! classification. Evaluation is a pure function of its input: re-running it
//! after recovery exams means calling [`GradeEvaluator::evaluate`] again with
//! the NOA fields filled in.

use std::time::Instant;

use uuid::Uuid;

use crate::config::GradingPolicy;
use crate::error::{EvaluationError, ScoreField};
use crate::model::{Classification, EffectiveUnitScores, EvaluationResult, FailReason, UnitScores};
use crate::report::{ClassReport, ClassSummary, RejectedStudent, StudentEvaluation};
use crate::roster::Roster;
use crate::statistics::{compute_class_stats, noa_eligibility};

/// Tolerance for comparing `value` against a threshold: a few ULPs, enough to
/// absorb binary floating point noise in sums such as `4.0 + 4.6 + 9.7 + 9.7`
/// without moving genuinely lower averages into a higher bucket.
fn float_tolerance(value: f64) -> f64 {
    value.abs() * 4.0 * f64::EPSILON
}

/// Evaluates students against a [`GradingPolicy`].
///
/// Holds no state besides the policy, so one evaluator can be shared freely
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct GradeEvaluator {
    policy: GradingPolicy,
}

impl GradeEvaluator {
    /// Create an evaluator without checking the policy. Use [`try_new`] for
    /// policies that did not come through [`crate::config::load_policy_from`].
    ///
    /// [`try_new`]: GradeEvaluator::try_new
    pub fn new(policy: GradingPolicy) -> Self {
        Self { policy }
    }

    /// Create an evaluator, rejecting inconsistent thresholds.
    pub fn try_new(policy: GradingPolicy) -> anyhow::Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &GradingPolicy {
        &self.policy
    }

    /// Evaluate one student's scores.
    ///
    /// Fails with [`EvaluationError::InvalidScoreRange`] naming the first
    /// offending field; no partial result is produced.
    pub fn evaluate(&self, input: &UnitScores) -> Result<EvaluationResult, EvaluationError> {
        validate(input)?;

        let (unit1, unit2, noa1_applied) = substitute_pair(input.unit1, input.unit2, input.noa1);
        let (unit3, unit4, noa2_applied) = substitute_pair(input.unit3, input.unit4, input.noa2);
        let effective_scores = EffectiveUnitScores {
            unit1,
            unit2,
            unit3,
            unit4,
        };

        let final_average = effective_scores.sum() / 4.0;
        let (classification, fail_reason) =
            self.classify(final_average, input.attendance_ratio);

        Ok(EvaluationResult {
            effective_scores,
            final_average,
            rounded_average: round_half_away_from_zero(final_average, 2),
            noa1_applied,
            noa2_applied,
            classification,
            fail_reason,
        })
    }

    /// Classify an unrounded average and attendance ratio.
    ///
    /// The attendance gate is absolute: a student below the minimum is
    /// reproved whatever the average.
    pub fn classify(
        &self,
        final_average: f64,
        attendance_ratio: f64,
    ) -> (Classification, Option<FailReason>) {
        let low_attendance = attendance_ratio < self.policy.min_attendance;
        let tolerance = float_tolerance(final_average);
        let low_average = final_average + tolerance < self.policy.reproval_average;

        if let Some(reason) = FailReason::from_gates(low_attendance, low_average) {
            return (Classification::Reproved, Some(reason));
        }

        if final_average + tolerance >= self.policy.approval_average {
            (Classification::Approved, None)
        } else {
            (Classification::Pending, None)
        }
    }

    /// Evaluate every student of a roster into a class report.
    ///
    /// Students whose scores fail validation, or whose record was malformed,
    /// are listed as rejected; the rest of the class is still evaluated.
    pub fn evaluate_roster(&self, roster: &Roster) -> ClassReport {
        let start = Instant::now();
        let mut evaluations = Vec::new();
        let mut rejected = Vec::new();

        for student in &roster.students {
            match self.evaluate(&student.scores) {
                Ok(result) => {
                    evaluations.push(StudentEvaluation {
                        student_id: student.id.clone(),
                        name: student.name.clone(),
                        scores: student.scores,
                        noa_eligibility: noa_eligibility(&student.scores, &result),
                        result,
                    });
                }
                Err(e) => {
                    tracing::warn!("rejected {}/{}: {e}", roster.id, student.id);
                    rejected.push(RejectedStudent {
                        student_id: student.id.clone(),
                        name: student.name.clone(),
                        field: Some(e.field()),
                        value: Some(e.value()),
                        message: e.to_string(),
                    });
                }
            }
        }

        rejected.extend(roster.malformed.iter().map(|m| RejectedStudent {
            student_id: m.id.clone(),
            name: m.name.clone(),
            field: None,
            value: None,
            message: m.message.clone(),
        }));

        let stats = compute_class_stats(&evaluations);
        tracing::info!(
            "evaluated {}: {} approved, {} pending, {} reproved, {} rejected",
            roster.id,
            stats.approved,
            stats.pending,
            stats.reproved,
            rejected.len()
        );
        tracing::debug!("{} evaluated in {:?}", roster.id, start.elapsed());

        ClassReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            class: ClassSummary {
                id: roster.id.clone(),
                name: roster.name.clone(),
                subject: roster.subject.clone(),
                term: roster.term.clone(),
                student_count: roster.students.len() + roster.malformed.len(),
            },
            policy: self.policy,
            evaluations,
            rejected,
            stats,
        }
    }
}

/// Evaluate with the published default policy.
pub fn evaluate(input: &UnitScores) -> Result<EvaluationResult, EvaluationError> {
    GradeEvaluator::default().evaluate(input)
}

fn validate(input: &UnitScores) -> Result<(), EvaluationError> {
    let required = [
        (ScoreField::Unit1, input.unit1),
        (ScoreField::Unit2, input.unit2),
        (ScoreField::Unit3, input.unit3),
        (ScoreField::Unit4, input.unit4),
    ];
    let optional = [(ScoreField::Noa1, input.noa1), (ScoreField::Noa2, input.noa2)];

    let fields = required
        .into_iter()
        .chain(
            optional
                .into_iter()
                .filter_map(|(field, value)| value.map(|v| (field, v))),
        )
        .chain(std::iter::once((
            ScoreField::AttendanceRatio,
            input.attendance_ratio,
        )));

    for (field, value) in fields {
        if !field.accepts(value) {
            return Err(EvaluationError::InvalidScoreRange { field, value });
        }
    }
    Ok(())
}

/// Apply a recovery exam to a unit pair.
///
/// The NOA replaces the lower unit only when strictly greater; on a tie the
/// first unit of the pair is replaced.
fn substitute_pair(first: f64, second: f64, noa: Option<f64>) -> (f64, f64, bool) {
    let Some(noa) = noa else {
        return (first, second, false);
    };

    if noa <= first.min(second) {
        return (first, second, false);
    }

    if first <= second {
        (noa, second, true)
    } else {
        (first, noa, true)
    }
}

/// Round half away from zero to `places` decimals.
///
/// The scaled value is nudged by a few ULPs before rounding so that
/// decimal halves stored just below `.5` (e.g. `1.005`) still round up.
pub fn round_half_away_from_zero(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    let nudged = scaled + scaled.signum() * float_tolerance(scaled);
    nudged.round() / factor
}
