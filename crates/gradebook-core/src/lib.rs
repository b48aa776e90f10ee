//! gradebook-core: Grade evaluation engine, policy, rosters and reports.
//!
//! The heart of the crate is [`engine::GradeEvaluator`], a pure function from
//! a student's unit scores, recovery exams and attendance to a final average
//! and classification. The other modules feed it (rosters, policy config) and
//! summarize its output (statistics, reports).

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod roster;
pub mod statistics;

pub use engine::{evaluate, GradeEvaluator};
pub use error::{EvaluationError, ScoreField};
pub use model::{Classification, EffectiveUnitScores, EvaluationResult, FailReason, UnitScores};
