//! gradebook-report: Self-contained HTML class reports.

pub mod html;
