//! Grading policy configuration.
//!
//! The defaults are the institution's published rules. A `gradebook.toml`
//! file or environment variables may override the thresholds; score ranges
//! are fixed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Thresholds used to classify a student.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingPolicy {
    /// Final average at or above which a student is approved.
    #[serde(default = "default_approval_average")]
    pub approval_average: f64,
    /// Final average below which a student is reproved.
    #[serde(default = "default_reproval_average")]
    pub reproval_average: f64,
    /// Attendance ratio below which a student is reproved regardless of scores.
    #[serde(default = "default_min_attendance")]
    pub min_attendance: f64,
}

fn default_approval_average() -> f64 {
    7.0
}
fn default_reproval_average() -> f64 {
    5.0
}
fn default_min_attendance() -> f64 {
    0.75
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            approval_average: default_approval_average(),
            reproval_average: default_reproval_average(),
            min_attendance: default_min_attendance(),
        }
    }
}

impl GradingPolicy {
    /// Check that the thresholds are consistent with each other and with the
    /// score ranges.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (0.0..=10.0).contains(&self.reproval_average),
            "reproval_average must be between 0.0 and 10.0, got {}",
            self.reproval_average
        );
        anyhow::ensure!(
            (0.0..=10.0).contains(&self.approval_average),
            "approval_average must be between 0.0 and 10.0, got {}",
            self.approval_average
        );
        anyhow::ensure!(
            self.reproval_average <= self.approval_average,
            "reproval_average ({}) must not exceed approval_average ({})",
            self.reproval_average,
            self.approval_average
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.min_attendance),
            "min_attendance must be between 0.0 and 1.0, got {}",
            self.min_attendance
        );
        Ok(())
    }

    /// The grading rules as help text.
    pub fn rules(&self) -> Vec<String> {
        vec![
            "The final average is the mean of the four unit scores (0 to 10).".to_string(),
            "NOA1 replaces the lower of units 1 and 2 when it is greater; on a tie unit 1 is replaced.".to_string(),
            "NOA2 replaces the lower of units 3 and 4 when it is greater; on a tie unit 3 is replaced.".to_string(),
            format!(
                "Attendance below {:.0}% reproves the student regardless of the average.",
                self.min_attendance * 100.0
            ),
            format!(
                "A final average of {:.1} or more approves the student.",
                self.approval_average
            ),
            format!(
                "A final average below {:.1} reproves the student.",
                self.reproval_average
            ),
            format!(
                "Averages from {:.1} up to {:.1} leave the student pending, eligible for recovery exams.",
                self.reproval_average, self.approval_average
            ),
            "After recovery exams the student is evaluated again with the NOA scores filled in.".to_string(),
        ]
    }
}

/// Load the policy from well-known paths.
///
/// Search order:
/// 1. `gradebook.toml` in the current directory
/// 2. `~/.config/gradebook/config.toml`
///
/// Environment variable overrides: `GRADEBOOK_APPROVAL_AVERAGE`,
/// `GRADEBOOK_REPROVAL_AVERAGE`, `GRADEBOOK_MIN_ATTENDANCE`.
pub fn load_policy() -> Result<GradingPolicy> {
    load_policy_from(None)
}

/// Load the policy from an explicit path, or search the default locations.
pub fn load_policy_from(path: Option<&Path>) -> Result<GradingPolicy> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradebook.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut policy = match config_path {
        Some(path) => {
            tracing::debug!("loading grading policy from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_policy_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradingPolicy::default(),
    };

    apply_env_override("GRADEBOOK_APPROVAL_AVERAGE", &mut policy.approval_average)?;
    apply_env_override("GRADEBOOK_REPROVAL_AVERAGE", &mut policy.reproval_average)?;
    apply_env_override("GRADEBOOK_MIN_ATTENDANCE", &mut policy.min_attendance)?;

    policy.validate()?;
    Ok(policy)
}

/// Config file layout: the policy lives under a `[policy]` table so the file
/// can grow other sections.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    policy: Option<GradingPolicy>,
}

/// Parse a config file body into a policy.
pub fn parse_policy_str(content: &str) -> Result<GradingPolicy> {
    let file: ConfigFile = toml::from_str(content)?;
    Ok(file.policy.unwrap_or_default())
}

fn apply_env_override(var: &str, target: &mut f64) -> Result<()> {
    if let Ok(raw) = std::env::var(var) {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("{var} must be a number, got '{raw}'"))?;
        tracing::debug!("{var} overrides policy with {target}");
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradebook"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_published_rules() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.approval_average, 7.0);
        assert_eq!(policy.reproval_average, 5.0);
        assert_eq!(policy.min_attendance, 0.75);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn parse_partial_policy() {
        let toml_str = r#"
[policy]
approval_average = 6.0
"#;
        let policy = parse_policy_str(toml_str).unwrap();
        assert_eq!(policy.approval_average, 6.0);
        assert_eq!(policy.reproval_average, 5.0);
        assert_eq!(policy.min_attendance, 0.75);
    }

    #[test]
    fn parse_empty_config_uses_defaults() {
        let policy = parse_policy_str("").unwrap();
        assert_eq!(policy, GradingPolicy::default());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let policy = GradingPolicy {
            approval_average: 4.0,
            reproval_average: 6.0,
            min_attendance: 0.75,
        };
        let err = policy.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn attendance_threshold_out_of_range_is_rejected() {
        let policy = GradingPolicy {
            min_attendance: 75.0,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradebook.toml");
        std::fs::write(&path, "[policy]\nmin_attendance = 0.8\n").unwrap();

        let policy = load_policy_from(Some(&path)).unwrap();
        assert_eq!(policy.min_attendance, 0.8);
    }

    #[test]
    fn load_from_missing_path_fails() {
        let result = load_policy_from(Some(Path::new("/no/such/gradebook.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn rules_mention_thresholds() {
        let rules = GradingPolicy::default().rules();
        assert!(rules.iter().any(|r| r.contains("75%")));
        assert!(rules.iter().any(|r| r.contains("7.0 or more")));
        assert!(rules.iter().any(|r| r.contains("below 5.0")));
    }
}
