//! Directional warn/critical threshold evaluation
//!
//! Every numeric sub-check states which direction is "worse" through a
//! [`ThresholdPolicy`] and hands its value to [`evaluate`]. Comparisons are
//! inclusive: a value sitting exactly on a threshold belongs to the worse
//! category.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::result::Status;

/// Which ordering of warn/crit is acceptable and which direction is worse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdPolicy {
    /// Higher is worse, valid only when warn < crit
    AscendingOnly,
    /// Lower is worse, valid only when crit < warn
    DescendingOnly,
    /// Direction follows the configured pair: crit >= warn is ascending
    AutoDetect,
}

/// Resolved comparison direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Outcome of a single evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Status(Status),
    InvalidThresholds,
}

/// A warn/crit pair exactly as configured
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds<T> {
    pub warn: Option<T>,
    pub crit: Option<T>,
}

impl<T> Default for Thresholds<T> {
    fn default() -> Self {
        Self { warn: None, crit: None }
    }
}

impl<T: PartialOrd + Copy> Thresholds<T> {
    pub fn new(warn: T, crit: T) -> Self {
        Self {
            warn: Some(warn),
            crit: Some(crit),
        }
    }

    pub fn warn_only(warn: T) -> Self {
        Self { warn: Some(warn), crit: None }
    }

    pub fn crit_only(crit: T) -> Self {
        Self { warn: None, crit: Some(crit) }
    }

    /// True when at least one side is configured
    pub fn is_set(&self) -> bool {
        self.warn.is_some() || self.crit.is_some()
    }

    /// Validity of the pair under `policy`. A half-configured pair has no
    /// ordering to violate.
    pub fn is_valid(&self, policy: ThresholdPolicy) -> bool {
        match (policy, self.warn, self.crit) {
            (ThresholdPolicy::AscendingOnly, Some(warn), Some(crit)) => warn < crit,
            (ThresholdPolicy::DescendingOnly, Some(warn), Some(crit)) => crit < warn,
            _ => true,
        }
    }

    /// Direction for a valid pair, `None` when the pair is invalid
    pub fn direction(&self, policy: ThresholdPolicy) -> Option<Direction> {
        if !self.is_valid(policy) {
            return None;
        }

        let direction = match policy {
            ThresholdPolicy::AscendingOnly => Direction::Ascending,
            ThresholdPolicy::DescendingOnly => Direction::Descending,
            ThresholdPolicy::AutoDetect => match (self.warn, self.crit) {
                (Some(warn), Some(crit)) if crit < warn => Direction::Descending,
                _ => Direction::Ascending,
            },
        };

        Some(direction)
    }

    /// Converts both sides, keeping absent sides absent
    pub fn map<U, F: Fn(T) -> U>(&self, f: F) -> Thresholds<U> {
        Thresholds {
            warn: self.warn.map(&f),
            crit: self.crit.map(&f),
        }
    }
}

/// Classifies `value` against `thresholds` under `policy`.
///
/// The validity check runs first; an invalid pair short-circuits to
/// [`Verdict::InvalidThresholds`] without comparing the value.
pub fn evaluate<T: PartialOrd + Copy>(
    value: T,
    thresholds: &Thresholds<T>,
    policy: ThresholdPolicy,
) -> Verdict {
    let Some(direction) = thresholds.direction(policy) else {
        warn!(?policy, "rejecting invalid warn/crit ordering");
        return Verdict::InvalidThresholds;
    };

    let breached = |threshold: Option<T>| match (direction, threshold) {
        (Direction::Ascending, Some(limit)) => value >= limit,
        (Direction::Descending, Some(limit)) => value <= limit,
        (_, None) => false,
    };

    let status = if breached(thresholds.crit) {
        Status::Critical
    } else if breached(thresholds.warn) {
        Status::Warning
    } else {
        Status::Ok
    };

    debug!(?policy, ?direction, ?status, "evaluated threshold");
    Verdict::Status(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(verdict: Verdict) -> Status {
        match verdict {
            Verdict::Status(s) => s,
            Verdict::InvalidThresholds => panic!("unexpected invalid thresholds"),
        }
    }

    #[test]
    fn test_ascending_boundaries() {
        let t = Thresholds::new(30.0, 50.0);
        let p = ThresholdPolicy::AscendingOnly;
        assert_eq!(status(evaluate(29.9, &t, p)), Status::Ok);
        assert_eq!(status(evaluate(30.0, &t, p)), Status::Warning);
        assert_eq!(status(evaluate(49.9, &t, p)), Status::Warning);
        assert_eq!(status(evaluate(50.0, &t, p)), Status::Critical);
    }

    #[test]
    fn test_descending_boundaries() {
        let t = Thresholds::new(1200, 600);
        let p = ThresholdPolicy::DescendingOnly;
        assert_eq!(status(evaluate(599, &t, p)), Status::Critical);
        assert_eq!(status(evaluate(600, &t, p)), Status::Critical);
        assert_eq!(status(evaluate(601, &t, p)), Status::Warning);
        assert_eq!(status(evaluate(1200, &t, p)), Status::Warning);
        assert_eq!(status(evaluate(1201, &t, p)), Status::Ok);
    }

    #[test]
    fn test_invalid_pairs() {
        assert_eq!(
            evaluate(50.0, &Thresholds::new(70.0, 60.0), ThresholdPolicy::AscendingOnly),
            Verdict::InvalidThresholds
        );
        assert_eq!(
            evaluate(50, &Thresholds::new(10, 20), ThresholdPolicy::DescendingOnly),
            Verdict::InvalidThresholds
        );
        // equal pairs are invalid in both fixed directions
        assert!(!Thresholds::new(5, 5).is_valid(ThresholdPolicy::AscendingOnly));
        assert!(!Thresholds::new(5, 5).is_valid(ThresholdPolicy::DescendingOnly));
    }

    #[test]
    fn test_auto_detect_direction() {
        let p = ThresholdPolicy::AutoDetect;
        assert_eq!(Thresholds::new(800, 1024).direction(p), Some(Direction::Ascending));
        assert_eq!(Thresholds::new(1300, 1200).direction(p), Some(Direction::Descending));
        assert_eq!(Thresholds::new(5, 5).direction(p), Some(Direction::Ascending));

        assert_eq!(status(evaluate(1024, &Thresholds::new(1300, 1200), p)), Status::Critical);
        assert_eq!(status(evaluate(1024, &Thresholds::new(1300, 1000), p)), Status::Warning);
        assert_eq!(status(evaluate(1024, &Thresholds::new(900, 800), p)), Status::Ok);
    }

    #[test]
    fn test_half_configured_pairs() {
        let crit = Thresholds::crit_only(10);
        assert!(crit.is_valid(ThresholdPolicy::DescendingOnly));
        assert_eq!(status(evaluate(5, &crit, ThresholdPolicy::DescendingOnly)), Status::Critical);
        assert_eq!(status(evaluate(11, &crit, ThresholdPolicy::DescendingOnly)), Status::Ok);

        let warn = Thresholds::warn_only(10);
        assert_eq!(status(evaluate(10, &warn, ThresholdPolicy::AscendingOnly)), Status::Warning);
        assert_eq!(status(evaluate(10, &warn, ThresholdPolicy::AutoDetect)), Status::Warning);

        let unset: Thresholds<u64> = Thresholds::default();
        assert!(!unset.is_set());
        assert_eq!(status(evaluate(u64::MAX, &unset, ThresholdPolicy::AscendingOnly)), Status::Ok);
    }
}
