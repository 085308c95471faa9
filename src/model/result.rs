//! # Trial results.
//!
//! One [`TrialResult`] is produced per trial that reached the measurement
//! phase and finished without a stream fault. It serializes to:
//!
//! ```text
//! { "expected_count": 5, "received_count": 3, "outcome": "timed-out" }
//! ```

use serde::Serialize;

/// How the measurement phase ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Every expected delivery was observed before the deadline.
    Completed,
    /// The deadline elapsed first; the count may be partial.
    TimedOut,
    /// The observation path failed while counting.
    Errored,
}

impl Outcome {
    /// Returns the wire label (`completed`, `timed-out`, `errored`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::TimedOut => "timed-out",
            Outcome::Errored => "errored",
        }
    }
}

/// Immutable record of one trial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrialResult {
    /// Deliveries the trial expected.
    pub expected_count: u64,
    /// Deliveries actually counted.
    pub received_count: u64,
    /// How counting ended.
    pub outcome: Outcome,
}

impl TrialResult {
    /// Creates a result.
    pub fn new(expected_count: u64, received_count: u64, outcome: Outcome) -> Self {
        Self {
            expected_count,
            received_count,
            outcome,
        }
    }

    /// Ratio of received to expected deliveries (`1.0` when nothing was expected).
    pub fn delivery_ratio(&self) -> f64 {
        if self.expected_count == 0 {
            return 1.0;
        }
        self.received_count as f64 / self.expected_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_wire_shape() {
        let result = TrialResult::new(5, 3, Outcome::TimedOut);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "expected_count": 5,
                "received_count": 3,
                "outcome": "timed-out",
            })
        );
    }

    #[test]
    fn outcome_labels_match_serde() {
        for outcome in [Outcome::Completed, Outcome::TimedOut, Outcome::Errored] {
            let json = serde_json::to_value(outcome).unwrap();
            assert_eq!(json, serde_json::Value::from(outcome.as_str()));
        }
    }

    #[test]
    fn delivery_ratio() {
        assert_eq!(TrialResult::new(4, 3, Outcome::TimedOut).delivery_ratio(), 0.75);
        assert_eq!(TrialResult::new(0, 0, Outcome::Completed).delivery_ratio(), 1.0);
    }
}
