//! Classifier configuration.
//!
use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{Result, StabilityError};

/// Debounce settings and label set of one session.
///
/// `grace_ms` and `hold_to_complete_ms` are disabled when zero. A
/// `min_dwell_ms` of zero gives the plain edge-trigger behaviour: every change
/// of best label is reported immediately.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StabilityConfig {
    #[serde(default, alias = "minDwellMs")]
    pub min_dwell_ms: u64,
    #[serde(default, alias = "graceMs")]
    pub grace_ms: u64,
    #[serde(default, alias = "holdToCompleteMs")]
    pub hold_to_complete_ms: u64,
    #[serde(alias = "labelSet")]
    pub labels: Vec<String>,
    /// Catch-all classes such as "background noise". Never picked as target.
    #[serde(default, alias = "sentinelLabels")]
    pub sentinel_labels: Vec<String>,
    /// Best predictions scoring below this are ignored, unless sentinel.
    #[serde(default, alias = "minScore", alias = "probabilityThreshold")]
    pub min_score: f32,
}

impl StabilityConfig {
    /// Edge-trigger config for the given labels.
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            min_dwell_ms: 0,
            grace_ms: 0,
            hold_to_complete_ms: 0,
            labels,
            sentinel_labels: Vec::new(),
            min_score: 0.0,
        }
    }

    pub fn with_min_dwell_ms(mut self, min_dwell_ms: u64) -> Self {
        self.min_dwell_ms = min_dwell_ms;
        self
    }

    pub fn with_grace_ms(mut self, grace_ms: u64) -> Self {
        self.grace_ms = grace_ms;
        self
    }

    pub fn with_hold_to_complete_ms(mut self, hold_to_complete_ms: u64) -> Self {
        self.hold_to_complete_ms = hold_to_complete_ms;
        self
    }

    pub fn with_sentinel_labels(mut self, sentinel_labels: Vec<String>) -> Self {
        self.sentinel_labels = sentinel_labels;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn grace(&self) -> Option<u64> {
        (self.grace_ms > 0).then_some(self.grace_ms)
    }

    pub fn hold_to_complete(&self) -> Option<u64> {
        (self.hold_to_complete_ms > 0).then_some(self.hold_to_complete_ms)
    }

    pub fn is_sentinel(&self, label: &str) -> bool {
        self.sentinel_labels
            .iter()
            .any(|sentinel| sentinel.eq_ignore_ascii_case(label))
    }

    pub fn is_known(&self, label: &str) -> bool {
        self.labels.iter().any(|known| known == label)
    }

    /// Labels eligible as hold-to-complete targets, in label order.
    pub fn target_labels(&self) -> Vec<String> {
        self.labels
            .iter()
            .filter(|label| !self.is_sentinel(label))
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(StabilityError::InvalidConfig("label set is empty".into()));
        }

        let mut seen = HashSet::with_capacity(self.labels.len());
        for label in self.labels.iter() {
            if !seen.insert(label.as_str()) {
                return Err(StabilityError::InvalidConfig(format!(
                    "duplicate label {label:?}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(StabilityError::InvalidConfig(format!(
                "minimum score {} is not a probability",
                self.min_score
            )));
        }

        if self.hold_to_complete().is_some() && self.target_labels().is_empty() {
            return Err(StabilityError::InvalidConfig(
                "hold-to-complete needs at least one non-sentinel label".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_zero_disables_timers() {
        let config = StabilityConfig::new(labels(&["a", "b"]));
        assert_eq!(config.grace(), None);
        assert_eq!(config.hold_to_complete(), None);

        let config = config.with_grace_ms(500).with_hold_to_complete_ms(5000);
        assert_eq!(config.grace(), Some(500));
        assert_eq!(config.hold_to_complete(), Some(5000));
    }

    #[test]
    fn test_validate() {
        assert!(StabilityConfig::new(labels(&["a", "b"])).validate().is_ok());
        assert!(StabilityConfig::new(vec![]).validate().is_err());
        assert!(StabilityConfig::new(labels(&["a", "a"])).validate().is_err());

        let threshold = StabilityConfig::new(labels(&["a"])).with_min_score(0.7);
        assert!(threshold.validate().is_ok());
        assert!(threshold.with_min_score(f32::NAN).validate().is_err());

        let only_noise = StabilityConfig::new(labels(&["Background Noise"]))
            .with_sentinel_labels(labels(&["background noise"]))
            .with_hold_to_complete_ms(5000);
        assert!(only_noise.validate().is_err());
    }

    #[test]
    fn test_target_labels_skip_sentinels() {
        let config = StabilityConfig::new(labels(&["Background Noise", "kaffe", "lys"]))
            .with_sentinel_labels(labels(&["background noise", "unknown"]));
        assert_eq!(config.target_labels(), labels(&["kaffe", "lys"]));
        assert!(config.is_sentinel("BACKGROUND NOISE"));
        assert!(!config.is_known("unknown"));
    }

    #[test]
    fn test_deserialize_option_names() -> std::result::Result<(), serde_json::Error> {
        let config: StabilityConfig = serde_json::from_str(
            r#"{"minDwellMs": 1000, "graceMs": 500, "holdToCompleteMs": 5000,
                "labelSet": ["upward-salute", "extended-side", "warrior"]}"#,
        )?;
        assert_eq!(config.min_dwell_ms, 1000);
        assert_eq!(config.grace(), Some(500));
        assert_eq!(config.labels.len(), 3);
        assert!(config.sentinel_labels.is_empty());
        assert_eq!(config.min_score, 0.0);

        let config: StabilityConfig = serde_json::from_str(
            r#"{"labelSet": ["kaffe", "lys"], "probabilityThreshold": 0.7}"#,
        )?;
        assert_eq!(config.min_score, 0.7);

        Ok(())
    }
}
