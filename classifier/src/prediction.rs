//! Per-tick predictions and best-class selection.
//!
use smallvec::SmallVec;

use crate::error::{Malformed, Result};

/// Score of one class label in a single tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Predictions of one tick. Demo models have a handful of classes.
pub type Predictions = SmallVec<[Prediction; 4]>;

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.score.is_finite() && (0.0..=1.0).contains(&self.score) {
            Ok(())
        } else {
            Err(Malformed::InvalidScore {
                label: self.label.clone(),
                score: self.score,
            }
            .into())
        }
    }
}

/// Pair raw scores with their labels.
///
/// Both slices must have the same, non-zero length and every score must be a
/// probability. Nothing is returned for a partially valid set.
pub fn combine_scores(labels: &[String], scores: &[f32]) -> Result<Predictions> {
    if scores.is_empty() {
        return Err(Malformed::Empty.into());
    }
    if labels.len() != scores.len() {
        return Err(Malformed::CountMismatch {
            labels: labels.len(),
            scores: scores.len(),
        }
        .into());
    }

    labels
        .iter()
        .zip(scores.iter())
        .map(|(label, score)| {
            let prediction = Prediction::new(label.as_str(), *score);
            prediction.validate()?;
            Ok(prediction)
        })
        .collect()
}

/// Get the prediction with the highest score.
///
/// Uses a strictly-greater comparison, so the first of several equal scores
/// wins.
pub fn best_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    let (first, rest) = predictions.split_first()?;
    Some(rest.iter().fold(first, |max, p| {
        if p.score > max.score {
            p
        } else {
            max
        }
    }))
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::error::StabilityError;

    fn labels() -> Vec<String> {
        vec!["metal".into(), "plastik".into(), "restaffald".into()]
    }

    #[test]
    fn test_combine_scores_keeps_label_order() -> Result<()> {
        let predictions = combine_scores(&labels(), &[0.1, 0.7, 0.2])?;

        let names: Vec<_> = predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(names, ["metal", "plastik", "restaffald"]);
        assert_eq!(predictions[1].score, 0.7);

        Ok(())
    }

    #[test]
    fn test_combine_scores_rejects_count_mismatch() {
        let err = combine_scores(&labels(), &[0.5, 0.5]).unwrap_err();
        assert_eq!(
            err,
            StabilityError::MalformedPrediction(Malformed::CountMismatch {
                labels: 3,
                scores: 2
            })
        );
    }

    #[test]
    fn test_combine_scores_rejects_bad_scores() {
        assert!(combine_scores(&labels(), &[0.1, f32::NAN, 0.2]).is_err());
        assert!(combine_scores(&labels(), &[0.1, 1.5, 0.2]).is_err());
        assert!(combine_scores(&labels(), &[]).is_err());
    }

    #[test]
    fn test_best_prediction_first_wins_ties() {
        let predictions = [
            Prediction::new("a", 0.2),
            Prediction::new("b", 0.4),
            Prediction::new("c", 0.4),
        ];
        assert_eq!(best_prediction(&predictions).map(|p| p.label.as_str()), Some("b"));

        let all_equal = [Prediction::new("x", 0.5), Prediction::new("y", 0.5)];
        assert_eq!(best_prediction(&all_equal).map(|p| p.label.as_str()), Some("x"));

        assert!(best_prediction(&[]).is_none());
    }
}
