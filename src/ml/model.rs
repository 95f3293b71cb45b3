//! Serialized classifier weights and the prediction math over them.
//!
//! The training collaborator publishes the fitted weights as JSON. Two model
//! families are supported: a multi-class logistic regression (linear, exposes
//! per-feature coefficients) and a nearest-centroid classifier (no
//! coefficients, so explainability degrades to an empty importance vector).

use serde::Deserialize;

use crate::error::PredictError;
use crate::samples::{Sample, FEATURE_COUNT};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelWeights {
    LogisticRegression {
        classes: Vec<i64>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    NearestCentroid {
        classes: Vec<i64>,
        centroids: Vec<Vec<f64>>,
    },
}

impl ModelWeights {
    /// Structural checks applied once at load time. A violation makes the
    /// artifact unusable for the process lifetime.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ModelWeights::LogisticRegression {
                classes,
                coefficients,
                intercepts,
            } => {
                if classes.is_empty() {
                    return Err("model has no classes".to_string());
                }
                if coefficients.len() != classes.len() || intercepts.len() != classes.len() {
                    return Err(format!(
                        "expected {} coefficient rows and intercepts, got {} and {}",
                        classes.len(),
                        coefficients.len(),
                        intercepts.len()
                    ));
                }
                check_rows(coefficients, "coefficient")
            }
            ModelWeights::NearestCentroid { classes, centroids } => {
                if classes.is_empty() {
                    return Err("model has no classes".to_string());
                }
                if centroids.len() != classes.len() {
                    return Err(format!(
                        "expected {} centroids, got {}",
                        classes.len(),
                        centroids.len()
                    ));
                }
                check_rows(centroids, "centroid")
            }
        }
    }

    /// One label per input sample, order preserved. Samples are trusted to be
    /// 64-wide here; the engine enforces that before dispatch.
    pub fn predict(&self, batch: &[Sample]) -> Result<Vec<i64>, PredictError> {
        batch.iter().map(|sample| self.predict_one(sample)).collect()
    }

    fn predict_one(&self, sample: &Sample) -> Result<i64, PredictError> {
        match self {
            ModelWeights::LogisticRegression {
                classes,
                coefficients,
                intercepts,
            } => {
                let scores = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(row, intercept)| intercept + dot(row, sample.values()));
                best_class(classes, scores, |score, best| score > best)
            }
            ModelWeights::NearestCentroid { classes, centroids } => {
                let distances = centroids
                    .iter()
                    .map(|centroid| squared_distance(centroid, sample.values()));
                best_class(classes, distances, |distance, best| distance < best)
            }
        }
    }

    /// Mean absolute coefficient magnitude per feature, aggregated across
    /// classes. Empty for models without linear coefficients.
    pub fn mean_abs_coefficients(&self) -> Vec<f64> {
        match self {
            ModelWeights::LogisticRegression { coefficients, .. } => {
                let mut importances = vec![0.0; FEATURE_COUNT];
                for row in coefficients {
                    for (total, value) in importances.iter_mut().zip(row) {
                        *total += value.abs();
                    }
                }
                let rows = coefficients.len() as f64;
                for total in &mut importances {
                    *total /= rows;
                }
                importances
            }
            ModelWeights::NearestCentroid { .. } => Vec::new(),
        }
    }

    pub fn classes(&self) -> &[i64] {
        match self {
            ModelWeights::LogisticRegression { classes, .. } => classes,
            ModelWeights::NearestCentroid { classes, .. } => classes,
        }
    }
}

fn check_rows(rows: &[Vec<f64>], kind: &str) -> Result<(), String> {
    for (index, row) in rows.iter().enumerate() {
        if row.len() != FEATURE_COUNT {
            return Err(format!(
                "{} row {} carries {} features, expected {}",
                kind,
                index,
                row.len(),
                FEATURE_COUNT
            ));
        }
    }
    Ok(())
}

/// First class wins ties, matching argmax/argmin over the class order.
fn best_class(
    classes: &[i64],
    scores: impl Iterator<Item = f64>,
    better: impl Fn(f64, f64) -> bool,
) -> Result<i64, PredictError> {
    let mut best: Option<(usize, f64)> = None;
    for (index, score) in scores.enumerate() {
        if best.map_or(true, |(_, current)| better(score, current)) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| classes[index])
        .ok_or_else(|| PredictError::Model("model has no classes".to_string()))
}

fn dot(weights: &[f64], values: &[f64]) -> f64 {
    weights.iter().zip(values).map(|(w, v)| w * v).sum()
}

fn squared_distance(centroid: &[f64], values: &[f64]) -> f64 {
    centroid
        .iter()
        .zip(values)
        .map(|(c, v)| (c - v) * (c - v))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_sample(hot: usize) -> Sample {
        let mut values = vec![0.0; FEATURE_COUNT];
        values[hot] = 1.0;
        Sample::new(values)
    }

    /// Class k scores highest exactly when feature k is hot.
    fn diagonal_linear(classes: Vec<i64>) -> ModelWeights {
        let coefficients = (0..classes.len())
            .map(|class_index| {
                let mut row = vec![0.0; FEATURE_COUNT];
                row[class_index] = 1.0;
                row
            })
            .collect();
        let intercepts = vec![0.0; classes.len()];
        ModelWeights::LogisticRegression {
            classes,
            coefficients,
            intercepts,
        }
    }

    #[test]
    fn linear_predict_picks_highest_score() {
        let model = diagonal_linear(vec![0, 1, 2]);
        let labels = model
            .predict(&[feature_sample(2), feature_sample(0), feature_sample(1)])
            .expect("predict");
        assert_eq!(labels, vec![2, 0, 1]);
    }

    #[test]
    fn linear_predict_breaks_ties_toward_first_class() {
        let model = diagonal_linear(vec![7, 8]);
        let labels = model
            .predict(&[Sample::new(vec![0.0; FEATURE_COUNT])])
            .expect("predict");
        assert_eq!(labels, vec![7]);
    }

    #[test]
    fn centroid_predict_picks_nearest() {
        let centroids = vec![vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]];
        let model = ModelWeights::NearestCentroid {
            classes: vec![3, 9],
            centroids,
        };
        let near_ones = Sample::new(vec![0.9; FEATURE_COUNT]);
        let near_zeros = Sample::new(vec![0.1; FEATURE_COUNT]);
        let labels = model.predict(&[near_ones, near_zeros]).expect("predict");
        assert_eq!(labels, vec![9, 3]);
    }

    #[test]
    fn linear_importances_average_across_classes() {
        let mut row_a = vec![0.0; FEATURE_COUNT];
        let mut row_b = vec![0.0; FEATURE_COUNT];
        row_a[0] = 2.0;
        row_b[0] = -4.0;
        let model = ModelWeights::LogisticRegression {
            classes: vec![0, 1],
            coefficients: vec![row_a, row_b],
            intercepts: vec![0.0, 0.0],
        };
        let importances = model.mean_abs_coefficients();
        assert_eq!(importances.len(), FEATURE_COUNT);
        assert_eq!(importances[0], 3.0);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn centroid_importances_are_empty() {
        let model = ModelWeights::NearestCentroid {
            classes: vec![0],
            centroids: vec![vec![0.0; FEATURE_COUNT]],
        };
        assert!(model.mean_abs_coefficients().is_empty());
    }

    #[test]
    fn validate_rejects_row_and_class_mismatches() {
        let model = ModelWeights::LogisticRegression {
            classes: vec![0, 1],
            coefficients: vec![vec![0.0; FEATURE_COUNT]],
            intercepts: vec![0.0, 0.0],
        };
        assert!(model.validate().is_err());

        let model = ModelWeights::LogisticRegression {
            classes: vec![0],
            coefficients: vec![vec![0.0; 10]],
            intercepts: vec![0.0],
        };
        assert!(model.validate().is_err());

        let model = ModelWeights::NearestCentroid {
            classes: Vec::new(),
            centroids: Vec::new(),
        };
        assert!(model.validate().is_err());
    }
}
