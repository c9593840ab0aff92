//! Feature Contribution Ranking

use crate::model::LogisticModel;
use crate::PredictionError;
use feature_engine::{EncodedVector, FeatureSchema, SchemaError};
use serde::{Deserialize, Serialize};

/// Signed push of one feature on the churn score for a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Schema column name
    pub feature: String,
    /// `weight * value`, positive pushes toward churn
    pub contribution: f64,
    /// Encoded value of the feature
    pub value: f64,
}

/// Global weight of a feature in the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub coefficient: f64,
    /// Absolute coefficient
    pub importance: f64,
}

/// Rank the features of one encoded vector by absolute contribution
///
/// Features whose encoded value is exactly zero are excluded. Equal
/// magnitudes keep schema order, so the ranking is deterministic.
pub fn rank_contributions(
    schema: &FeatureSchema,
    weights: &[f64],
    features: &EncodedVector,
    top_k: usize,
) -> Result<Vec<Contribution>, PredictionError> {
    if weights.len() != schema.len() || features.len() != schema.len() {
        return Err(SchemaError::LengthMismatch {
            expected: schema.len(),
            actual: if weights.len() != schema.len() {
                weights.len()
            } else {
                features.len()
            },
        }
        .into());
    }

    let mut ranked: Vec<Contribution> = features
        .named(schema)
        .zip(weights)
        .filter(|((_, value), _)| *value != 0.0)
        .map(|((feature, value), weight)| Contribution {
            feature: feature.to_string(),
            contribution: weight * value,
            value,
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    ranked.truncate(top_k);
    Ok(ranked)
}

/// Features with the largest absolute coefficients
pub fn global_importance(
    schema: &FeatureSchema,
    model: &LogisticModel,
    top_k: usize,
) -> Vec<FeatureImportance> {
    let mut importance: Vec<FeatureImportance> = schema
        .columns()
        .iter()
        .zip(model.weights())
        .map(|(feature, coefficient)| FeatureImportance {
            feature: feature.clone(),
            coefficient: *coefficient,
            importance: coefficient.abs(),
        })
        .collect();

    importance.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    importance.truncate(top_k);
    importance
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::ScalingParams;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn schema() -> FeatureSchema {
        let columns = [
            "tenure",
            "MonthlyCharges",
            "NumInternetServices",
            "Partner_Yes",
            "Contract_One year",
            "Contract_Two year",
            "PaperlessBilling_Yes",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        let scaling = ["tenure", "MonthlyCharges", "NumInternetServices"]
            .iter()
            .map(|c| (c.to_string(), ScalingParams { mean: 0.0, std: 1.0 }))
            .collect::<BTreeMap<_, _>>();
        FeatureSchema::new(columns, scaling).unwrap()
    }

    #[test]
    fn test_excludes_zero_values_and_sorts_by_magnitude() {
        let schema = schema();
        let weights = [-0.7, 0.45, -0.12, 0.9, -0.69, -1.38, 0.35];
        let x = EncodedVector::from_values(vec![-0.8, 0.01, -1.1, 0.0, 0.0, 1.0, 1.0]);

        let ranked = rank_contributions(&schema, &weights, &x, 10).unwrap();
        let names: Vec<_> = ranked.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Contract_Two year",
                "tenure",
                "PaperlessBilling_Yes",
                "NumInternetServices",
                "MonthlyCharges",
            ]
        );
        assert_eq!(ranked[0].contribution, -1.38);
        assert_eq!(ranked[0].value, 1.0);
        // Partner_Yes has the largest weight but is unset
        assert!(ranked.iter().all(|c| c.feature != "Partner_Yes"));
    }

    #[test]
    fn test_ties_keep_schema_order() {
        let schema = schema();
        let weights = [0.5, -0.5, 0.5, 0.0, 0.0, 0.0, -0.5];
        let x = EncodedVector::from_values(vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

        let ranked = rank_contributions(&schema, &weights, &x, 10).unwrap();
        let names: Vec<_> = ranked.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(
            names,
            vec!["tenure", "MonthlyCharges", "NumInternetServices", "PaperlessBilling_Yes"]
        );
    }

    #[test]
    fn test_zero_weight_with_nonzero_value_is_kept() {
        let schema = schema();
        let weights = [0.0; 7];
        let x = EncodedVector::from_values(vec![0.3, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        let ranked = rank_contributions(&schema, &weights, &x, 10).unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|c| c.contribution == 0.0));
    }

    #[test]
    fn test_top_k_truncates() {
        let schema = schema();
        let weights = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let x = EncodedVector::from_values(vec![1.0; 7]);
        let ranked = rank_contributions(&schema, &weights, &x, 3).unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].feature, "PaperlessBilling_Yes");
    }

    #[test]
    fn test_length_mismatch() {
        let schema = schema();
        let x = EncodedVector::from_values(vec![1.0; 7]);
        assert!(matches!(
            rank_contributions(&schema, &[1.0; 6], &x, 10),
            Err(PredictionError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_global_importance_by_absolute_coefficient() {
        let schema = schema();
        let model = LogisticModel::new(vec![-0.7, 0.45, -0.12, 0.02, -0.69, -1.38, 0.35], 0.0).unwrap();
        let top = global_importance(&schema, &model, 3);
        let names: Vec<_> = top.iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(names, vec!["Contract_Two year", "tenure", "Contract_One year"]);
        assert_eq!(top[0].coefficient, -1.38);
        assert_eq!(top[0].importance, 1.38);
    }

    proptest! {
        #[test]
        fn prop_ranking_sorted_and_nonzero(
            weights in proptest::collection::vec(-3.0f64..3.0, 7),
            values in proptest::collection::vec(prop_oneof![Just(0.0), Just(1.0), -3.0f64..3.0], 7),
            top_k in 0usize..12,
        ) {
            let schema = schema();
            let x = EncodedVector::from_values(values.clone());
            let ranked = rank_contributions(&schema, &weights, &x, top_k).unwrap();

            prop_assert!(ranked.len() <= top_k);
            prop_assert!(ranked.len() <= values.iter().filter(|v| **v != 0.0).count());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].contribution.abs() >= pair[1].contribution.abs());
            }
            for c in &ranked {
                prop_assert!(c.value != 0.0);
            }
        }
    }
}
