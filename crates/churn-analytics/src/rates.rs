//! Churn Rates per Segment

use crate::dataset::{ColumnData, Dataset};
use crate::AnalyticsError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Tenure bands in months, upper bound inclusive
pub const TENURE_BANDS: [(&str, f64, f64); 4] = [
    ("0-12", 0.0, 12.0),
    ("13-24", 12.0, 24.0),
    ("25-48", 24.0, 48.0),
    ("49-72", 48.0, 72.0),
];

/// Band label for a tenure, `None` outside (0, 72]
pub fn tenure_band(tenure: f64) -> Option<&'static str> {
    TENURE_BANDS
        .iter()
        .find(|(_, low, high)| tenure > *low && tenure <= *high)
        .map(|(label, _, _)| *label)
}

/// Churn rate of the customers sharing one value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnRate {
    pub value: String,
    pub customers: usize,
    pub churned: usize,
    /// churned / customers
    pub churn_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChurnCounts {
    pub retained: usize,
    pub churned: usize,
}

impl ChurnCounts {
    fn add(&mut self, churned: bool) {
        if churned {
            self.churned += 1;
        } else {
            self.retained += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.retained + self.churned
    }

    fn into_rate(self, value: String) -> ChurnRate {
        ChurnRate {
            value,
            customers: self.total(),
            churned: self.churned,
            churn_rate: self.churned as f64 / self.total() as f64,
        }
    }
}

/// Customers matching a value against everyone else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChurnSplit {
    pub selected: ChurnCounts,
    pub others: ChurnCounts,
}

/// Share of customers using each service within one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceUsage {
    pub group: String,
    pub customers: usize,
    /// (service, share of "Yes") in the requested order
    pub usage: Vec<(String, f64)>,
}

impl Dataset {
    /// Churn rate for each distinct value of `column`
    ///
    /// Categorical values are sorted lexicographically, numeric values
    /// numerically.
    pub fn churn_rate_by(&self, column: &str) -> Result<Vec<ChurnRate>, AnalyticsError> {
        let churned = self.churned();
        match &self.column(column)?.data {
            ColumnData::Categorical(values) => {
                let mut groups: BTreeMap<&str, ChurnCounts> = BTreeMap::new();
                for (value, churned) in values.iter().zip(churned) {
                    groups.entry(value.as_str()).or_default().add(*churned);
                }
                Ok(groups
                    .into_iter()
                    .map(|(value, counts)| counts.into_rate(value.to_string()))
                    .collect())
            }
            ColumnData::Numeric(values) => {
                let mut rows: Vec<(f64, bool)> = values
                    .iter()
                    .zip(churned)
                    .filter(|(value, _)| !value.is_nan())
                    .map(|(value, churned)| (*value, *churned))
                    .collect();
                rows.sort_by(|a, b| a.0.total_cmp(&b.0));

                // Equal values are adjacent once sorted
                let mut groups: Vec<(f64, ChurnCounts)> = Vec::new();
                for (value, churned) in rows {
                    match groups.last_mut() {
                        Some((last, counts)) if *last == value => counts.add(churned),
                        _ => {
                            let mut counts = ChurnCounts::default();
                            counts.add(churned);
                            groups.push((value, counts));
                        }
                    }
                }
                Ok(groups
                    .into_iter()
                    .map(|(value, counts)| counts.into_rate(format!("{}", value)))
                    .collect())
            }
        }
    }

    /// Churn rate per tenure band, in band order
    pub fn churn_rate_by_tenure_band(&self) -> Result<Vec<ChurnRate>, AnalyticsError> {
        let tenure = self.numeric("tenure")?;
        let mut bands = [ChurnCounts::default(); TENURE_BANDS.len()];
        for (value, churned) in tenure.iter().zip(self.churned()) {
            if let Some(index) = tenure_band(*value)
                .and_then(|band| TENURE_BANDS.iter().position(|(label, _, _)| *label == band))
            {
                bands[index].add(*churned);
            }
        }
        Ok(TENURE_BANDS
            .iter()
            .zip(bands)
            .filter(|(_, counts)| counts.total() > 0)
            .map(|((label, _, _), counts)| counts.into_rate(label.to_string()))
            .collect())
    }

    /// Retained/churned counts for `column == value` and for the rest
    pub fn churn_split(&self, column: &str, value: &str) -> Result<ChurnSplit, AnalyticsError> {
        let column = self.column(column)?;
        let mut split = ChurnSplit {
            selected: ChurnCounts::default(),
            others: ChurnCounts::default(),
        };
        for (row, churned) in self.churned().iter().enumerate() {
            if column.label(row) == value {
                split.selected.add(*churned);
            } else {
                split.others.add(*churned);
            }
        }
        Ok(split)
    }

    /// Share of "Yes" for each of `services` within each group of `group_column`
    pub fn service_usage_by(
        &self,
        group_column: &str,
        services: &[&str],
    ) -> Result<Vec<ServiceUsage>, AnalyticsError> {
        let group = self.column(group_column)?;
        let service_values = services
            .iter()
            .map(|service| self.categorical(service))
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for row in 0..self.len() {
            groups.entry(group.label(row)).or_default().push(row);
        }

        Ok(groups
            .into_iter()
            .map(|(label, rows)| {
                let usage = services
                    .iter()
                    .zip(&service_values)
                    .map(|(service, values)| {
                        let using = rows.iter().filter(|&&row| values[row] == "Yes").count();
                        (service.to_string(), using as f64 / rows.len() as f64)
                    })
                    .collect();
                ServiceUsage {
                    group: label,
                    customers: rows.len(),
                    usage,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample;
    use crate::dataset::{Column, CHURN_COLUMN};
    use proptest::prelude::*;

    #[test]
    fn test_tenure_band_edges() {
        assert_eq!(tenure_band(0.0), None);
        assert_eq!(tenure_band(1.0), Some("0-12"));
        assert_eq!(tenure_band(12.0), Some("0-12"));
        assert_eq!(tenure_band(13.0), Some("13-24"));
        assert_eq!(tenure_band(48.0), Some("25-48"));
        assert_eq!(tenure_band(72.0), Some("49-72"));
        assert_eq!(tenure_band(73.0), None);
    }

    #[test]
    fn test_churn_rate_by_contract() {
        let rates = sample().churn_rate_by("Contract").unwrap();
        let values: Vec<_> = rates.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["Month-to-month", "One year", "Two year"]);

        assert_eq!(rates[0].customers, 6);
        assert_eq!(rates[0].churned, 3);
        assert!((rates[0].churn_rate - 0.5).abs() < 1e-12);
        assert_eq!(rates[2].churned, 0);
    }

    #[test]
    fn test_churn_rate_by_numeric_sorted_numerically() {
        let rates = sample().churn_rate_by("NumInternetServices").unwrap();
        let values: Vec<_> = rates.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["0", "1", "2", "3", "4"]);
        assert_eq!(rates.iter().map(|r| r.customers).sum::<usize>(), 10);
    }

    #[test]
    fn test_churn_rate_by_numeric_many_values() {
        let values: Vec<f64> = (0..2000).map(|i| f64::from(i % 500) - 250.0).collect();
        let mut with_gap = values.clone();
        with_gap.push(f64::NAN);
        let churn: Vec<String> = (0..with_gap.len())
            .map(|i| if i % 2 == 0 { "Yes" } else { "No" }.to_string())
            .collect();
        let dataset = Dataset::from_columns(vec![
            Column {
                name: "score".to_string(),
                data: ColumnData::Numeric(with_gap),
            },
            Column {
                name: CHURN_COLUMN.to_string(),
                data: ColumnData::Categorical(churn),
            },
        ])
        .unwrap();

        let rates = dataset.churn_rate_by("score").unwrap();
        assert_eq!(rates.len(), 500);
        assert_eq!(rates[0].value, "-250");
        assert_eq!(rates[499].value, "249");
        assert!(rates.iter().all(|r| r.customers == 4));
        assert_eq!(rates.iter().map(|r| r.customers).sum::<usize>(), values.len());
    }

    #[test]
    fn test_churn_rate_by_tenure_band() {
        let rates = sample().churn_rate_by_tenure_band().unwrap();
        assert_eq!(rates[0].value, "0-12");
        assert_eq!(rates[0].customers, 4);
        assert_eq!(rates[0].churned, 3);
    }

    #[test]
    fn test_churn_split() {
        let split = sample().churn_split("Contract", "Month-to-month").unwrap();
        assert_eq!(split.selected, ChurnCounts { retained: 3, churned: 3 });
        assert_eq!(split.others, ChurnCounts { retained: 4, churned: 0 });

        let numeric = sample().churn_split("NumInternetServices", "3").unwrap();
        assert_eq!(numeric.selected.total(), 3);
    }

    #[test]
    fn test_service_usage_by_senior_status() {
        let usage = sample()
            .service_usage_by("SeniorCitizen", &["StreamingTV", "OnlineSecurity"])
            .unwrap();
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].group, "No");
        assert_eq!(usage[0].customers, 7);
        assert_eq!(usage[1].group, "Yes");
        assert_eq!(usage[1].usage[0], ("StreamingTV".to_string(), 2.0 / 3.0));
        assert_eq!(usage[1].usage[1].1, 0.0);
    }

    #[test]
    fn test_unknown_column() {
        assert!(matches!(
            sample().churn_rate_by("Gender"),
            Err(AnalyticsError::MissingColumn(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_tenure_band_covers_form_range(tenure in 1u32..=72) {
            prop_assert!(tenure_band(tenure as f64).is_some());
        }
    }
}
