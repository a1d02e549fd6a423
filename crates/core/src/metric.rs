// SPDX-License-Identifier: MIT

//!
//! Metric types and per-metric records
//!

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can arise in relation to a [`MetricType`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    #[error("`{0}` is not a metric (expected cases, active, deaths or recovered)")]
    UnknownName(String),

    #[error("metric index `{0}` is out of range (0-3)")]
    IndexOutOfRange(usize),
}

/// The case categories tracked for every entity
#[rustfmt::skip]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(derive_more::Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    #[default]
    Cases,
    Active,
    Deaths,
    Recovered,
}

impl MetricType {
    /// Every metric, in positional order
    pub const ALL: [MetricType; 4] = [Self::Cases, Self::Active, Self::Deaths, Self::Recovered];

    /// The metric's position in positional (array based) data
    pub fn index(&self) -> usize {
        match self {
            Self::Cases => 0,
            Self::Active => 1,
            Self::Deaths => 2,
            Self::Recovered => 3,
        }
    }
}

impl TryFrom<usize> for MetricType {
    type Error = MetricError;
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value)
            .copied()
            .ok_or(MetricError::IndexOutOfRange(value))
    }
}

impl FromStr for MetricType {
    type Err = MetricError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_ascii_lowercase().as_str() {
            "cases" => Ok(Self::Cases),
            "active" => Ok(Self::Active),
            "deaths" => Ok(Self::Deaths),
            "recovered" => Ok(Self::Recovered),
            _ => Err(MetricError::UnknownName(text.to_string())),
        }
    }
}

/// One value per [`MetricType`].  Metrics missing from the data read as the
/// default (zero, or an empty series).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerMetric<T> {
    #[serde(default)]
    pub cases: T,
    #[serde(default)]
    pub active: T,
    #[serde(default)]
    pub deaths: T,
    #[serde(default)]
    pub recovered: T,
}

impl<T> PerMetric<T> {
    /// The value for `metric`
    pub fn get(&self, metric: MetricType) -> &T {
        match metric {
            MetricType::Cases => &self.cases,
            MetricType::Active => &self.active,
            MetricType::Deaths => &self.deaths,
            MetricType::Recovered => &self.recovered,
        }
    }

    /// Apply `f` to every value
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> PerMetric<U> {
        PerMetric {
            cases: f(&self.cases),
            active: f(&self.active),
            deaths: f(&self.deaths),
            recovered: f(&self.recovered),
        }
    }
}

/// A daily series of counts.  Gaps (`null` in the dataset) and days beyond the
/// end of the series read as zero, and a `null` series is empty.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series(Vec<f64>);

impl Series {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The count at `offset` (zero if missing)
    pub fn value_at(&self, offset: usize) -> f64 {
        self.0.get(offset).copied().unwrap_or(0.0)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Vec<Option<f64>>>::deserialize(deserializer)?;
        Ok(Series(
            raw.unwrap_or_default()
                .into_iter()
                .map(|value| value.filter(|v| v.is_finite()).unwrap_or(0.0))
                .collect(),
        ))
    }
}

impl PerMetric<Series> {
    /// The count of `metric` at day `offset` (zero if missing)
    pub fn value_at(&self, metric: MetricType, offset: usize) -> f64 {
        self.get(metric).value_at(offset)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn positional_order() {
        for (index, metric) in MetricType::ALL.iter().enumerate() {
            assert_eq!(metric.index(), index);
            assert_eq!(MetricType::try_from(index).unwrap(), *metric);
        }
        assert!(MetricType::try_from(4).is_err());
    }

    #[test]
    fn names() {
        assert_eq!("Deaths".parse::<MetricType>().unwrap(), MetricType::Deaths);
        assert_eq!(" active ".parse::<MetricType>().unwrap(), MetricType::Active);
        assert!("hospitalised".parse::<MetricType>().is_err());
        assert_eq!(MetricType::Recovered.to_string(), "Recovered");
    }

    #[test]
    fn series_reads_gaps_as_zero() {
        let series: Series = serde_json::from_str("[1.0, null, 3]").unwrap();
        assert_eq!(series.values(), &[1.0, 0.0, 3.0]);
        assert_eq!(series.value_at(1), 0.0);
        assert_eq!(series.value_at(2), 3.0);
        assert_eq!(series.value_at(100), 0.0);
    }

    #[test]
    fn missing_metrics_read_as_empty() {
        let counts: PerMetric<Series> =
            serde_json::from_str(r#"{ "cases": [1, 2], "deaths": null }"#).unwrap();
        assert_eq!(counts.cases.values(), &[1.0, 2.0]);
        assert!(counts.active.is_empty());
        assert!(counts.deaths.is_empty());
        assert_eq!(counts.value_at(MetricType::Recovered, 1), 0.0);
    }

    #[test]
    fn per_metric_lookup() {
        let counts = PerMetric {
            cases: 4,
            active: 3,
            deaths: 2,
            recovered: 1,
        };
        assert_eq!(*counts.get(MetricType::Deaths), 2);
        assert_eq!(counts.map(|value| value * 10).recovered, 10);
    }
}
