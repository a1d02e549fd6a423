// SPDX-License-Identifier: MIT

//!
//! The epiglobe entity type (a country or a region of a country)
//!

use crate::{CalendarDate, CalendarError, CalendarRange, MetricType, PerMetric, format_count};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can arise in relation to an [`Entity`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    /// The entity's local dates are invalid
    #[error("entity `{0}` has invalid dates: {1}")]
    Dates(EntityId, CalendarError),

    /// The longitude and latitude lists differ in length
    #[error("entity `{id}` has {longitudes} longitudes but {latitudes} latitudes")]
    CoordinateMismatch {
        id: EntityId,
        longitudes: usize,
        latitudes: usize,
    },
}

/// The identifier of an entity: an ISO-like country code, optionally followed
/// by a `-` and a region code (e.g. `FR`, `FR-IDF`)
#[rustfmt::skip]
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(derive_more::Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The country part of the ID (`FR` for both `FR` and `FR-IDF`)
    pub fn parent(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// Whether the ID names a region within a country
    pub fn is_subregion(&self) -> bool {
        self.parent().len() < self.0.len()
    }
}

/// A point on the globe's surface, in degrees
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// A country or region along with its daily counts
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// The entity's ID
    id: EntityId,

    /// Country name
    name: String,

    /// Region name (for entities that are regions of a country)
    state: Option<String>,

    /// Always positive when set.  Non-positive values in the data are dropped
    population: Option<u64>,

    /// The days for which the entity has data
    local_range: CalendarRange,

    /// Daily counts, indexed by the day offset within `local_range`
    series: PerMetric<crate::Series>,

    /// URL of the country's flag
    flag: Option<String>,

    /// Where the entity's markers go
    coordinates: Vec<GeoPoint>,
}

/// The information shown on an entity's card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDetails {
    pub name: String,
    pub state: Option<String>,
    pub flag: Option<String>,
    pub metric: MetricType,
    pub count: String,
    pub population: Option<String>,
}

impl Entity {
    /// Create a valid [`Entity`] if it is possible to do so with the values
    /// passed in
    #[allow(clippy::too_many_arguments)]
    pub fn from(
        id: EntityId,
        name: String,
        state: Option<String>,
        population: Option<i64>,
        local_start: CalendarDate,
        local_end: CalendarDate,
        series: PerMetric<crate::Series>,
        flag: Option<String>,
        longitudes: Vec<f64>,
        latitudes: Vec<f64>,
    ) -> Result<Self, EntityError> {
        let local_range = CalendarRange::build(local_start, local_end)
            .map_err(|error| EntityError::Dates(id.clone(), error))?;

        if longitudes.len() != latitudes.len() {
            return Err(EntityError::CoordinateMismatch {
                id,
                longitudes: longitudes.len(),
                latitudes: latitudes.len(),
            });
        }
        let coordinates = longitudes
            .into_iter()
            .zip(latitudes)
            .map(|(longitude, latitude)| GeoPoint {
                longitude,
                latitude,
            })
            .collect();

        Ok(Self {
            id,
            name,
            state,
            population: population.filter(|p| *p > 0).map(|p| p as u64),
            local_range,
            series,
            flag,
            coordinates,
        })
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn population(&self) -> Option<u64> {
        self.population
    }

    pub fn flag(&self) -> Option<&str> {
        self.flag.as_deref()
    }

    pub fn local_range(&self) -> &CalendarRange {
        &self.local_range
    }

    pub fn series(&self) -> &PerMetric<crate::Series> {
        &self.series
    }

    pub fn coordinates(&self) -> &[GeoPoint] {
        &self.coordinates
    }

    /// The day offset within the entity's own data that `date` resolves to.
    /// Dates before the entity's first day resolve to its first day and dates
    /// after its last day resolve to its last day.
    pub fn local_offset(&self, date: CalendarDate) -> usize {
        self.local_range.resolve_index(date, None)
    }

    /// The count of `metric` on (or clamped to) `date`
    pub fn value_at(&self, metric: MetricType, date: CalendarDate) -> f64 {
        self.series.value_at(metric, self.local_offset(date))
    }

    /// The count of `metric` per person on (or clamped to) `date`, or `None`
    /// if the entity has no population
    pub fn rate_at(&self, metric: MetricType, date: CalendarDate) -> Option<f64> {
        let population = self.population? as f64;
        Some(self.value_at(metric, date) / population)
    }

    /// The information for the entity's card
    pub fn details(&self, metric: MetricType, date: CalendarDate) -> EntityDetails {
        EntityDetails {
            name: self.name.clone(),
            state: self.state.clone(),
            flag: self.flag.clone(),
            metric,
            count: format_count(self.value_at(metric, date)),
            population: self.population.map(|p| format_count(p as f64)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Series;

    fn date(text: &str) -> CalendarDate {
        CalendarDate::parse(text).unwrap()
    }

    fn series(cases: Vec<f64>) -> PerMetric<Series> {
        PerMetric {
            cases: Series::from(cases),
            ..Default::default()
        }
    }

    fn entity(population: Option<i64>) -> Entity {
        Entity::from(
            EntityId::new("XX"),
            String::from("Example"),
            None,
            population,
            date("2020-01-03"),
            date("2020-01-05"),
            series(vec![10.0, 20.0, 30.0]),
            None,
            vec![1.0, 2.0],
            vec![3.0, 4.0],
        )
        .unwrap()
    }

    #[test]
    fn ids() {
        let country = EntityId::new("FR");
        let region = EntityId::new("FR-IDF");
        assert_eq!(country.parent(), "FR");
        assert_eq!(region.parent(), "FR");
        assert!(!country.is_subregion());
        assert!(region.is_subregion());
    }

    #[test]
    fn from_validates() {
        // Reversed dates
        let reversed = Entity::from(
            EntityId::new("XX"),
            String::new(),
            None,
            None,
            date("2020-01-05"),
            date("2020-01-03"),
            PerMetric::default(),
            None,
            vec![],
            vec![],
        );
        assert!(matches!(reversed, Err(EntityError::Dates(..))));

        // Coordinate lists of different lengths
        let mismatched = Entity::from(
            EntityId::new("XX"),
            String::new(),
            None,
            None,
            date("2020-01-03"),
            date("2020-01-05"),
            PerMetric::default(),
            None,
            vec![1.0, 2.0],
            vec![1.0],
        );
        assert!(matches!(
            mismatched,
            Err(EntityError::CoordinateMismatch { .. })
        ));

        // Should be ok
        let entity = entity(Some(100));
        assert_eq!(entity.coordinates().len(), 2);
        assert_eq!(
            entity.coordinates()[1],
            GeoPoint {
                longitude: 2.0,
                latitude: 4.0
            }
        );
    }

    #[test]
    fn values_clamp_to_local_range() {
        let entity = entity(Some(100));
        assert_eq!(entity.value_at(MetricType::Cases, date("2020-01-01")), 10.0);
        assert_eq!(entity.value_at(MetricType::Cases, date("2020-01-03")), 10.0);
        assert_eq!(entity.value_at(MetricType::Cases, date("2020-01-04")), 20.0);
        assert_eq!(entity.value_at(MetricType::Cases, date("2020-02-01")), 30.0);
        assert_eq!(entity.value_at(MetricType::Deaths, date("2020-01-04")), 0.0);
        assert_eq!(entity.local_offset(date("2021-01-01")), 2);
    }

    #[test]
    fn non_positive_population_is_dropped() {
        assert_eq!(entity(Some(0)).population(), None);
        assert_eq!(entity(Some(-5)).population(), None);
        assert_eq!(entity(Some(0)).rate_at(MetricType::Cases, date("2020-01-03")), None);
        assert_eq!(
            entity(Some(100)).rate_at(MetricType::Cases, date("2020-01-04")),
            Some(0.2)
        );
    }

    #[test]
    fn details_are_formatted() {
        let mut entity = entity(Some(1_234_567));
        entity.series.cases = Series::from(vec![0.0, 0.0, 31_470_367.0]);
        let details = entity.details(MetricType::Cases, date("2020-01-05"));
        assert_eq!(details.count, "31,470,367");
        assert_eq!(details.population.as_deref(), Some("1,234,567"));
    }
}
