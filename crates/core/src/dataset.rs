// SPDX-License-Identifier: MIT

//!
//! The dataset document: global dates and totals, per-metric bounds, and every
//! entity with its series and marker coordinates
//!

use crate::{
    CalendarDate, CalendarError, CalendarRange, Entity, EntityError, EntityId, GeoPoint,
    MetricType, PerMetric, Series,
};
use log::{debug, info};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors that can arise when loading a [`Dataset`]
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset has invalid global dates: {0}")]
    Dates(#[from] CalendarError),

    #[error(transparent)]
    Entity(#[from] EntityError),
}

/// Minimum and maximum of every metric
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct MetricBounds {
    pub min: PerMetric<f64>,
    pub max: PerMetric<f64>,
}

impl MetricBounds {
    pub fn min(&self, metric: MetricType) -> f64 {
        *self.min.get(metric)
    }

    /// `max - min` for `metric`
    pub fn span(&self, metric: MetricType) -> f64 {
        self.max.get(metric) - self.min.get(metric)
    }
}

/// The dataset as it appears on the wire
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    total_start_date: CalendarDate,
    total_end_date: CalendarDate,
    #[serde(default)]
    total_series: PerMetric<Series>,
    #[serde(default)]
    min: PerMetric<f64>,
    #[serde(default)]
    max: PerMetric<f64>,
    min_per_person: PerMetric<f64>,
    max_per_person: PerMetric<f64>,
    #[serde(default)]
    min_per_area: Option<PerMetric<f64>>,
    #[serde(default)]
    max_per_area: Option<PerMetric<f64>>,
    #[serde(default)]
    entities: BTreeMap<String, RawEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntity {
    #[serde(default)]
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    population: Option<i64>,
    #[serde(default)]
    start_date: Option<CalendarDate>,
    #[serde(default)]
    end_date: Option<CalendarDate>,
    #[serde(default)]
    series: Option<PerMetric<Series>>,
    #[serde(default)]
    flag: Option<String>,
    #[serde(default)]
    longitudes: Vec<f64>,
    #[serde(default)]
    latitudes: Vec<f64>,
}

/// Everything the globe shows.  Read-only once loaded.
#[derive(Debug, Clone)]
pub struct Dataset {
    range: CalendarRange,
    totals: PerMetric<Series>,
    raw_bounds: MetricBounds,
    rate_bounds: MetricBounds,
    area_bounds: Option<MetricBounds>,

    /// Ordered by ID
    entities: Vec<Entity>,

    /// Maps an ID to its position in `entities`
    lookup: HashMap<EntityId, usize>,

    /// `markers[n]` is the entity index owning marker `n`
    markers: Vec<usize>,
}

impl Dataset {
    /// Load and validate a dataset from its JSON text
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let raw: RawDataset = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Load and validate a dataset from a JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, DatasetError> {
        let raw: RawDataset = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawDataset) -> Result<Self, DatasetError> {
        let range = CalendarRange::build(raw.total_start_date, raw.total_end_date)?;

        let entities = raw
            .entities
            .into_iter()
            .map(|(id, entity)| {
                Entity::from(
                    EntityId::new(id),
                    entity.name,
                    entity.state,
                    entity.population,
                    entity.start_date.unwrap_or(range.start()),
                    entity.end_date.unwrap_or(range.end()),
                    entity.series.unwrap_or_default(),
                    entity.flag,
                    entity.longitudes,
                    entity.latitudes,
                )
            })
            .collect::<Result<Vec<Entity>, EntityError>>()?;

        let lookup = entities
            .iter()
            .enumerate()
            .map(|(index, entity)| (entity.id().clone(), index))
            .collect();

        let markers = entities
            .iter()
            .enumerate()
            .flat_map(|(index, entity)| std::iter::repeat_n(index, entity.coordinates().len()))
            .collect::<Vec<usize>>();

        let area_bounds = match (raw.min_per_area, raw.max_per_area) {
            (Some(min), Some(max)) => Some(MetricBounds { min, max }),
            _ => None,
        };

        info!(
            "Dataset loaded: {} to {} ({} days), {} entities, {} markers",
            range.start(),
            range.end(),
            range.len(),
            entities.len(),
            markers.len()
        );

        Ok(Self {
            range,
            totals: raw.total_series,
            raw_bounds: MetricBounds {
                min: raw.min,
                max: raw.max,
            },
            rate_bounds: MetricBounds {
                min: raw.min_per_person,
                max: raw.max_per_person,
            },
            area_bounds,
            entities,
            lookup,
            markers,
        })
    }

    /// The global range of days
    pub fn range(&self) -> &CalendarRange {
        &self.range
    }

    /// The last day with data
    pub fn latest_date(&self) -> CalendarDate {
        self.range.end()
    }

    /// Bounds of the raw counts
    pub fn raw_bounds(&self) -> &MetricBounds {
        &self.raw_bounds
    }

    /// Bounds of the per-person rates
    pub fn rate_bounds(&self) -> &MetricBounds {
        &self.rate_bounds
    }

    /// Bounds of the per-area rates (not every dataset has them)
    pub fn area_bounds(&self) -> Option<&MetricBounds> {
        self.area_bounds.as_ref()
    }

    /// The worldwide daily totals
    pub fn totals(&self) -> &PerMetric<Series> {
        &self.totals
    }

    /// The worldwide total of `metric` on (or clamped to) `date`
    pub fn total_at(&self, metric: MetricType, date: CalendarDate) -> f64 {
        self.totals
            .value_at(metric, self.range.resolve_index(date, None))
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.lookup.get(id).map(|index| &self.entities[*index])
    }

    pub fn entity_by_str(&self, id: &str) -> Option<&Entity> {
        self.entity(&EntityId::new(id))
    }

    /// The total number of markers (coordinate pairs across all entities)
    pub fn total_points(&self) -> usize {
        self.markers.len()
    }

    /// The entity owning marker `marker`
    pub fn marker_entity(&self, marker: usize) -> Option<&Entity> {
        self.markers.get(marker).map(|index| &self.entities[*index])
    }

    /// Every marker in marker ID order, with the index of its entity
    pub fn markers(&self) -> impl Iterator<Item = (usize, GeoPoint)> + '_ {
        self.entities
            .iter()
            .enumerate()
            .flat_map(|(index, entity)| {
                entity
                    .coordinates()
                    .iter()
                    .map(move |point| (index, *point))
            })
    }

    /// Log a short description of the dataset
    pub fn log_summary(&self) {
        for entity in &self.entities {
            debug!(
                "{} ({}): {} to {}, population {:?}, {} markers",
                entity.id(),
                entity.name(),
                entity.local_range().start(),
                entity.local_range().end(),
                entity.population(),
                entity.coordinates().len()
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    /// A small dataset: one country with two regions and a standalone entity
    pub(crate) fn fixture() -> serde_json::Value {
        json!({
            "totalStartDate": "2020-01-01",
            "totalEndDate": "2020-01-05",
            "totalSeries": {
                "cases": [1, 2, 3, 4, 31470367],
                "active": [1, 1, 1, 1, 1],
                "deaths": [0, 0, 0, 1, 2],
                "recovered": [0, 1, 2, 3, 4]
            },
            "min": { "cases": 0, "active": 0, "deaths": 0, "recovered": 0 },
            "max": { "cases": 100, "active": 100, "deaths": 10, "recovered": 50 },
            "minPerPerson": { "cases": 0.0, "active": 0.0, "deaths": 0.0, "recovered": 0.0 },
            "maxPerPerson": { "cases": 1.0, "active": 1.0, "deaths": 0.1, "recovered": 0.5 },
            "entities": {
                "XX": {
                    "name": "Example",
                    "population": 100,
                    "startDate": "2020-01-03",
                    "endDate": "2020-01-05",
                    "series": {
                        "cases": [10, 20, 30],
                        "active": [10, 10, 10],
                        "deaths": [0, 1, 2],
                        "recovered": [0, 9, 18]
                    },
                    "longitudes": [10.0],
                    "latitudes": [20.0]
                },
                "FR": {
                    "name": "France",
                    "population": 1000,
                    "startDate": "2020-01-01",
                    "endDate": "2020-01-05",
                    "series": {
                        "cases": [0, 100, 200, 300, 400],
                        "active": [0, 50, 60, 70, 80],
                        "deaths": [0, 0, 1, 2, 3],
                        "recovered": [0, 50, 140, 230, 320]
                    },
                    "longitudes": [2.0],
                    "latitudes": [46.0]
                },
                "FR-IDF": {
                    "name": "France",
                    "state": "Ile-de-France",
                    "population": 10,
                    "startDate": "2020-01-01",
                    "endDate": "2020-01-05",
                    "series": {
                        "cases": [9, 9, 9, 9, 9],
                        "active": [9, 9, 9, 9, 9],
                        "deaths": [9, 9, 9, 9, 9],
                        "recovered": [9, 9, 9, 9, 9]
                    },
                    "longitudes": [2.35, 2.4],
                    "latitudes": [48.85, 48.9]
                },
                "ZZ": {
                    "name": "Nowhere",
                    "longitudes": [100.0],
                    "latitudes": [-10.0]
                }
            }
        })
    }

    pub(crate) fn fixture_dataset() -> Dataset {
        Dataset::from_value(fixture()).unwrap()
    }
}
