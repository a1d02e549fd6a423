// SPDX-License-Identifier: MIT

//!
//! Resolve the data behind every marker to a relative magnitude in `[0, 1]`
//!

use crate::{CalendarDate, Dataset, Entity, MetricType};
use log::trace;

/// Markers with data never go below this magnitude (so that they remain
/// visible on the globe)
pub const MAGNITUDE_FLOOR: f64 = 0.01;

/// Countries whose regions are resolved using the country's own series and
/// population instead of the region's.  The regional French data doesn't line
/// up with the national normalisation, so the national figures are used.
const PARENT_SERIES_OVERRIDES: &[&str] = &["FR"];

/// Computes normalised, population adjusted magnitudes from a [`Dataset`]
#[derive(Debug, Clone, Copy)]
pub struct MetricResolver<'a> {
    dataset: &'a Dataset,
}

impl<'a> MetricResolver<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// The entity whose series and population are used for `entity`.  `None`
    /// for regions that should use their country's figures when the country
    /// isn't in the dataset.
    fn series_source<'e>(&self, entity: &'e Entity) -> Option<&'e Entity>
    where
        'a: 'e,
    {
        let id = entity.id();
        if id.is_subregion() && PARENT_SERIES_OVERRIDES.contains(&id.parent()) {
            let parent = self.dataset.entity_by_str(id.parent());
            if parent.is_none() {
                trace!("{id} has no {} to take figures from", id.parent());
            }
            return parent;
        }
        Some(entity)
    }

    /// The per-person rate, with `None` for entities without a population
    fn rate(&self, entity: &Entity, date: CalendarDate, metric: MetricType) -> Option<f64> {
        match self.series_source(entity) {
            Some(source) => source.rate_at(metric, date),
            None => Some(0.0),
        }
    }

    /// The count of `metric` per person on (or clamped to) `date`.  Zero for
    /// entities without a population.
    pub fn raw_rate(&self, entity: &Entity, date: CalendarDate, metric: MetricType) -> f64 {
        self.rate(entity, date, metric).unwrap_or(0.0)
    }

    /// The relative magnitude of `metric` for `entity` on `date`.
    ///
    /// The per-person rate is placed between the dataset's minimum and maximum
    /// per-person rates, then floored at [`MAGNITUDE_FLOOR`] and capped at `1`.
    /// Entities without a population resolve to exactly `0`.
    pub fn resolve_magnitude(
        &self,
        entity: &Entity,
        date: CalendarDate,
        metric: MetricType,
    ) -> f64 {
        let Some(rate) = self.rate(entity, date, metric) else {
            return 0.0;
        };

        let bounds = self.dataset.rate_bounds();
        let span = bounds.span(metric);
        let relative = if span > 0.0 {
            (rate - bounds.min(metric)) / span
        } else {
            0.0
        };
        if relative.is_nan() {
            return MAGNITUDE_FLOOR;
        }
        relative.clamp(MAGNITUDE_FLOOR, 1.0)
    }

    /// The magnitude of every marker, in marker ID order
    pub fn resolve_all(&self, date: CalendarDate, metric: MetricType) -> Vec<f64> {
        trace!("resolving all markers for {date} ({metric})");
        let per_entity: Vec<f64> = self
            .dataset
            .entities()
            .iter()
            .map(|entity| self.resolve_magnitude(entity, date, metric))
            .collect();

        self.dataset
            .markers()
            .map(|(entity, _)| per_entity[entity])
            .collect()
    }
}
