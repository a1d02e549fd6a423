// SPDX-License-Identifier: MIT

//!
//! Chart data: the daily series (per metric) for the world or for an entity,
//! up to a given date
//!

use crate::{CalendarDate, Dataset, EntityId, MetricType, PerMetric, Series};
use serde::Serialize;

/// What the chart shows
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ChartArea {
    /// The worldwide totals
    #[default]
    World,

    /// A single entity
    Entity(EntityId),
}

impl From<&str> for ChartArea {
    /// `"World"` (or nothing) for the world, otherwise an entity ID
    fn from(code: &str) -> Self {
        match code.trim() {
            "" | "World" => ChartArea::World,
            code => ChartArea::Entity(EntityId::new(code)),
        }
    }
}

/// One day on a chart line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: CalendarDate,
    pub value: f64,
}

/// One line on the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLine {
    pub metric: MetricType,
    pub points: Vec<ChartPoint>,
}

/// Everything needed to draw the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSnapshot {
    /// e.g. "World", "France"
    pub heading: String,
    pub area: ChartArea,
    pub date: CalendarDate,
    pub lines: Vec<ChartLine>,
}

impl ChartSnapshot {
    /// Build the chart lines for `area` from the first day of data up to (and
    /// including) `date`.  Unknown entities fall back to the world.
    pub fn build(dataset: &Dataset, area: &ChartArea, date: CalendarDate) -> Self {
        match area {
            ChartArea::Entity(id) => match dataset.entity(id) {
                Some(entity) => {
                    let range = entity.local_range();
                    let last = range.resolve_index(date, None);
                    let dates = range.iter().take(last + 1).map(|(date, _)| date);
                    Self {
                        heading: entity.name().to_string(),
                        area: area.clone(),
                        date,
                        lines: lines(entity.series(), dates),
                    }
                }
                None => {
                    log::warn!("chart requested for unknown entity `{id}`, showing world");
                    Self::build(dataset, &ChartArea::World, date)
                }
            },
            ChartArea::World => {
                let range = dataset.range();
                let last = range.resolve_index(date, None);
                let dates = range.iter().take(last + 1).map(|(date, _)| date);
                Self {
                    heading: String::from("World"),
                    area: ChartArea::World,
                    date,
                    lines: lines(dataset.totals(), dates),
                }
            }
        }
    }

    /// The line for `metric`
    pub fn line(&self, metric: MetricType) -> Option<&ChartLine> {
        self.lines.iter().find(|line| line.metric == metric)
    }
}

/// One line per metric over `dates` (which start at offset `0` of `series`).
/// Active cases are derived as `cases - recovered` (never negative).
fn lines(series: &PerMetric<Series>, dates: impl Iterator<Item = CalendarDate>) -> Vec<ChartLine> {
    let mut lines: Vec<ChartLine> = MetricType::ALL
        .iter()
        .map(|metric| ChartLine {
            metric: *metric,
            points: Vec::new(),
        })
        .collect();

    for (offset, date) in dates.enumerate() {
        let cases = series.value_at(MetricType::Cases, offset);
        let recovered = series.value_at(MetricType::Recovered, offset);
        for line in lines.iter_mut() {
            let value = match line.metric {
                MetricType::Active => (cases - recovered).max(0.0),
                metric => series.value_at(metric, offset),
            };
            line.points.push(ChartPoint { date, value });
        }
    }
    lines
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dataset::fixtures::fixture_dataset;

    fn date(text: &str) -> CalendarDate {
        CalendarDate::parse(text).unwrap()
    }

    fn values(snapshot: &ChartSnapshot, metric: MetricType) -> Vec<f64> {
        snapshot
            .line(metric)
            .unwrap()
            .points
            .iter()
            .map(|point| point.value)
            .collect()
    }

    #[test]
    fn world_lines_stop_at_date() {
        let dataset = fixture_dataset();
        let snapshot = ChartSnapshot::build(&dataset, &ChartArea::World, date("2020-01-03"));
        assert_eq!(snapshot.heading, "World");
        assert_eq!(snapshot.lines.len(), 4);
        assert_eq!(values(&snapshot, MetricType::Cases), vec![1.0, 2.0, 3.0]);
        assert_eq!(values(&snapshot, MetricType::Deaths), vec![0.0, 0.0, 0.0]);
        let last = snapshot.line(MetricType::Cases).unwrap().points.last().unwrap();
        assert_eq!(last.date, date("2020-01-03"));
    }

    #[test]
    fn entity_lines_use_local_dates() {
        let dataset = fixture_dataset();
        let area = ChartArea::Entity(EntityId::new("XX"));
        let snapshot = ChartSnapshot::build(&dataset, &area, date("2020-01-04"));
        assert_eq!(snapshot.heading, "Example");
        assert_eq!(values(&snapshot, MetricType::Cases), vec![10.0, 20.0]);
        let first = snapshot.line(MetricType::Cases).unwrap().points[0];
        assert_eq!(first.date, date("2020-01-03"));

        // Before the entity's data starts there is still its first day
        let snapshot = ChartSnapshot::build(&dataset, &area, date("2020-01-01"));
        assert_eq!(values(&snapshot, MetricType::Cases), vec![10.0]);
    }

    #[test]
    fn active_is_derived_and_never_negative() {
        let dataset = fixture_dataset();
        let area = ChartArea::Entity(EntityId::new("FR"));
        let snapshot = ChartSnapshot::build(&dataset, &area, date("2020-01-05"));
        // cases - recovered
        assert_eq!(
            values(&snapshot, MetricType::Active),
            vec![0.0, 50.0, 60.0, 70.0, 80.0]
        );

        let world = ChartSnapshot::build(&dataset, &ChartArea::World, date("2020-01-05"));
        assert_eq!(
            values(&world, MetricType::Active),
            vec![1.0, 1.0, 1.0, 1.0, 31_470_363.0]
        );
    }

    #[test]
    fn area_from_code() {
        assert_eq!(ChartArea::from("World"), ChartArea::World);
        assert_eq!(ChartArea::from(""), ChartArea::World);
        assert_eq!(
            ChartArea::from("FR-IDF"),
            ChartArea::Entity(EntityId::new("FR-IDF"))
        );
    }

    #[test]
    fn unknown_entity_falls_back_to_world() {
        let dataset = fixture_dataset();
        let area = ChartArea::Entity(EntityId::new("QQ"));
        let snapshot = ChartSnapshot::build(&dataset, &area, date("2020-01-02"));
        assert_eq!(snapshot.area, ChartArea::World);
        assert_eq!(values(&snapshot, MetricType::Cases), vec![1.0, 2.0]);
    }
}
