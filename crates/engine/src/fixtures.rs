// SPDX-License-Identifier: MIT

//! Test datasets

use epiglobe_core::Dataset;
use serde_json::{Value, json};

/// Days in the sample datasets (2020-01-01 to 2020-04-09)
pub(crate) const DAYS: usize = 100;

/// The world's case total on the last day
pub(crate) const LATEST_TOTAL: f64 = 31_470_367.0;

/// Four entities over 100 days, with markers in this order:
///
/// - `0` France: cases grow by 10 a day, 1000 people
/// - `1`, `2` a French region (resolved against France)
/// - `3` Steady: always 50 cases, 100 people
/// - `4` Nowhere: no population
pub(crate) fn sample_json(france_grows: bool) -> Value {
    let france_cases = if france_grows {
        days(|day| (day * 10) as f64)
    } else {
        days(|_| 300.0)
    };
    let mut world_cases = days(|day| (day * 1000) as f64);
    world_cases[DAYS - 1] = LATEST_TOTAL;

    json!({
        "totalStartDate": "2020-01-01",
        "totalEndDate": "2020-04-09",
        "totalSeries": {
            "cases": world_cases,
            "active": days(|day| (day * 500) as f64),
            "deaths": days(|day| (day * 10) as f64),
            "recovered": days(|day| (day * 400) as f64)
        },
        "minPerPerson": { "cases": 0.0, "active": 0.0, "deaths": 0.0, "recovered": 0.0 },
        "maxPerPerson": { "cases": 1.0, "active": 1.0, "deaths": 0.1, "recovered": 0.5 },
        "entities": {
            "FR": {
                "name": "France",
                "population": 1000,
                "flag": "fr.svg",
                "series": {
                    "cases": france_cases,
                    "active": days(|day| (day * 5) as f64),
                    "deaths": days(|day| day as f64),
                    "recovered": days(|day| (day * 5) as f64)
                },
                "longitudes": [2.0],
                "latitudes": [46.0]
            },
            "FR-IDF": {
                "name": "France",
                "state": "Ile-de-France",
                "population": 10,
                "series": {
                    "cases": [1, 2, 3],
                    "active": [1, 1, 1],
                    "deaths": [0, 0, 0],
                    "recovered": [0, 1, 2]
                },
                "longitudes": [2.35, 2.4],
                "latitudes": [48.85, 48.9]
            },
            "XX": {
                "name": "Steady",
                "population": 100,
                "startDate": "2020-02-01",
                "series": {
                    "cases": days(|_| 50.0),
                    "active": days(|_| 50.0),
                    "deaths": days(|_| 1.0),
                    "recovered": days(|_| 0.0)
                },
                "longitudes": [10.0],
                "latitudes": [20.0]
            },
            "ZZ": {
                "name": "Nowhere",
                "longitudes": [100.0],
                "latitudes": [-10.0]
            }
        }
    })
}

/// One value per day
fn days<F: Fn(usize) -> f64>(f: F) -> Vec<f64> {
    (0..DAYS).map(f).collect()
}

/// Where French cases grow every day
pub(crate) fn sample_dataset() -> Dataset {
    Dataset::from_value(sample_json(true)).unwrap()
}

/// Where nothing changes from one day to the next
pub(crate) fn stationary_dataset() -> Dataset {
    Dataset::from_value(sample_json(false)).unwrap()
}
