// SPDX-License-Identifier: MIT

//!
//! Keeps the chart data up to date with the requested date and area
//!

use crate::{Event, EventBus, SeekRequest, SubscriptionId, Topic};
use epiglobe_core::{CalendarDate, ChartArea, ChartSnapshot, Dataset};
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;

/// The chart's current area and date, and the data drawn for them
#[derive(Debug)]
pub struct ChartModel {
    dataset: Rc<Dataset>,
    bus: Rc<EventBus>,
    area: ChartArea,
    date: CalendarDate,
    snapshot: Rc<ChartSnapshot>,
}

impl ChartModel {
    /// The world, up to the latest date
    pub fn new(dataset: Rc<Dataset>, bus: Rc<EventBus>) -> Self {
        let date = dataset.latest_date();
        let snapshot = Rc::new(ChartSnapshot::build(&dataset, &ChartArea::World, date));
        Self {
            dataset,
            bus,
            area: ChartArea::World,
            date,
            snapshot,
        }
    }

    pub fn set_area(&mut self, area: ChartArea) {
        debug!("chart area changed to {area:?}");
        self.area = area;
        self.rebuild();
    }

    /// Follow a date request the same way the playback engine does
    pub fn set_date(&mut self, request: &SeekRequest) {
        self.date = request.resolve(self.dataset.range());
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.snapshot = Rc::new(ChartSnapshot::build(&self.dataset, &self.area, self.date));
        let _ = self
            .bus
            .publish(Event::ChartUpdated(Rc::clone(&self.snapshot)));
    }

    pub fn area(&self) -> &ChartArea {
        &self.area
    }

    pub fn date(&self) -> CalendarDate {
        self.date
    }

    pub fn snapshot(&self) -> Rc<ChartSnapshot> {
        Rc::clone(&self.snapshot)
    }

    /// Have `model` follow the seek and area requests published on its bus
    pub fn connect(model: &Rc<RefCell<Self>>) -> Vec<SubscriptionId> {
        let bus = Rc::clone(&model.borrow().bus);

        let weak = Rc::downgrade(model);
        let seek = bus.subscribe(Topic::SeekRequested, move |event| {
            let (Event::SeekRequested(request), Some(model)) = (event, weak.upgrade()) else {
                return;
            };
            match model.try_borrow_mut() {
                Ok(mut model) => model.set_date(request),
                Err(_) => warn!("chart is busy, ignoring date request"),
            };
        });

        let weak = Rc::downgrade(model);
        let area = bus.subscribe(Topic::AreaChanged, move |event| {
            let (Event::AreaChanged(area), Some(model)) = (event, weak.upgrade()) else {
                return;
            };
            match model.try_borrow_mut() {
                Ok(mut model) => model.set_area(area.clone()),
                Err(_) => warn!("chart is busy, ignoring area request"),
            };
        });

        vec![seek, area]
    }
}
