// SPDX-License-Identifier: MIT

//!
//! The notification bus: synchronous publish/subscribe keyed by topic.  Used
//! to decouple the playback engine from the widgets and the chart.
//!

use crate::SeekRequest;
use epiglobe_core::{CalendarDate, ChartArea, ChartSnapshot, MetricType};
use log::{error, trace, warn};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Errors that can be reported when publishing
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Nothing was listening (not fatal)
    #[error("no subscribers for event {0}")]
    NoSubscribers(Topic),
}

/// What an [`Event`] is about.  Subscriptions are made per topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Topic {
    #[display("seek-requested")]
    SeekRequested,

    #[display("metric-changed")]
    MetricChanged,

    #[display("slider-sync")]
    SliderSync,

    #[display("date-text-sync")]
    DateTextSync,

    #[display("metric-total-changed")]
    MetricTotalChanged,

    #[display("render-needed")]
    RenderNeeded,

    #[display("area-changed")]
    AreaChanged,

    #[display("chart-updated")]
    ChartUpdated,
}

/// Everything that can be published
#[derive(Debug, Clone)]
pub enum Event {
    /// A widget asks for a date (slider, date input, play button)
    SeekRequested(SeekRequest),

    /// The displayed metric changed, so every magnitude must be recomputed
    MetricChanged(MetricType),

    /// Move the slider to this day index
    SliderSync(usize),

    /// Show this date in the date input
    DateTextSync(CalendarDate),

    /// The worldwide total of the displayed metric for the target date
    MetricTotalChanged {
        metric: MetricType,
        total: f64,
        label: String,
    },

    /// The instance buffers (or anything else drawn) changed
    RenderNeeded,

    /// The chart should show a different area
    AreaChanged(ChartArea),

    /// The chart data changed
    ChartUpdated(Rc<ChartSnapshot>),
}

impl Topic {
    pub const ALL: [Topic; 8] = [
        Self::SeekRequested,
        Self::MetricChanged,
        Self::SliderSync,
        Self::DateTextSync,
        Self::MetricTotalChanged,
        Self::RenderNeeded,
        Self::AreaChanged,
        Self::ChartUpdated,
    ];

    /// The topic with this name (e.g. `slider-sync`)
    pub fn from_name(name: &str) -> Option<Topic> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.to_string() == name.trim())
    }
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Self::SeekRequested(_) => Topic::SeekRequested,
            Self::MetricChanged(_) => Topic::MetricChanged,
            Self::SliderSync(_) => Topic::SliderSync,
            Self::DateTextSync(_) => Topic::DateTextSync,
            Self::MetricTotalChanged { .. } => Topic::MetricTotalChanged,
            Self::RenderNeeded => Topic::RenderNeeded,
            Self::AreaChanged(_) => Topic::AreaChanged,
            Self::ChartUpdated(_) => Topic::ChartUpdated,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Handler = Rc<RefCell<dyn FnMut(&Event)>>;

/// Synchronous publish/subscribe.
///
/// Handlers for a topic are called in the order they subscribed.  Handlers
/// may publish and subscribe themselves; a handler that is already running is
/// not re-entered (the nested delivery to it is skipped with a warning).
#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<HashMap<Topic, Vec<(SubscriptionId, Handler)>>>,
    next_id: Cell<usize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `handler` with every event published to `topic`
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let handler: Handler = Rc::new(RefCell::new(handler));
        self.subscribers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push((id, handler));
        trace!("subscribed {id:?} to {topic}");
        id
    }

    /// Stop calling the handler behind `id`.  Returns whether it was found.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        for handlers in subscribers.values_mut() {
            if let Some(position) = handlers.iter().position(|(other, _)| *other == id) {
                handlers.remove(position);
                return true;
            }
        }
        false
    }

    /// The number of handlers subscribed to `topic`
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers
            .borrow()
            .get(&topic)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Call every handler subscribed to the event's topic.  Returns how many
    /// handlers were called, or [`BusError::NoSubscribers`] (which is also
    /// logged) if there were none.
    pub fn publish(&self, event: Event) -> Result<usize, BusError> {
        let topic = event.topic();

        // Copy the handler list so that handlers can (un)subscribe
        let handlers: Vec<Handler> = self
            .subscribers
            .borrow()
            .get(&topic)
            .map(|handlers| handlers.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default();

        if handlers.is_empty() {
            error!("no subscribers for event {topic}");
            return Err(BusError::NoSubscribers(topic));
        }

        let mut called = 0;
        for handler in handlers {
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    (*handler)(&event);
                    called += 1;
                }
                Err(_) => warn!("skipping re-entrant delivery of {topic}"),
            }
        }
        Ok(called)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<Topic, usize> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(topic, handlers)| (*topic, handlers.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .finish()
    }
}
