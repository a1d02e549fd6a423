// SPDX-License-Identifier: MIT

//!
//! The playback engine.
//!
//! Animates every marker from what is currently shown to what a requested
//! date (and metric) implies, writing only the markers that change, and keeps
//! the slider, date input and totals in step with the animation.
//!
//! The engine is idle or animating.  An animation has a phase:
//!
//! - `Seek` goes straight to a requested date
//! - `ResetPreview` is a quick rewind to the second day, always followed by...
//! - `FullReplay`, a slow animation up to the latest date
//!
//! Requesting the date that is already committed replays: from the start if
//! the last animation began at or after that date, otherwise onwards from
//! where it is.  A request made while animating replaces the destination and
//! starts from whatever is on screen.
//!
//! Time comes from a [`Scheduler`], which is asked for at most one tick at a
//! time.
//!

mod request;
mod slider;
mod tween;

pub use request::*;

use crate::{Event, EventBus, MarkerField, PlaybackConfig, Scheduler, SubscriptionId, Topic};
use epiglobe_core::{
    CalendarDate, Dataset, EntityDetails, MetricResolver, MetricType, format_count,
};
use log::{debug, info, trace, warn};
use serde::Serialize;
use slider::SliderStepper;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tween::Tween;

/// The kind of animation running
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PlaybackPhase {
    #[display("seek")]
    Seek,

    #[display("reset preview")]
    ResetPreview,

    #[display("full replay")]
    FullReplay,
}

/// The engine's dates.  At rest `current_date == last_date == target_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    /// The date last fully shown (committed when an animation completes)
    pub current_date: CalendarDate,

    /// Where the animation in flight (or the last one) is going
    pub target_date: CalendarDate,

    /// Where the animation in flight started from
    pub last_date: CalendarDate,

    pub is_running: bool,
    pub tween_count: usize,
    pub phase: Option<PlaybackPhase>,
}

/// The result of moving the pointer over the globe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PointerOutcome {
    /// Not over a marker
    Nothing,

    /// A different group is now highlighted
    Highlighted { group: String },

    /// Over a marker of the group that is already highlighted (so the host
    /// can offer the entity's card)
    AlreadyHighlighted { instance: usize, group: String },
}

/// The animation in flight
#[derive(Debug)]
struct Animation {
    phase: PlaybackPhase,
    tween: Tween,
    slider: SliderStepper,
}

/// Drives the [`MarkerField`] through time
pub struct PlaybackEngine<S: Scheduler> {
    dataset: Rc<Dataset>,
    bus: Rc<EventBus>,
    scheduler: S,
    config: PlaybackConfig,
    field: MarkerField,
    metric: MetricType,
    current_date: CalendarDate,
    target_date: CalendarDate,
    last_date: CalendarDate,
    animation: Option<Animation>,

    /// Whether a tick has been requested from the scheduler and not yet run
    tick_scheduled: bool,
}

impl<S: Scheduler> PlaybackEngine<S> {
    /// Create an idle engine showing flat markers, at the latest date
    pub fn new(
        dataset: Rc<Dataset>,
        bus: Rc<EventBus>,
        scheduler: S,
        config: PlaybackConfig,
    ) -> Self {
        let field = MarkerField::new(&dataset, &config);
        let latest = dataset.latest_date();
        info!(
            "Playback engine created with {} markers, latest date {latest}",
            field.len()
        );
        Self {
            dataset,
            bus,
            scheduler,
            config,
            field,
            metric: MetricType::Cases,
            current_date: latest,
            target_date: latest,
            last_date: latest,
            animation: None,
            tick_scheduled: false,
        }
    }

    /// Grow the markers from flat to the latest date
    pub fn start(&mut self) {
        info!("Starting playback");
        let latest = self.dataset.latest_date();
        self.animate_to(latest, PlaybackPhase::Seek, self.config.seek_duration_ms);
    }

    /// Handle a date request from the slider, date input or play button.
    /// Returns the phase of the animation started.
    pub fn request_date(&mut self, request: &SeekRequest) -> PlaybackPhase {
        let range = *self.dataset.range();
        let date = request.resolve(&range);
        debug!("{request:?} resolved to {date}");

        if date != self.current_date {
            self.animate_to(date, PlaybackPhase::Seek, self.config.seek_duration_ms);
            return PlaybackPhase::Seek;
        }

        // The same date again means play
        let requested = range.resolve_index(date, None);
        if range.resolve_index(self.last_date, None) >= requested {
            let second_day = range.date_at_clamped(1);
            self.animate_to(
                second_day,
                PlaybackPhase::ResetPreview,
                self.config.preview_duration_ms,
            );
            PlaybackPhase::ResetPreview
        } else {
            self.animate_to(
                range.end(),
                PlaybackPhase::FullReplay,
                self.config.replay_duration_ms,
            );
            PlaybackPhase::FullReplay
        }
    }

    /// Show a different metric, animating to it at the current destination
    /// in the time the phase in flight takes
    pub fn set_metric(&mut self, metric: MetricType) {
        info!("Metric changed to {metric}");
        self.metric = metric;
        let phase = self
            .animation
            .as_ref()
            .map(|animation| animation.phase)
            .unwrap_or(PlaybackPhase::Seek);
        self.animate_to(self.target_date, phase, self.duration_of(phase));
    }

    fn duration_of(&self, phase: PlaybackPhase) -> f64 {
        match phase {
            PlaybackPhase::Seek => self.config.seek_duration_ms,
            PlaybackPhase::ResetPreview => self.config.preview_duration_ms,
            PlaybackPhase::FullReplay => self.config.replay_duration_ms,
        }
    }

    /// Start (or restart) an animation from what's on screen to `target`
    fn animate_to(&mut self, target: CalendarDate, phase: PlaybackPhase, duration: f64) {
        let range = *self.dataset.range();
        let from_date = self.displayed_date();
        if let Some(previous) = &self.animation {
            debug!(
                "Replacing {} to {} with {phase} to {target}",
                previous.phase, self.target_date
            );
        }
        info!("{phase} from {from_date} to {target} over {duration}ms");

        self.last_date = from_date;
        self.target_date = target;

        let targets = MetricResolver::new(&self.dataset).resolve_all(target, self.metric);
        let tween = Tween::new(
            self.scheduler.now(),
            duration,
            self.field.magnitudes().to_vec(),
            targets,
        );
        let slider = SliderStepper::new(
            range.resolve_index(from_date, None),
            range.resolve_index(target, None),
            duration / self.config.tick_interval_ms,
        );
        debug!(
            "{} marker targets, slider steps of {} days",
            tween.len(),
            slider.step()
        );
        self.animation = Some(Animation {
            phase,
            tween,
            slider,
        });

        self.publish_total();
        self.publish(Event::RenderNeeded);
        self.schedule_tick();
    }

    /// Advance the animation to the scheduler's current time.  To be called
    /// by (or on behalf of) the scheduler.
    pub fn tick(&mut self) {
        self.tick_scheduled = false;
        let now = self.scheduler.now();
        let tolerance = self.config.magnitude_tolerance;

        let Some(animation) = self.animation.as_mut() else {
            trace!("tick with nothing to animate");
            return;
        };
        let t = animation.tween.progress(now);

        let mut written = 0;
        for id in 0..self.field.len() {
            let magnitude = animation.tween.value(id, t);
            let shown = self.field.magnitudes()[id];
            if (magnitude - shown).abs() <= tolerance {
                continue;
            }
            let point = self.field.instances()[id].point;
            let hue = self.config.hue_for(magnitude);
            self.field
                .set_instance(id, point.longitude, point.latitude, magnitude, hue);
            written += 1;
        }
        trace!("tick at {t:.3}: {written} markers written");

        let finished = t >= 1.0;
        let slider = if finished {
            None
        } else {
            animation.slider.advance(t)
        };

        if self.field.flush() {
            self.publish(Event::RenderNeeded);
        }
        if let Some(index) = slider {
            let date = self.dataset.range().date_at_clamped(index);
            self.publish_position(index, date);
        }

        if finished {
            self.complete();
        } else {
            self.schedule_tick();
        }
    }

    /// Commit the animation's target and chain the full replay after a
    /// preview
    fn complete(&mut self) {
        let Some(mut animation) = self.animation.take() else {
            return;
        };
        info!("{} finished at {}", animation.phase, self.target_date);

        self.current_date = self.target_date;
        self.last_date = self.target_date;

        // Exactly the target, whatever the stepping did
        let index = animation.slider.finish();
        self.publish_position(index, self.target_date);

        if animation.phase == PlaybackPhase::ResetPreview {
            let latest = self.dataset.latest_date();
            self.animate_to(
                latest,
                PlaybackPhase::FullReplay,
                self.config.replay_duration_ms,
            );
        }
    }

    /// The date the slider shows
    fn displayed_date(&self) -> CalendarDate {
        match &self.animation {
            Some(animation) => self
                .dataset
                .range()
                .date_at_clamped(animation.slider.position()),
            None => self.current_date,
        }
    }

    fn schedule_tick(&mut self) {
        if self.tick_scheduled {
            return;
        }
        self.tick_scheduled = true;
        self.scheduler.schedule_next_tick(self.config.tick_interval_ms);
    }

    /// Publish an event.  Missing subscribers are logged by the bus.
    fn publish(&self, event: Event) {
        let _ = self.bus.publish(event);
    }

    fn publish_position(&self, index: usize, date: CalendarDate) {
        self.publish(Event::SliderSync(index));
        self.publish(Event::DateTextSync(date));
    }

    fn publish_total(&self) {
        let total = self.dataset.total_at(self.metric, self.target_date);
        self.publish(Event::MetricTotalChanged {
            metric: self.metric,
            total,
            label: format_count(total),
        });
    }

    /// Highlight the group of the marker under the pointer (if any)
    pub fn pointer_over(&mut self, instance: Option<usize>) -> PointerOutcome {
        let Some((instance, group)) = instance.and_then(|instance| {
            let group = self.field.group(instance)?;
            Some((instance, group.to_string()))
        }) else {
            return PointerOutcome::Nothing;
        };

        if self.field.highlighted() == Some(group.as_str()) {
            return PointerOutcome::AlreadyHighlighted { instance, group };
        }
        self.field.highlight_group(Some(&group));
        self.publish(Event::RenderNeeded);
        PointerOutcome::Highlighted { group }
    }

    /// The card contents for the entity owning marker `instance`.  Regions
    /// without a flag show their country's.
    pub fn entity_details(&self, instance: usize) -> Option<EntityDetails> {
        let entity = self.dataset.marker_entity(instance)?;
        let mut details = entity.details(self.metric, self.target_date);
        if details.flag.is_none() && entity.id().is_subregion() {
            details.flag = self
                .dataset
                .entity_by_str(entity.id().parent())
                .and_then(|country| country.flag())
                .map(str::to_string);
        }
        Some(details)
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_date: self.current_date,
            target_date: self.target_date,
            last_date: self.last_date,
            is_running: self.animation.is_some(),
            tween_count: usize::from(self.animation.is_some()),
            phase: self.animation.as_ref().map(|animation| animation.phase),
        }
    }

    pub fn metric(&self) -> MetricType {
        self.metric
    }

    pub fn field(&self) -> &MarkerField {
        &self.field
    }

    /// For the renderer to acknowledge uploads
    pub fn field_mut(&mut self) -> &mut MarkerField {
        &mut self.field
    }

    pub fn dataset(&self) -> &Rc<Dataset> {
        &self.dataset
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }
}

impl<S: Scheduler + 'static> PlaybackEngine<S> {
    /// Have `engine` handle the seek and metric requests published on its bus
    pub fn connect(engine: &Rc<RefCell<Self>>) -> Vec<SubscriptionId> {
        let bus = Rc::clone(&engine.borrow().bus);

        let weak = Rc::downgrade(engine);
        let seek = bus.subscribe(Topic::SeekRequested, move |event| {
            if let Event::SeekRequested(request) = event {
                with_engine(&weak, |engine| {
                    engine.request_date(request);
                });
            }
        });

        let weak = Rc::downgrade(engine);
        let metric = bus.subscribe(Topic::MetricChanged, move |event| {
            if let Event::MetricChanged(metric) = event {
                with_engine(&weak, |engine| engine.set_metric(*metric));
            }
        });

        vec![seek, metric]
    }
}

fn with_engine<S, F>(engine: &Weak<RefCell<PlaybackEngine<S>>>, f: F)
where
    S: Scheduler,
    F: FnOnce(&mut PlaybackEngine<S>),
{
    let Some(engine) = engine.upgrade() else {
        warn!("playback engine is gone, ignoring request");
        return;
    };
    match engine.try_borrow_mut() {
        Ok(mut engine) => f(&mut engine),
        Err(_) => warn!("playback engine is busy, ignoring request"),
    }
}
