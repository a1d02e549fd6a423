// SPDX-License-Identifier: MIT

//!
//! The browser frontend.  Drawing is left to JavaScript (e.g. an instanced
//! mesh): it uploads the marker buffers when told a render is needed, and
//! forwards the slider, date input, metric selector and pointer to the engine.
//!
//! ```sh
//! wasm-pack build --target web
//! python3 -m http.server 8000 --bind 0.0.0.0
//! ```
//!

use crate::{
    ChartModel, EngineError, Event, EventBus, PlaybackConfig, PlaybackEngine, Scheduler,
    SeekRequest, Topic,
};
use epiglobe_core::{ChartArea, Dataset, MetricType};
use log::{info, warn};
use serde::Serialize;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;

type WebEngine = PlaybackEngine<WebScheduler>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Debug).map_err(to_js)?;
    info!("Start epiglobe");
    Ok(())
}

/// Ticks the engine with browser timeouts, timed with `performance.now()`
pub struct WebScheduler {
    engine: Weak<RefCell<WebEngine>>,
}

impl Scheduler for WebScheduler {
    fn now(&self) -> f64 {
        web_sys::window()
            .and_then(|window| window.performance())
            .map(|performance| performance.now())
            .unwrap_or(0.0)
    }

    fn schedule_next_tick(&self, delay_ms: f64) {
        let engine = self.engine.clone();
        let timeout_ms = delay_ms.max(0.0).round() as u32;
        gloo_timers::callback::Timeout::new(timeout_ms, move || {
            if try_tick(&engine) == TickAttempt::Busy {
                // The engine still counts this tick as pending, so try again
                warn!("playback engine busy at tick, retrying");
                WebScheduler { engine }.schedule_next_tick(delay_ms);
            }
        })
        .forget();
    }
}

/// What happened when a timer fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickAttempt {
    Ticked,
    Busy,
    Gone,
}

fn try_tick<S: Scheduler>(engine: &Weak<RefCell<PlaybackEngine<S>>>) -> TickAttempt {
    let Some(engine) = engine.upgrade() else {
        return TickAttempt::Gone;
    };
    match engine.try_borrow_mut() {
        Ok(mut engine) => {
            engine.tick();
            TickAttempt::Ticked
        }
        Err(_) => TickAttempt::Busy,
    }
}

/// The payload handed to JavaScript for a total change
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TotalPayload<'a> {
    metric: MetricType,
    total: f64,
    label: &'a str,
}

/// The globe engine for use on the web
#[wasm_bindgen]
pub struct EpiGlobe {
    bus: Rc<EventBus>,
    engine: Rc<RefCell<WebEngine>>,
    chart: Rc<RefCell<ChartModel>>,
}

#[wasm_bindgen]
impl EpiGlobe {
    /// Create the engine from the dataset JSON, and (optionally) a playback
    /// config JSON
    #[wasm_bindgen(constructor)]
    pub fn new(dataset_json: &str, config_json: Option<String>) -> Result<EpiGlobe, JsValue> {
        info!("Constructing a new EpiGlobe in Rust");
        Self::build(dataset_json, config_json.as_deref()).map_err(to_js)
    }

    /// Grow the markers to the latest date
    pub fn start(&self) -> Result<(), JsValue> {
        self.engine_mut()?.start();
        Ok(())
    }

    //--------------------------------------------------------------------------
    // Requests (go via the bus so that the chart follows)
    //--------------------------------------------------------------------------

    /// The slider moved (or was released) at `index`
    pub fn request_slider(&self, index: u32) {
        self.publish(Event::SeekRequested(SeekRequest::Slider(index as usize)));
    }

    /// The date input changed
    pub fn request_text(&self, text: String) {
        self.publish(Event::SeekRequested(SeekRequest::TextInput(text)));
    }

    /// Go to (or replay up to) the latest date
    pub fn request_latest(&self) {
        self.publish(Event::SeekRequested(SeekRequest::Latest));
    }

    /// Show `cases`, `active`, `deaths` or `recovered`
    pub fn set_metric(&self, metric: &str) -> Result<(), JsValue> {
        let metric: MetricType = metric.parse().map_err(to_js)?;
        self.publish(Event::MetricChanged(metric));
        Ok(())
    }

    /// Chart `World` or an entity ID
    pub fn set_area(&self, code: &str) {
        self.publish(Event::AreaChanged(ChartArea::from(code)));
    }

    /// The pointer is over marker `instance` (or no marker).  Returns the
    /// outcome (`{ kind: "nothing" | "highlighted" | "alreadyHighlighted" }`).
    pub fn pointer_over(&self, instance: Option<u32>) -> Result<JsValue, JsValue> {
        let outcome = self
            .engine_mut()?
            .pointer_over(instance.map(|instance| instance as usize));
        serde_wasm_bindgen::to_value(&outcome).map_err(to_js)
    }

    /// The card contents for the entity of marker `instance` (or `null`)
    pub fn entity_details(&self, instance: u32) -> Result<JsValue, JsValue> {
        let details = self.engine()?.entity_details(instance as usize);
        serde_wasm_bindgen::to_value(&details).map_err(to_js)
    }

    /// The chart data
    pub fn chart(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.chart.try_borrow().map_err(to_js)?.snapshot();
        serde_wasm_bindgen::to_value(&*snapshot).map_err(to_js)
    }

    /// Call `callback` with every event published on `topic` (e.g.
    /// `slider-sync`, `render-needed`).  Callbacks must not call back into
    /// the globe synchronously.
    pub fn on(&self, topic: &str, callback: js_sys::Function) -> Result<(), JsValue> {
        let topic = Topic::from_name(topic)
            .ok_or_else(|| JsValue::from_str(&format!("unknown topic `{topic}`")))?;
        self.bus.subscribe(topic, move |event| {
            let payload = match payload(event) {
                Ok(payload) => payload,
                Err(error) => {
                    warn!("could not convert {} for JavaScript: {error:?}", event.topic());
                    return;
                }
            };
            if let Err(error) = callback.call1(&JsValue::NULL, &payload) {
                warn!("{} callback failed: {error:?}", event.topic());
            }
        });
        Ok(())
    }

    //--------------------------------------------------------------------------
    // Buffers
    //--------------------------------------------------------------------------

    pub fn marker_count(&self) -> Result<usize, JsValue> {
        Ok(self.engine()?.field().len())
    }

    /// Column-major instance matrices (16 floats per marker)
    pub fn matrices(&self) -> Result<Vec<f32>, JsValue> {
        Ok(self.engine()?.field().matrix_buffer().to_vec())
    }

    /// Instance colours (RGB, 3 floats per marker)
    pub fn colours(&self) -> Result<Vec<f32>, JsValue> {
        Ok(self.engine()?.field().colour_buffer().to_vec())
    }

    pub fn needs_upload(&self) -> Result<bool, JsValue> {
        Ok(self.engine()?.field().needs_upload())
    }

    /// To be called once the buffers have been uploaded
    pub fn mark_uploaded(&self) -> Result<(), JsValue> {
        self.engine_mut()?.field_mut().mark_uploaded();
        Ok(())
    }

    /// The committed date (`YYYY-MM-DD`)
    pub fn current_date(&self) -> Result<String, JsValue> {
        Ok(self.engine()?.state().current_date.to_string())
    }

    /// The number of days in the dataset
    pub fn day_count(&self) -> Result<usize, JsValue> {
        Ok(self.engine()?.dataset().range().len())
    }
}

impl EpiGlobe {
    fn build(dataset_json: &str, config_json: Option<&str>) -> Result<EpiGlobe, EngineError> {
        let dataset = Rc::new(Dataset::from_json(dataset_json)?);
        dataset.log_summary();
        let config = match config_json {
            Some(json) => PlaybackConfig::from_json(json)?,
            None => PlaybackConfig::default(),
        };

        let bus = Rc::new(EventBus::new());
        let engine = Rc::new_cyclic(|weak| {
            let scheduler = WebScheduler {
                engine: weak.clone(),
            };
            RefCell::new(PlaybackEngine::new(
                Rc::clone(&dataset),
                Rc::clone(&bus),
                scheduler,
                config,
            ))
        });
        let chart = Rc::new(RefCell::new(ChartModel::new(dataset, Rc::clone(&bus))));

        PlaybackEngine::connect(&engine);
        ChartModel::connect(&chart);
        Ok(EpiGlobe { bus, engine, chart })
    }

    fn publish(&self, event: Event) {
        let _ = self.bus.publish(event);
    }

    fn engine(&self) -> Result<Ref<'_, WebEngine>, JsValue> {
        self.engine.try_borrow().map_err(to_js)
    }

    fn engine_mut(&self) -> Result<RefMut<'_, WebEngine>, JsValue> {
        self.engine.try_borrow_mut().map_err(to_js)
    }
}

/// What JavaScript callbacks receive for each event
fn payload(event: &Event) -> Result<JsValue, serde_wasm_bindgen::Error> {
    match event {
        Event::SeekRequested(request) => serde_wasm_bindgen::to_value(request),
        Event::MetricChanged(metric) => Ok(JsValue::from_str(&metric.to_string())),
        Event::SliderSync(index) => Ok(JsValue::from_f64(*index as f64)),
        Event::DateTextSync(date) => Ok(JsValue::from_str(&date.to_string())),
        Event::MetricTotalChanged {
            metric,
            total,
            label,
        } => serde_wasm_bindgen::to_value(&TotalPayload {
            metric: *metric,
            total: *total,
            label,
        }),
        Event::RenderNeeded => Ok(JsValue::UNDEFINED),
        Event::AreaChanged(area) => serde_wasm_bindgen::to_value(area),
        Event::ChartUpdated(snapshot) => serde_wasm_bindgen::to_value(&**snapshot),
    }
}

fn to_js<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}
