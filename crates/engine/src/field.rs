// SPDX-License-Identifier: MIT

//!
//! The marker field: one placement transform and one colour per marker,
//! stored as flat buffers ready to be uploaded to the GPU.
//!
//! Writes are batched.  [`MarkerField::set_instance`] only updates the CPU
//! side buffers; [`MarkerField::flush`] marks them as needing an upload once
//! per batch, and the renderer acknowledges the upload with
//! [`MarkerField::mark_uploaded`].
//!

use crate::{Colour, PlaybackConfig};
use epiglobe_core::{Dataset, GeoPoint};
use glam::{Mat4, Vec3};
use log::{debug, warn};

/// A marker and what it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerInstance {
    /// Index of the owning entity in the dataset
    pub entity: usize,

    /// The owning entity's country code (highlighting works per country)
    pub group: String,

    pub point: GeoPoint,
}

/// The instance buffers of every marker
#[derive(Debug, Clone)]
pub struct MarkerField {
    instances: Vec<MarkerInstance>,
    matrices: Vec<Mat4>,
    colours: Vec<[f32; 3]>,
    magnitudes: Vec<f64>,
    hues: Vec<f32>,

    /// The highlighted group (if any)
    highlighted: Option<String>,

    /// Written since the last flush
    pending: bool,

    matrices_dirty: bool,
    colours_dirty: bool,

    /// Total number of `set_instance` writes
    writes: usize,

    config: PlaybackConfig,
}

impl MarkerField {
    /// One flat marker (magnitude `0`) per coordinate pair in the dataset
    pub fn new(dataset: &Dataset, config: &PlaybackConfig) -> Self {
        let instances: Vec<MarkerInstance> = dataset
            .markers()
            .filter_map(|(entity, point)| {
                let group = dataset.entities().get(entity)?.id().parent().to_string();
                Some(MarkerInstance {
                    entity,
                    group,
                    point,
                })
            })
            .collect();
        let count = instances.len();
        debug!("creating marker field with {count} instances");

        let mut field = Self {
            instances,
            matrices: vec![Mat4::IDENTITY; count],
            colours: vec![[0.0; 3]; count],
            magnitudes: vec![0.0; count],
            hues: vec![config.start_hue; count],
            highlighted: None,
            pending: false,
            matrices_dirty: true,
            colours_dirty: true,
            writes: 0,
            config: config.clone(),
        };
        for id in 0..count {
            let point = field.instances[id].point;
            field.write(id, point.longitude, point.latitude, 0.0, config.start_hue);
        }
        field
    }

    /// Place instance `id` at the coordinates with a height derived from
    /// `magnitude`, and colour it with `hue`.  Doesn't touch any other
    /// instance.  Returns `false` (and does nothing) for unknown instances.
    pub fn set_instance(
        &mut self,
        id: usize,
        longitude: f64,
        latitude: f64,
        magnitude: f64,
        hue: f32,
    ) -> bool {
        if id >= self.instances.len() {
            warn!("ignoring write to unknown marker instance {id}");
            return false;
        }
        self.write(id, longitude, latitude, magnitude, hue);
        self.writes += 1;
        self.pending = true;
        true
    }

    fn write(&mut self, id: usize, longitude: f64, latitude: f64, magnitude: f64, hue: f32) {
        let height = self.config.height_for(magnitude);
        self.matrices[id] = placement(longitude, latitude, height, self.config.footprint);
        self.magnitudes[id] = magnitude;
        self.hues[id] = hue;
        self.colours[id] = self.colour_for(id).as_array();
    }

    fn colour_for(&self, id: usize) -> Colour {
        let highlighted = match &self.highlighted {
            Some(group) => self.instances[id].group == *group,
            None => false,
        };
        let lightness = if highlighted {
            self.config.highlight_lightness
        } else {
            self.config.lightness
        };
        Colour::from_hsl(self.hues[id], self.config.saturation, lightness)
    }

    /// End a batch of writes.  Returns whether anything was written (and so
    /// whether the buffers now need uploading).
    pub fn flush(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.matrices_dirty = true;
        self.colours_dirty = true;
        true
    }

    /// Highlight every instance of `group` (or nothing).  Returns whether the
    /// highlight changed.
    pub fn highlight_group(&mut self, group: Option<&str>) -> bool {
        if self.highlighted.as_deref() == group {
            return false;
        }
        debug!("highlighting marker group {group:?}");
        self.highlighted = group.map(str::to_string);
        for id in 0..self.instances.len() {
            self.colours[id] = self.colour_for(id).as_array();
        }
        self.colours_dirty = true;
        true
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Whether the renderer has to upload the buffers before drawing
    pub fn needs_upload(&self) -> bool {
        self.matrices_dirty || self.colours_dirty
    }

    pub fn matrices_dirty(&self) -> bool {
        self.matrices_dirty
    }

    pub fn colours_dirty(&self) -> bool {
        self.colours_dirty
    }

    /// To be called by the renderer once the buffers are uploaded
    pub fn mark_uploaded(&mut self) {
        self.matrices_dirty = false;
        self.colours_dirty = false;
    }

    /// Column-major 4x4 matrices, 16 floats per instance
    pub fn matrix_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.matrices)
    }

    /// RGB colours, 3 floats per instance
    pub fn colour_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colours)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[MarkerInstance] {
        &self.instances
    }

    pub fn instance(&self, id: usize) -> Option<&MarkerInstance> {
        self.instances.get(id)
    }

    pub fn group(&self, id: usize) -> Option<&str> {
        self.instances.get(id).map(|instance| instance.group.as_str())
    }

    /// The magnitudes currently shown
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    pub fn magnitude(&self, id: usize) -> Option<f64> {
        self.magnitudes.get(id).copied()
    }

    pub fn hue(&self, id: usize) -> Option<f32> {
        self.hues.get(id).copied()
    }

    pub fn matrix(&self, id: usize) -> Option<Mat4> {
        self.matrices.get(id).copied()
    }

    pub fn colour(&self, id: usize) -> Option<[f32; 3]> {
        self.colours.get(id).copied()
    }

    /// How many times `set_instance` has written an instance
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

/// Rotate to the coordinates, move out to the unit sphere's surface, then
/// scale so that the marker grows outwards from the surface
fn placement(longitude: f64, latitude: f64, height: f32, footprint: f32) -> Mat4 {
    let y_rotation = ((longitude - 90.0) as f32).to_radians();
    let x_rotation = ((latitude - 180.0) as f32).to_radians();
    Mat4::from_rotation_y(y_rotation)
        * Mat4::from_rotation_x(x_rotation)
        * Mat4::from_translation(Vec3::Z)
        * Mat4::from_scale(Vec3::new(footprint, footprint, height))
        * Mat4::from_translation(Vec3::new(0.0, 0.0, 0.5))
}
