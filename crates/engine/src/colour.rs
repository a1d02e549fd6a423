// SPDX-License-Identifier: MIT

//!
//! Marker colours
//!

use serde::{Deserialize, Serialize};

/// An RGB colour with components in `[0, 1]`
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    r: f32,
    g: f32,
    b: f32,
}

impl From<Colour> for [f32; 3] {
    fn from(value: Colour) -> Self {
        value.as_array()
    }
}

impl From<[f32; 3]> for Colour {
    fn from(value: [f32; 3]) -> Self {
        Colour::from_rgb(value[0], value[1], value[2])
    }
}

impl Colour {
    /// Create a colour from RGB values (clamped to `[0, 1]`)
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Colour {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Create a colour from hue, saturation and lightness (all in `[0, 1]`,
    /// the hue wraps)
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hue = hue.rem_euclid(1.0);
        let saturation = saturation.clamp(0.0, 1.0);
        let lightness = lightness.clamp(0.0, 1.0);

        // Achromatic
        if saturation == 0.0 {
            return Colour::from_rgb(lightness, lightness, lightness);
        }

        let q = if lightness <= 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let p = 2.0 * lightness - q;

        Colour::from_rgb(
            hue_to_rgb(p, q, hue + 1.0 / 3.0),
            hue_to_rgb(p, q, hue),
            hue_to_rgb(p, q, hue - 1.0 / 3.0),
        )
    }

    /// Get a colour as RGB values
    pub fn as_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Get a colour as 8 bit RGB values
    pub fn as_rgb8(&self) -> (u8, u8, u8) {
        let to_u8 = |c: f32| (c * 255.0).round() as u8;
        (to_u8(self.r), to_u8(self.g), to_u8(self.b))
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
