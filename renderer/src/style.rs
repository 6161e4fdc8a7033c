// wayfarer/renderer/src/style.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The evaluated style slice the draw drivers consume.
//!
//! Property evaluation (zoom interpolation, expression evaluation,
//! transitions) happens upstream; by the time a frame is drawn, every paint
//! property is either a plain constant or has been baked into paint vertex
//! buffers and marked data-driven here.

use crate::pattern::CrossFaded;

/// An evaluated color with premultiplication left to the shader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    pub fn black() -> Color {
        Color::new(0.0, 0.0, 0.0, 1.0)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A paint property that is either constant across the layer or baked into
/// per-vertex paint data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue<T> {
    Constant(T),
    DataDriven,
}

impl<T> PropertyValue<T> where T: Copy {
    /// The constant value, or `default` when the property varies per
    /// feature. Drivers use this for whole-layer visibility culling only;
    /// a data-driven property can never cull the layer.
    pub fn constant_or(self, default: T) -> T {
        match self {
            PropertyValue::Constant(value) => value,
            PropertyValue::DataDriven => default,
        }
    }
}

/// Whether a property evaluates in tile space or in screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Map,
    Viewport,
}

#[derive(Clone, Debug)]
pub struct BackgroundPaint {
    pub color: Color,
    pub opacity: f32,
    pub pattern: Option<CrossFaded<String>>,
}

#[derive(Clone, Debug)]
pub struct CirclePaint {
    pub opacity: PropertyValue<f32>,
    pub stroke_width: PropertyValue<f32>,
    pub stroke_opacity: PropertyValue<f32>,
    pub pitch_alignment: Alignment,
    pub pitch_scale: Alignment,
}

#[derive(Clone, Debug)]
pub struct LinePaint {
    pub opacity: PropertyValue<f32>,
    pub dasharray: Option<CrossFaded<Vec<f32>>>,
    pub pattern: Option<CrossFaded<String>>,
    pub round_cap: bool,
}

#[derive(Clone, Debug)]
pub enum LayerKind {
    Background(BackgroundPaint),
    Circle(CirclePaint),
    Line(LinePaint),
}

/// One style layer in z order. The id keys buckets, program configurations,
/// and segment binding caches.
#[derive(Clone, Debug)]
pub struct StyleLayer {
    pub id: String,
    pub kind: LayerKind,
}

impl StyleLayer {
    pub fn new(id: impl Into<String>, kind: LayerKind) -> StyleLayer {
        StyleLayer { id: id.into(), kind }
    }
}
