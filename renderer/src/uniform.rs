// wayfarer/renderer/src/uniform.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Change-tracked uniform binding.
//!
//! Most uniforms (matrix, opacity, extrude scale) repeat across adjacent
//! draw calls of a multi-tile layer, so every slot caches the last value
//! written and compares with exact, element-wise equality before touching
//! the driver. This is the dominant mechanism for keeping driver traffic
//! off the per-tile hot path.

use wayfarer_gpu::{Device, UniformValue};

/// A list of named uniform values assembled for one draw call.
pub type UniformValues<'a> = &'a [(&'static str, UniformValue)];

/// A GPU-location-bound holder for one uniform value.
///
/// Slots are never shared across programs: each program resolves its own
/// locations at link time. A slot whose uniform was stripped by the shader
/// compiler carries no location and silently drops writes.
pub struct UniformSlot<D> where D: Device {
    location: Option<D::Uniform>,
    current: Option<UniformValue>,
}

impl<D> UniformSlot<D> where D: Device {
    pub fn new(location: Option<D::Uniform>) -> UniformSlot<D> {
        UniformSlot { location, current: None }
    }

    /// Writes the value to the GPU only when it differs from the value most
    /// recently written through this slot.
    pub fn set(&mut self, device: &D, value: &UniformValue) {
        if self.current.as_ref() == Some(value) {
            return;
        }
        if let Some(location) = &self.location {
            device.set_uniform(location, value);
        }
        self.current = Some(*value);
    }
}

/// An ordered name-to-slot mapping.
pub struct UniformSet<D> where D: Device {
    slots: Vec<(&'static str, UniformSlot<D>)>,
}

impl<D> UniformSet<D> where D: Device {
    /// Resolves a slot for every name against the given linked program.
    /// Names absent from the program are tolerated as unused.
    pub fn new(device: &D, program: &D::Program, names: &[&'static str]) -> UniformSet<D> {
        let slots = names
            .iter()
            .map(|&name| (name, UniformSlot::new(device.uniform_location(program, name))))
            .collect();
        UniformSet { slots }
    }

    pub fn empty() -> UniformSet<D> {
        UniformSet { slots: Vec::new() }
    }

    /// Returns the union of the two sets. Names present in `other` take
    /// precedence over this set's.
    pub fn concatenate(mut self, other: UniformSet<D>) -> UniformSet<D> {
        self.slots
            .retain(|(name, _)| !other.slots.iter().any(|(other_name, _)| other_name == name));
        self.slots.extend(other.slots);
        self
    }

    /// Forwards every recognized name in `values` to its slot. Unknown
    /// names are ignored, so program variants can share supersets of
    /// uniform value lists.
    pub fn set(&mut self, device: &D, values: UniformValues) {
        for &(name, ref value) in values {
            if let Some((_, slot)) = self.slots.iter_mut().find(|(slot_name, _)| *slot_name == name)
            {
                slot.set(device, value);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|(slot_name, _)| *slot_name == name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
