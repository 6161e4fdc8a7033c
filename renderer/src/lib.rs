// wayfarer/renderer/src/lib.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The GPU draw-submission core of the Wayfarer tiled-map renderer.
//!
//! This crate compiles and links shader programs, binds typed uniform
//! values with change tracking, batches geometry into index-range-safe
//! segments, and issues the per-tile draw calls for each style layer under
//! the two-pass (opaque, then translucent) frame order. Tile loading,
//! tessellation, style evaluation, and map projection are collaborators;
//! the low-level graphics state is consumed through `wayfarer_gpu::Device`.

#[macro_use]
extern crate log;

pub(crate) mod draw;
pub mod painter;
pub mod pattern;
pub mod program;
pub mod segment;
pub mod shaders;
pub mod style;
pub mod tile;
pub mod uniform;

#[cfg(test)]
pub(crate) mod test_device;
