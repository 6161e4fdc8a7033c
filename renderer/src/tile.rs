// wayfarer/renderer/src/tile.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Loaded tiles and their per-layer GPU buckets.

use fxhash::FxHashMap;
use wayfarer_geometry::transform::Transform4F;
use wayfarer_gpu::Device;

use crate::program::ProgramConfiguration;
use crate::segment::{IndexBuffer, SegmentVector, VertexBuffer};

/// Tile-local coordinates span [0, EXTENT) regardless of tile size on
/// screen.
pub const EXTENT: f32 = 8192.0;

/// A tile address. `z` is the overscaled zoom, so the same wrapped tile may
/// appear at several addresses when overzoomed past its source maxzoom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverscaledTileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl OverscaledTileId {
    pub fn new(z: u8, x: u32, y: u32) -> OverscaledTileId {
        OverscaledTileId { z, x, y }
    }
}

/// A tile scheduled for this frame, paired with its projection for the
/// current camera.
#[derive(Clone, Copy, Debug)]
pub struct TileCoord {
    pub id: OverscaledTileId,
    pub pos_matrix: Transform4F,
}

/// Converts a screen-pixel quantity into tile units at the given zoom.
/// Fractional zoom scales continuously between the integer tile pyramid
/// levels.
pub fn pixels_to_tile_units(tile_zoom: u8, tile_size: f32, pixel_value: f32, zoom: f32) -> f32 {
    pixel_value * EXTENT / (tile_size * 2f32.powf(zoom - f32::from(tile_zoom)))
}

/// The GPU-resident geometry of one layer within one tile.
pub struct Bucket<D> where D: Device {
    pub layout_vertex_buffer: VertexBuffer<D>,
    pub index_buffer: IndexBuffer<D>,
    pub segments: SegmentVector<D>,
    /// Paint-property configurations keyed by style layer id. Several
    /// layers may share one bucket's geometry with different paint data.
    pub configurations: FxHashMap<String, ProgramConfiguration<D>>,
}

pub struct Tile<D> where D: Device {
    pub id: OverscaledTileId,
    /// Source tile size in screen pixels at integer zoom, typically 512.
    pub tile_size: f32,
    /// Buckets keyed by style layer id.
    pub buckets: FxHashMap<String, Bucket<D>>,
}

impl<D> Tile<D> where D: Device {
    pub fn new(id: OverscaledTileId, tile_size: f32) -> Tile<D> {
        Tile { id, tile_size, buckets: FxHashMap::default() }
    }
}

/// Supplies loaded tiles to the frame loop. Tiles missing or still loading
/// return `None` and the frame draws without them.
pub trait TileSource<D> where D: Device {
    fn get_tile(&mut self, id: OverscaledTileId) -> Option<&mut Tile<D>>;
}
