// wayfarer/renderer/src/painter.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The frame loop: render passes, depth and stencil policy, and the
//! program cache.

use fxhash::FxHashMap;
use std::collections::hash_map::Entry;
use wayfarer_geometry::vector::Vector2F;
use wayfarer_gpu::{BufferTarget, BufferUploadMode, ColorMode, DepthFunc, DepthMode, Device,
                   GpuError, StencilMode, VertexAttrType};

use crate::draw;
use crate::pattern::{DashAtlas, PatternAtlas};
use crate::program::{Program, ProgramConfiguration};
use crate::segment::{IndexBuffer, SegmentVector, VertexAttribute, VertexBuffer};
use crate::shaders::{ProgramKind, ShaderRegistry};
use crate::style::StyleLayer;
use crate::tile::{OverscaledTileId, TileCoord, TileSource, EXTENT};

/// One depth-buffer quantum. The depth range is carved into per-layer
/// sublayer bands this far apart.
const DEPTH_EPSILON: f32 = 1.0 / 65536.0;

/// Depth sublayers reserved per style layer.
const NUM_SUBLAYERS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPass {
    Opaque,
    Translucent,
}

/// The per-frame camera quantities the drivers need.
#[derive(Clone, Copy, Debug)]
pub struct TransformState {
    pub zoom: f32,
    pub camera_to_center_distance: f32,
    /// Half the viewport, in pixels: multiplying clip-space units by its
    /// reciprocal yields pixels.
    pub pixels_to_gl_units: Vector2F,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ProgramKey {
    kind: ProgramKind,
    configuration: String,
}

/// Compiled programs keyed by kind and attribute-layout variant.
///
/// A program that fails to compile or link is recorded and its error
/// returned on every later acquisition, so a broken layer stays disabled
/// without retrying compilation each frame.
pub struct ProgramCache<D> where D: Device {
    programs: FxHashMap<ProgramKey, Program<D>>,
    failed: FxHashMap<ProgramKey, GpuError>,
    active: Option<ProgramKey>,
    device_pixel_ratio: f32,
}

impl<D> ProgramCache<D> where D: Device {
    pub fn new(device_pixel_ratio: f32) -> ProgramCache<D> {
        ProgramCache {
            programs: FxHashMap::default(),
            failed: FxHashMap::default(),
            active: None,
            device_pixel_ratio,
        }
    }

    /// Fetches or builds the program and makes it current. The flag is
    /// true when this acquisition switched away from a different program,
    /// which is the signal drivers use to re-establish texture bindings.
    pub fn acquire(&mut self,
                   device: &D,
                   shaders: &ShaderRegistry,
                   kind: ProgramKind,
                   configuration: &ProgramConfiguration<D>)
                   -> Result<(&mut Program<D>, bool), GpuError> {
        let key = ProgramKey { kind, configuration: configuration.cache_key() };
        if let Some(error) = self.failed.get(&key) {
            return Err(error.clone());
        }

        let switched = self.active.as_ref() != Some(&key);
        let program = match self.programs.entry(key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!("compiling program '{}' [{}]", kind.name(), key.configuration);
                let program = match Program::new(device,
                                                 shaders,
                                                 kind,
                                                 configuration,
                                                 self.device_pixel_ratio) {
                    Ok(program) => program,
                    Err(error) => {
                        self.failed.insert(key, error.clone());
                        return Err(error);
                    }
                };
                entry.insert(program)
            }
        };

        if switched {
            device.use_program(program.native());
        }
        self.active = Some(key);
        Ok((program, switched))
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

/// Owns the frame loop and the render state policy. Fields are public so
/// the drivers in `draw` can borrow the device, the program cache, and the
/// shared tile-extent geometry independently.
pub struct Painter<D> where D: Device {
    pub device: D,
    pub shaders: ShaderRegistry,
    pub programs: ProgramCache<D>,
    pub transform: TransformState,
    pub render_pass: RenderPass,
    pub device_pixel_ratio: f32,

    current_layer: usize,
    clipping_masks: FxHashMap<OverscaledTileId, u32>,
    next_clipping_id: u32,

    /// A full-extent quad shared by background and raster-style draws.
    pub tile_extent_vertex_buffer: VertexBuffer<D>,
    pub tile_extent_index_buffer: IndexBuffer<D>,
    pub tile_extent_segments: SegmentVector<D>,
}

impl<D> Painter<D> where D: Device {
    pub fn new(device: D,
               shaders: ShaderRegistry,
               transform: TransformState,
               device_pixel_ratio: f32)
               -> Painter<D> {
        let extent = EXTENT as i16;
        let vertices: [i16; 8] = [0, 0, extent, 0, 0, extent, extent, extent];
        let indices: [u16; 6] = [0, 1, 2, 1, 3, 2];

        let vertex_buffer = device.create_buffer();
        device.upload_to_buffer(&vertex_buffer,
                                &vertices,
                                BufferTarget::Vertex,
                                BufferUploadMode::Static);
        let index_buffer = device.create_buffer();
        device.upload_to_buffer(&index_buffer,
                                &indices,
                                BufferTarget::Index,
                                BufferUploadMode::Static);

        let tile_extent_vertex_buffer = VertexBuffer {
            buffer: vertex_buffer,
            attributes: vec![VertexAttribute {
                name: "a_pos",
                size: 2,
                attr_type: VertexAttrType::I16,
                normalized: false,
                offset: 0,
            }],
            stride: 4,
        };

        Painter {
            device,
            shaders,
            programs: ProgramCache::new(device_pixel_ratio),
            transform,
            render_pass: RenderPass::Translucent,
            device_pixel_ratio,
            current_layer: 0,
            clipping_masks: FxHashMap::default(),
            next_clipping_id: 1,
            tile_extent_vertex_buffer,
            tile_extent_index_buffer: IndexBuffer { buffer: index_buffer },
            tile_extent_segments: SegmentVector::simple(4, 2),
        }
    }

    /// The depth band for sublayer `n` of the layer currently being drawn.
    /// Layers later in the opaque pass draw nearer, so an earlier layer's
    /// fragments never overwrite a later layer's.
    pub fn depth_mode_for_sublayer(&self, n: usize, write: bool) -> DepthMode {
        let depth = 1.0
            - ((1 + self.current_layer) * NUM_SUBLAYERS + n) as f32 * DEPTH_EPSILON;
        DepthMode {
            func: DepthFunc::LessOrEqual,
            write,
            range: [depth, 1.0],
        }
    }

    pub fn color_mode_for_render_pass(&self) -> ColorMode {
        match self.render_pass {
            RenderPass::Opaque => ColorMode::unblended(),
            RenderPass::Translucent => ColorMode::alpha_blended(),
        }
    }

    /// The stencil test confining a draw to the tile's clipping region.
    /// References are assigned per frame in coordinate order; the space is
    /// 8 bits, so a frame with 255+ tiles wraps and restarts at 1.
    pub fn stencil_mode_for_clipping(&mut self, id: OverscaledTileId) -> StencilMode {
        let next_clipping_id = &mut self.next_clipping_id;
        let reference = *self.clipping_masks.entry(id).or_insert_with(|| {
            let reference = *next_clipping_id;
            *next_clipping_id = if *next_clipping_id >= 255 { 1 } else { *next_clipping_id + 1 };
            reference
        });
        StencilMode::clipped_to(reference)
    }

    /// Draws one frame: an opaque pass walking the layers top to bottom,
    /// then a translucent pass walking them bottom to top. A layer whose
    /// program cannot be built is skipped with a warning; the frame
    /// continues.
    pub fn render<S, A, L>(&mut self,
                           layers: &[StyleLayer],
                           source: &mut S,
                           pattern_atlas: &A,
                           dash_atlas: &L,
                           coords: &[TileCoord])
    where S: TileSource<D>, A: PatternAtlas<D>, L: DashAtlas<D> {
        self.clipping_masks.clear();
        self.next_clipping_id = 1;

        self.render_pass = RenderPass::Opaque;
        for (index, layer) in layers.iter().enumerate().rev() {
            self.current_layer = index;
            self.draw_layer(layer, source, pattern_atlas, dash_atlas, coords);
        }

        self.render_pass = RenderPass::Translucent;
        for (index, layer) in layers.iter().enumerate() {
            self.current_layer = index;
            self.draw_layer(layer, source, pattern_atlas, dash_atlas, coords);
        }
    }

    fn draw_layer<S, A, L>(&mut self,
                           layer: &StyleLayer,
                           source: &mut S,
                           pattern_atlas: &A,
                           dash_atlas: &L,
                           coords: &[TileCoord])
    where S: TileSource<D>, A: PatternAtlas<D>, L: DashAtlas<D> {
        if let Err(error) = draw::draw_layer(self, layer, source, pattern_atlas, dash_atlas,
                                             coords) {
            warn!("layer '{}' disabled for this frame: {}", layer.id, error);
        }
    }
}
