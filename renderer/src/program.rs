// wayfarer/renderer/src/program.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Linked shader programs and the batched draw entry point.

use fxhash::FxHashMap;
use wayfarer_gpu::{ColorMode, DepthMode, Device, DrawMode, GpuError, ShaderKind, StencilMode};
use wayfarer_gpu::UniformValue;

use crate::segment::{IndexBuffer, SegmentVector, VertexBuffer, INDEX_BYTE_WIDTH};
use crate::shaders::{self, ProgramKind, ShaderRegistry};
use crate::uniform::{UniformSet, UniformValues};

/// Per-layer-instance description of how paint properties reach the
/// shader: data-driven properties are baked into paint vertex buffers on
/// the geometry-build side, while constant-across-tile properties stay
/// scalar and are pushed through the dynamic uniform set.
///
/// The paint buffers exposed here must match the attribute layout the
/// program was linked against; the defines select that layout.
pub struct ProgramConfiguration<D> where D: Device {
    pub defines: Vec<String>,
    /// Names of the dynamic uniforms this configuration pushes.
    pub binder_uniforms: Vec<&'static str>,
    /// Current evaluations of those uniforms. Refreshed by the style side
    /// on zoom changes; constant within one layer activation.
    pub binder_values: Vec<(&'static str, UniformValue)>,
    pub paint_vertex_buffers: Vec<VertexBuffer<D>>,
}

impl<D> ProgramConfiguration<D> where D: Device {
    pub fn empty() -> ProgramConfiguration<D> {
        ProgramConfiguration {
            defines: Vec::new(),
            binder_uniforms: Vec::new(),
            binder_values: Vec::new(),
            paint_vertex_buffers: Vec::new(),
        }
    }

    /// Distinguishes program variants linked against different attribute
    /// layouts of the same kind.
    pub fn cache_key(&self) -> String {
        self.defines.join(",")
    }
}

/// One linked program: its attribute location table, a static uniform set
/// written on every draw call, and a dynamic uniform set written once per
/// layer activation.
///
/// The native handle is owned exclusively by this struct and released by
/// the device backend when it drops.
pub struct Program<D> where D: Device {
    native: D::Program,
    attributes: FxHashMap<String, u32>,
    static_uniforms: UniformSet<D>,
    dynamic_uniforms: UniformSet<D>,
}

impl<D> Program<D> where D: Device {
    pub fn new(device: &D,
               registry: &ShaderRegistry,
               kind: ProgramKind,
               configuration: &ProgramConfiguration<D>,
               device_pixel_ratio: f32)
               -> Result<Program<D>, GpuError> {
        let source = registry.get(kind)?;
        let prelude = registry.prelude();

        let mut defines = configuration.defines.clone();
        defines.push(format!("#define DEVICE_PIXEL_RATIO {:.1}", device_pixel_ratio));
        let preamble = defines.join("\n");

        let vertex_source = format!("{}\n{}\n{}", preamble, prelude.vertex, source.vertex);
        let fragment_source = format!("{}\n{}\n{}", preamble, prelude.fragment, source.fragment);

        let name = kind.name();
        let vertex_shader = device.create_shader(name, &vertex_source, ShaderKind::Vertex)?;
        let fragment_shader = device.create_shader(name, &fragment_source, ShaderKind::Fragment)?;
        let native = device.create_program(name,
                                           vertex_shader,
                                           fragment_shader,
                                           kind.layout_attributes())?;

        let attributes = device.active_attributes(&native).into_iter().collect();
        let static_uniforms = shaders::static_uniforms(device, &native, kind);
        let dynamic_uniforms = UniformSet::new(device, &native, &configuration.binder_uniforms);

        Ok(Program { native, attributes, static_uniforms, dynamic_uniforms })
    }

    #[inline]
    pub fn native(&self) -> &D::Program {
        &self.native
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    /// Applies the render-state policy, writes uniforms, and issues one
    /// element draw per segment.
    ///
    /// `uniform_values` are written unconditionally. `dynamic_values` are
    /// layer-wide, not tile-wide: they are written only when `first` is
    /// set, i.e. on the first tile drawn after this layer became active in
    /// the current pass.
    pub fn draw(&mut self,
                device: &D,
                draw_mode: DrawMode,
                depth_mode: &DepthMode,
                stencil_mode: &StencilMode,
                color_mode: &ColorMode,
                uniform_values: UniformValues,
                dynamic_values: UniformValues,
                layer_id: &str,
                layout_vertex_buffer: &VertexBuffer<D>,
                index_buffer: &IndexBuffer<D>,
                segments: &mut SegmentVector<D>,
                paint_vertex_buffers: &[VertexBuffer<D>],
                dynamic_vertex_buffer: Option<&VertexBuffer<D>>,
                first: bool) {
        device.set_depth_mode(depth_mode);
        device.set_stencil_mode(stencil_mode);
        device.set_color_mode(color_mode);

        self.static_uniforms.set(device, uniform_values);
        if first {
            self.dynamic_uniforms.set(device, dynamic_values);
        }

        let vertices_per_primitive = draw_mode.vertices_per_primitive();
        for segment in segments.iter_mut() {
            segment.bind(device,
                         &self.attributes,
                         layer_id,
                         layout_vertex_buffer,
                         paint_vertex_buffers,
                         index_buffer,
                         dynamic_vertex_buffer);
            device.draw_elements(
                draw_mode,
                segment.primitive_length() * vertices_per_primitive,
                segment.primitive_offset() * vertices_per_primitive * INDEX_BYTE_WIDTH,
            );
        }
    }
}
