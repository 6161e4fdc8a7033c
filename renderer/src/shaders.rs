// wayfarer/renderer/src/shaders.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Program kinds, shader sources, and per-kind uniform declarations.

use fxhash::FxHashMap;
use wayfarer_gpu::{Device, GpuError};

use crate::uniform::UniformSet;

/// The closed set of programs the draw drivers select from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Background,
    BackgroundPattern,
    Circle,
    Line,
    LineSdf,
    LinePattern,
}

impl ProgramKind {
    pub fn name(self) -> &'static str {
        match self {
            ProgramKind::Background => "background",
            ProgramKind::BackgroundPattern => "background_pattern",
            ProgramKind::Circle => "circle",
            ProgramKind::Line => "line",
            ProgramKind::LineSdf => "line_sdf",
            ProgramKind::LinePattern => "line_pattern",
        }
    }

    /// Declared attribute order, bound to consecutive locations before
    /// linking. Without this, a linker is free to place an unused
    /// attribute at location 0, which breaks rendering for the whole
    /// layer on the draw that follows.
    pub fn layout_attributes(self) -> &'static [&'static str] {
        match self {
            ProgramKind::Background | ProgramKind::BackgroundPattern => &["a_pos"],
            ProgramKind::Circle => &["a_pos"],
            ProgramKind::Line | ProgramKind::LineSdf | ProgramKind::LinePattern => {
                &["a_pos_normal", "a_data"]
            }
        }
    }
}

/// One program's GLSL text. The text is opaque to this crate; it is
/// concatenated with the define preamble and the prelude before
/// compilation.
#[derive(Clone, Debug)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> ShaderSource {
        ShaderSource { vertex: vertex.into(), fragment: fragment.into() }
    }
}

/// Maps program kinds to their shader text. Populated by the embedder at
/// startup; a kind with no registered source fails program acquisition
/// the same way a link error would.
pub struct ShaderRegistry {
    prelude: ShaderSource,
    sources: FxHashMap<ProgramKind, ShaderSource>,
}

impl ShaderRegistry {
    pub fn new(prelude: ShaderSource) -> ShaderRegistry {
        ShaderRegistry { prelude, sources: FxHashMap::default() }
    }

    pub fn register(&mut self, kind: ProgramKind, source: ShaderSource) {
        self.sources.insert(kind, source);
    }

    pub fn prelude(&self) -> &ShaderSource {
        &self.prelude
    }

    pub fn get(&self, kind: ProgramKind) -> Result<&ShaderSource, GpuError> {
        self.sources.get(&kind).ok_or(GpuError::UnknownProgram(kind.name()))
    }
}

pub(crate) const PATTERN_UNIFORM_NAMES: &[&str] = &[
    "u_image",
    "u_pattern_tl_a",
    "u_pattern_br_a",
    "u_pattern_tl_b",
    "u_pattern_br_b",
    "u_texsize",
    "u_mix",
    "u_pattern_size_a",
    "u_pattern_size_b",
    "u_scale_a",
    "u_scale_b",
    "u_pixel_coord_upper",
    "u_pixel_coord_lower",
    "u_tile_units_to_pixels",
];

fn pattern_uniforms<D>(device: &D, program: &D::Program) -> UniformSet<D> where D: Device {
    UniformSet::new(device, program, PATTERN_UNIFORM_NAMES)
}

fn line_uniforms<D>(device: &D, program: &D::Program) -> UniformSet<D> where D: Device {
    UniformSet::new(device, program, &["u_matrix", "u_ratio", "u_gl_units_to_pixels"])
}

/// Builds the static uniform set for a linked program of the given kind.
/// Pattern variants compose a base set with the shared pattern uniforms.
pub fn static_uniforms<D>(device: &D, program: &D::Program, kind: ProgramKind) -> UniformSet<D>
where D: Device {
    match kind {
        ProgramKind::Background => {
            UniformSet::new(device, program, &["u_matrix", "u_opacity", "u_color"])
        }
        ProgramKind::BackgroundPattern => {
            UniformSet::new(device, program, &["u_matrix", "u_opacity"])
                .concatenate(pattern_uniforms(device, program))
        }
        ProgramKind::Circle => UniformSet::new(device, program, &[
            "u_matrix",
            "u_camera_to_center_distance",
            "u_scale_with_map",
            "u_pitch_with_map",
            "u_extrude_scale",
        ]),
        ProgramKind::Line => line_uniforms(device, program),
        ProgramKind::LineSdf => {
            line_uniforms(device, program).concatenate(UniformSet::new(device, program, &[
                "u_patternscale_a",
                "u_patternscale_b",
                "u_sdfgamma",
                "u_image",
                "u_tex_y_a",
                "u_tex_y_b",
                "u_mix",
            ]))
        }
        ProgramKind::LinePattern => {
            line_uniforms(device, program).concatenate(pattern_uniforms(device, program))
        }
    }
}
