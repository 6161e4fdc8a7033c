// wayfarer/gpu/src/lib.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Minimal abstraction over the graphics-state capabilities the draw core
//! consumes.
//!
//! The renderer never issues raw GL-equivalent calls itself; everything goes
//! through a [`Device`]. Backends are expected to make the state setters
//! (`set_depth_mode` and friends) internally idempotent, and to release
//! native handles when the associated types drop.

#[macro_use]
extern crate bitflags;

use wayfarer_geometry::transform::Transform4F;
use wayfarer_geometry::vector::Vector2F;

pub trait Device {
    type Buffer;
    type Program;
    type Shader;
    type Texture;
    type Uniform;
    type VertexArray;

    /// Compiles one shader stage. A failure carries the compiler log.
    fn create_shader(&self, name: &str, source: &str, kind: ShaderKind)
                     -> Result<Self::Shader, GpuError>;

    /// Links a program from two compiled stages.
    ///
    /// `attribute_order` is bound to locations 0, 1, 2, … before linking, so
    /// the slot assignment is deterministic regardless of what the compiler
    /// would pick. A failure carries the linker log.
    fn create_program(&self,
                      name: &str,
                      vertex_shader: Self::Shader,
                      fragment_shader: Self::Shader,
                      attribute_order: &[&str])
                      -> Result<Self::Program, GpuError>;

    /// Returns the active attributes of a linked program with their
    /// locations.
    fn active_attributes(&self, program: &Self::Program) -> Vec<(String, u32)>;

    /// Looks up a uniform location. Returns `None` when the compiler
    /// stripped the uniform; callers must tolerate that.
    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::Uniform>;

    fn use_program(&self, program: &Self::Program);
    fn set_uniform(&self, uniform: &Self::Uniform, value: &UniformValue);

    fn create_vertex_array(&self) -> Self::VertexArray;
    fn bind_vertex_array(&self, vertex_array: &Self::VertexArray);

    fn create_buffer(&self) -> Self::Buffer;
    fn upload_to_buffer<T>(&self,
                           buffer: &Self::Buffer,
                           data: &[T],
                           target: BufferTarget,
                           mode: BufferUploadMode);
    fn bind_buffer(&self, buffer: &Self::Buffer, target: BufferTarget);
    fn configure_vertex_attr(&self, location: u32, descriptor: &VertexAttrDescriptor);

    fn set_depth_mode(&self, depth_mode: &DepthMode);
    fn set_stencil_mode(&self, stencil_mode: &StencilMode);
    fn set_color_mode(&self, color_mode: &ColorMode);
    fn set_active_texture(&self, unit: u32);
    fn bind_texture(&self, texture: &Self::Texture, unit: u32);

    fn draw_elements(&self, mode: DrawMode, index_count: u32, byte_offset: u32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

#[derive(Clone, Copy, Debug)]
pub enum BufferTarget {
    Vertex,
    Index,
}

#[derive(Clone, Copy, Debug)]
pub enum BufferUploadMode {
    Static,
    Dynamic,
}

/// Index-addressed primitive topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Lines,
    Triangles,
}

impl DrawMode {
    /// The vertex count per primitive. Fixed per topology; never derived
    /// from runtime introspection.
    #[inline]
    pub fn vertices_per_primitive(self) -> u32 {
        match self {
            DrawMode::Lines => 2,
            DrawMode::Triangles => 3,
        }
    }
}

/// A typed uniform payload. Equality is exact and element-wise; the
/// renderer relies on this to skip redundant driver writes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2(Vector2F),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4(Transform4F),
    TextureUnit(u32),
}

#[derive(Clone, Copy, Debug)]
pub enum VertexAttrType {
    F32,
    I16,
    U16,
    U8,
}

#[derive(Clone, Copy, Debug)]
pub struct VertexAttrDescriptor {
    pub size: usize,
    pub attr_type: VertexAttrType,
    pub normalized: bool,
    pub stride: usize,
    pub offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthMode {
    pub func: DepthFunc,
    pub write: bool,
    /// Depth range `[near, far]`, used to stack sublayers without
    /// z-fighting.
    pub range: [f32; 2],
}

impl DepthMode {
    #[inline]
    pub fn read_only(func: DepthFunc, range: [f32; 2]) -> DepthMode {
        DepthMode { func, write: false, range }
    }

    #[inline]
    pub fn read_write(func: DepthFunc, range: [f32; 2]) -> DepthMode {
        DepthMode { func, write: true, range }
    }

    #[inline]
    pub fn disabled() -> DepthMode {
        DepthMode { func: DepthFunc::Always, write: false, range: [0.0, 1.0] }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DepthFunc {
    Less,
    LessOrEqual,
    Always,
}

impl Default for DepthFunc {
    #[inline]
    fn default() -> DepthFunc {
        DepthFunc::LessOrEqual
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StencilMode {
    pub func: StencilFunc,
    pub reference: u32,
    pub mask: u32,
    pub write: bool,
}

impl StencilMode {
    #[inline]
    pub fn disabled() -> StencilMode {
        StencilMode { func: StencilFunc::Always, reference: 0, mask: 0, write: false }
    }

    /// Passes only where the stencil buffer holds `reference`; used to clip
    /// draws to the tile that stamped that value.
    #[inline]
    pub fn clipped_to(reference: u32) -> StencilMode {
        StencilMode { func: StencilFunc::Equal, reference, mask: 0xff, write: false }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StencilFunc {
    Always,
    Equal,
    NotEqual,
}

bitflags! {
    /// Per-channel color write mask.
    pub struct ColorWriteMask: u8 {
        const RED   = 0x01;
        const GREEN = 0x02;
        const BLUE  = 0x04;
        const ALPHA = 0x08;
    }
}

impl Default for ColorWriteMask {
    #[inline]
    fn default() -> ColorWriteMask {
        ColorWriteMask::all()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMode {
    pub blend: BlendState,
    /// The constant blend color, for blend factors that reference one.
    pub blend_color: [f32; 4],
    pub mask: ColorWriteMask,
}

impl ColorMode {
    /// Straight overwrite, as used by the opaque pass.
    #[inline]
    pub fn unblended() -> ColorMode {
        ColorMode {
            blend: BlendState::Off,
            blend_color: [0.0; 4],
            mask: ColorWriteMask::all(),
        }
    }

    /// Premultiplied source-over, as used by the translucent pass.
    #[inline]
    pub fn alpha_blended() -> ColorMode {
        ColorMode {
            blend: BlendState::OneOneMinusSrcAlpha,
            blend_color: [0.0; 4],
            mask: ColorWriteMask::all(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlendState {
    Off,
    OneOneMinusSrcAlpha,
    SrcAlphaOneMinusSrcAlpha,
}

/// Fatal program-acquisition failures. Per the error contract, the caller
/// abandons rendering for the affected program kind; the frame loop itself
/// survives.
#[derive(Clone, Debug, thiserror::Error)]
pub enum GpuError {
    #[error("{kind:?} shader '{name}' failed to compile: {log}")]
    ShaderCompile { name: String, kind: ShaderKind, log: String },
    #[error("program '{name}' failed to link: {log}")]
    ProgramLink { name: String, log: String },
    #[error("no shader source registered for program '{0}'")]
    UnknownProgram(&'static str),
}
