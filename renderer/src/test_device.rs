// wayfarer/renderer/src/test_device.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A recording `Device` backend for tests, plus canned scenes.

use fxhash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use wayfarer_geometry::rect::RectF;
use wayfarer_geometry::transform::Transform4F;
use wayfarer_geometry::vector::Vector2F;
use wayfarer_gpu::{BufferTarget, BufferUploadMode, ColorMode, DepthMode, Device, DrawMode,
                   GpuError, ShaderKind, StencilMode, UniformValue, VertexAttrDescriptor,
                   VertexAttrType};

use crate::painter::{Painter, TransformState};
use crate::pattern::{DashAtlas, DashPosition, ImagePosition, PatternAtlas};
use crate::segment::{IndexBuffer, SegmentVector, VertexAttribute, VertexBuffer};
use crate::shaders::{ProgramKind, ShaderRegistry, ShaderSource};
use crate::style::StyleLayer;
use crate::tile::{Bucket, OverscaledTileId, Tile, TileCoord, TileSource};

#[derive(Clone, Debug)]
pub enum Call {
    CreateShader { name: String, kind: ShaderKind },
    CreateProgram(u32),
    UseProgram(u32),
    SetUniform { name: String, value: UniformValue },
    CreateVertexArray(u32),
    BindVertexArray(u32),
    CreateBuffer(u32),
    UploadToBuffer { buffer: u32, target: BufferTarget },
    BindBuffer { buffer: u32, target: BufferTarget },
    ConfigureVertexAttr { location: u32, descriptor: VertexAttrDescriptor },
    SetDepthMode(DepthMode),
    SetStencilMode(StencilMode),
    SetColorMode(ColorMode),
    SetActiveTexture(u32),
    BindTexture { texture: u32, unit: u32 },
    DrawElements { mode: DrawMode, index_count: u32, byte_offset: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TestUniform {
    pub program: u32,
    pub name: String,
}

/// Records every call it receives and hands out integer handles.
pub struct TestDevice {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u32>,
    attributes: RefCell<FxHashMap<u32, Vec<String>>>,
    stripped: RefCell<HashSet<String>>,
    compile_failure: Option<String>,
    link_failure: Option<String>,
    compile_count: Cell<usize>,
}

impl TestDevice {
    pub fn new() -> TestDevice {
        TestDevice {
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            attributes: RefCell::new(FxHashMap::default()),
            stripped: RefCell::new(HashSet::new()),
            compile_failure: None,
            link_failure: None,
            compile_count: Cell::new(0),
        }
    }

    /// A device whose shader compiler always fails with the given log.
    pub fn failing_compile(log: &str) -> TestDevice {
        let mut device = TestDevice::new();
        device.compile_failure = Some(log.to_owned());
        device
    }

    /// A device that compiles but always fails to link, with the given log.
    pub fn failing_link(log: &str) -> TestDevice {
        let mut device = TestDevice::new();
        device.link_failure = Some(log.to_owned());
        device
    }

    /// Makes `uniform_location` return `None` for `name`, as a real
    /// compiler does for uniforms it optimized away.
    pub fn strip_uniform(&self, name: &str) {
        self.stripped.borrow_mut().insert(name.to_owned());
    }

    /// A linked program handle without going through shader compilation.
    pub fn linked_program(&self, attribute_order: &[&str]) -> u32 {
        let id = self.take_id();
        self.attributes
            .borrow_mut()
            .insert(id, attribute_order.iter().map(|&name| name.to_owned()).collect());
        id
    }

    /// A unit quad with the standard tile-geometry layout.
    pub fn quad_buffers(&self) -> (VertexBuffer<TestDevice>, IndexBuffer<TestDevice>) {
        let vertices: [i16; 8] = [0, 0, 1, 0, 0, 1, 1, 1];
        let indices: [u16; 6] = [0, 1, 2, 1, 3, 2];

        let vertex_buffer = self.create_buffer();
        self.upload_to_buffer(&vertex_buffer, &vertices, BufferTarget::Vertex,
                              BufferUploadMode::Static);
        let index_buffer = self.create_buffer();
        self.upload_to_buffer(&index_buffer, &indices, BufferTarget::Index,
                              BufferUploadMode::Static);

        let layout = VertexBuffer {
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
        (layout, IndexBuffer { buffer: index_buffer })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn uniform_writes(&self, name: &str) -> Vec<UniformValue> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::SetUniform { name: written, value } if written == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn draw_calls(&self) -> Vec<(DrawMode, u32, u32)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::DrawElements { mode, index_count, byte_offset } => {
                    Some((*mode, *index_count, *byte_offset))
                }
                _ => None,
            })
            .collect()
    }

    pub fn shader_compile_count(&self) -> usize {
        self.compile_count.get()
    }

    fn take_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Device for TestDevice {
    type Buffer = u32;
    type Program = u32;
    type Shader = u32;
    type Texture = u32;
    type Uniform = TestUniform;
    type VertexArray = u32;

    fn create_shader(&self, name: &str, _source: &str, kind: ShaderKind)
                     -> Result<u32, GpuError> {
        self.compile_count.set(self.compile_count.get() + 1);
        self.log(Call::CreateShader { name: name.to_owned(), kind });
        match self.compile_failure {
            Some(ref log) => Err(GpuError::ShaderCompile {
                name: name.to_owned(),
                kind,
                log: log.clone(),
            }),
            None => Ok(self.take_id()),
        }
    }

    fn create_program(&self,
                      name: &str,
                      _vertex_shader: u32,
                      _fragment_shader: u32,
                      attribute_order: &[&str])
                      -> Result<u32, GpuError> {
        if let Some(ref log) = self.link_failure {
            return Err(GpuError::ProgramLink { name: name.to_owned(), log: log.clone() });
        }
        let id = self.take_id();
        self.attributes
            .borrow_mut()
            .insert(id, attribute_order.iter().map(|&name| name.to_owned()).collect());
        self.log(Call::CreateProgram(id));
        Ok(id)
    }

    fn active_attributes(&self, program: &u32) -> Vec<(String, u32)> {
        self.attributes
            .borrow()
            .get(program)
            .map(|names| {
                names
                    .iter()
                    .enumerate()
                    .map(|(location, name)| (name.clone(), location as u32))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<TestUniform> {
        if self.stripped.borrow().contains(name) {
            return None;
        }
        Some(TestUniform { program: *program, name: name.to_owned() })
    }

    fn use_program(&self, program: &u32) {
        self.log(Call::UseProgram(*program));
    }

    fn set_uniform(&self, uniform: &TestUniform, value: &UniformValue) {
        self.log(Call::SetUniform { name: uniform.name.clone(), value: *value });
    }

    fn create_vertex_array(&self) -> u32 {
        let id = self.take_id();
        self.log(Call::CreateVertexArray(id));
        id
    }

    fn bind_vertex_array(&self, vertex_array: &u32) {
        self.log(Call::BindVertexArray(*vertex_array));
    }

    fn create_buffer(&self) -> u32 {
        let id = self.take_id();
        self.log(Call::CreateBuffer(id));
        id
    }

    fn upload_to_buffer<T>(&self,
                           buffer: &u32,
                           _data: &[T],
                           target: BufferTarget,
                           _mode: BufferUploadMode) {
        self.log(Call::UploadToBuffer { buffer: *buffer, target });
    }

    fn bind_buffer(&self, buffer: &u32, target: BufferTarget) {
        self.log(Call::BindBuffer { buffer: *buffer, target });
    }

    fn configure_vertex_attr(&self, location: u32, descriptor: &VertexAttrDescriptor) {
        self.log(Call::ConfigureVertexAttr { location, descriptor: *descriptor });
    }

    fn set_depth_mode(&self, depth_mode: &DepthMode) {
        self.log(Call::SetDepthMode(*depth_mode));
    }

    fn set_stencil_mode(&self, stencil_mode: &StencilMode) {
        self.log(Call::SetStencilMode(*stencil_mode));
    }

    fn set_color_mode(&self, color_mode: &ColorMode) {
        self.log(Call::SetColorMode(*color_mode));
    }

    fn set_active_texture(&self, unit: u32) {
        self.log(Call::SetActiveTexture(unit));
    }

    fn bind_texture(&self, texture: &u32, unit: u32) {
        self.log(Call::BindTexture { texture: *texture, unit });
    }

    fn draw_elements(&self, mode: DrawMode, index_count: u32, byte_offset: u32) {
        self.log(Call::DrawElements { mode, index_count, byte_offset });
    }
}

/// A registry with placeholder sources for every program kind.
pub fn test_registry() -> ShaderRegistry {
    let mut registry = ShaderRegistry::new(ShaderSource::new("precision highp float;", ""));
    for &kind in &[ProgramKind::Background,
                   ProgramKind::BackgroundPattern,
                   ProgramKind::Circle,
                   ProgramKind::Line,
                   ProgramKind::LineSdf,
                   ProgramKind::LinePattern] {
        registry.register(kind, ShaderSource::new("void main() {}", "void main() {}"));
    }
    registry
}

pub fn painter_with_device(device: TestDevice) -> Painter<TestDevice> {
    let transform = TransformState {
        zoom: 3.6,
        camera_to_center_distance: 850.0,
        pixels_to_gl_units: Vector2F::new(2.0 / 1024.0, -2.0 / 768.0),
    };
    Painter::new(device, test_registry(), transform, 1.0)
}

pub fn test_painter() -> Painter<TestDevice> {
    painter_with_device(TestDevice::new())
}

pub struct TestPatternAtlas {
    positions: FxHashMap<String, ImagePosition>,
    texture_size: Vector2F,
    texture: u32,
}

impl TestPatternAtlas {
    pub fn new(texture_size: Vector2F) -> TestPatternAtlas {
        TestPatternAtlas { positions: FxHashMap::default(), texture_size, texture: 0 }
    }

    pub fn add(&mut self, name: &str, position: ImagePosition) {
        self.positions.insert(name.to_owned(), position);
    }
}

impl PatternAtlas<TestDevice> for TestPatternAtlas {
    fn position(&self, name: &str) -> Option<ImagePosition> {
        self.positions.get(name).copied()
    }

    fn texture_size(&self) -> Vector2F {
        self.texture_size
    }

    fn bind(&self, device: &TestDevice) {
        device.bind_texture(&self.texture, 0);
    }
}

pub struct TestDashAtlas {
    width: f32,
    texture: u32,
}

impl TestDashAtlas {
    pub fn new(width: f32) -> TestDashAtlas {
        TestDashAtlas { width, texture: 0 }
    }
}

impl DashAtlas<TestDevice> for TestDashAtlas {
    fn dash(&self, dasharray: &[f32], _round_cap: bool) -> Option<DashPosition> {
        if dasharray.is_empty() {
            return None;
        }
        Some(DashPosition { y: 0.5, height: 8.0, width: dasharray.iter().sum() })
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn bind(&self, device: &TestDevice) {
        device.bind_texture(&self.texture, 0);
    }
}

pub struct TestTileSource {
    tiles: FxHashMap<OverscaledTileId, Tile<TestDevice>>,
}

impl TileSource<TestDevice> for TestTileSource {
    fn get_tile(&mut self, id: OverscaledTileId) -> Option<&mut Tile<TestDevice>> {
        self.tiles.get_mut(&id)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SceneOptions {
    /// Leave the last coordinate's tile unloaded.
    pub drop_last_tile: bool,
}

/// A painter plus two loaded tiles carrying "poi" and "roads" buckets, a
/// pattern atlas with "dots" and "stripes" resident, and a dash atlas.
pub struct TestScene {
    pub painter: Painter<TestDevice>,
    pub source: TestTileSource,
    pub pattern_atlas: TestPatternAtlas,
    pub dash_atlas: TestDashAtlas,
    pub coords: Vec<TileCoord>,
}

impl TestScene {
    pub fn render(&mut self, layers: &[StyleLayer]) {
        self.painter.render(layers,
                            &mut self.source,
                            &self.pattern_atlas,
                            &self.dash_atlas,
                            &self.coords);
    }

    pub fn depth_modes_at_draws(&self) -> Vec<DepthMode> {
        self.modes_at_draws(|call| match call {
            Call::SetDepthMode(mode) => Some(*mode),
            _ => None,
        })
    }

    pub fn stencil_modes_at_draws(&self) -> Vec<StencilMode> {
        self.modes_at_draws(|call| match call {
            Call::SetStencilMode(mode) => Some(*mode),
            _ => None,
        })
    }

    pub fn color_modes_at_draws(&self) -> Vec<ColorMode> {
        self.modes_at_draws(|call| match call {
            Call::SetColorMode(mode) => Some(*mode),
            _ => None,
        })
    }

    /// The most recent state of one kind at the time of each draw call.
    fn modes_at_draws<M>(&self, mut select: impl FnMut(&Call) -> Option<M>) -> Vec<M>
    where M: Copy {
        let mut current = None;
        let mut modes = Vec::new();
        for call in self.painter.device.calls() {
            if let Some(mode) = select(&call) {
                current = Some(mode);
            }
            if let Call::DrawElements { .. } = call {
                modes.push(current.unwrap());
            }
        }
        modes
    }
}

pub fn test_scene(options: SceneOptions) -> TestScene {
    let painter = test_painter();

    let ids = [OverscaledTileId::new(3, 1, 2), OverscaledTileId::new(3, 1, 3)];
    let coords: Vec<TileCoord> = ids
        .iter()
        .map(|&id| TileCoord { id, pos_matrix: Transform4F::default() })
        .collect();

    let mut tiles = FxHashMap::default();
    let loaded = if options.drop_last_tile { &ids[..ids.len() - 1] } else { &ids[..] };
    for &id in loaded {
        let mut tile = Tile::new(id, 512.0);
        for layer_id in &["poi", "roads"] {
            tile.buckets.insert((*layer_id).to_owned(), test_bucket(&painter.device));
        }
        tiles.insert(id, tile);
    }

    let mut pattern_atlas = TestPatternAtlas::new(Vector2F::new(512.0, 512.0));
    for (index, name) in ["dots", "stripes"].iter().enumerate() {
        pattern_atlas.add(name, ImagePosition {
            padded_rect: RectF::new(Vector2F::new(64.0 * index as f32, 0.0),
                                    Vector2F::new(34.0, 18.0)),
            pixel_ratio: 1.0,
        });
    }

    TestScene {
        painter,
        source: TestTileSource { tiles },
        pattern_atlas,
        dash_atlas: TestDashAtlas::new(256.0),
        coords,
    }
}

fn test_bucket(device: &TestDevice) -> Bucket<TestDevice> {
    let (layout_vertex_buffer, index_buffer) = device.quad_buffers();
    Bucket {
        layout_vertex_buffer,
        index_buffer,
        segments: SegmentVector::simple(4, 2),
        configurations: FxHashMap::default(),
    }
}
