// wayfarer/renderer/src/segment.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Geometry segments and the per-layer vertex-array cache.
//!
//! Index buffers use 16-bit indices, so a bucket with more than
//! `MAX_VERTEX_ARRAY_LENGTH` vertices cannot be drawn in one call.
//! `SegmentVector::prepare` partitions geometry into independently drawable
//! ranges, and each segment caches its attribute-binding object per layer
//! so repeated tile draws under the same layer skip redundant rebinding.

use fxhash::FxHashMap;
use wayfarer_gpu::{BufferTarget, Device, VertexAttrDescriptor, VertexAttrType};

/// The largest vertex count addressable by a 16-bit index buffer.
pub const MAX_VERTEX_ARRAY_LENGTH: u32 = 65536;

/// Byte width of one index.
pub const INDEX_BYTE_WIDTH: u32 = 2;

/// One attribute within a vertex buffer's interleaved layout.
#[derive(Clone, Copy, Debug)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub size: usize,
    pub attr_type: VertexAttrType,
    pub normalized: bool,
    pub offset: usize,
}

/// A vertex buffer handle together with its declared attribute layout.
/// The buffer contents are produced by the bucket builders; this crate
/// never reads them back.
pub struct VertexBuffer<D> where D: Device {
    pub buffer: D::Buffer,
    pub attributes: Vec<VertexAttribute>,
    pub stride: usize,
}

pub struct IndexBuffer<D> where D: Device {
    pub buffer: D::Buffer,
}

/// An index-addressable geometry range sized to fit the 16-bit index
/// limit, holding a non-owning view into its bucket's buffers.
pub struct Segment<D> where D: Device {
    vertex_offset: u32,
    primitive_offset: u32,
    vertex_length: u32,
    primitive_length: u32,
    vaos: FxHashMap<String, D::VertexArray>,
}

impl<D> Segment<D> where D: Device {
    pub fn new(vertex_offset: u32,
               primitive_offset: u32,
               vertex_length: u32,
               primitive_length: u32)
               -> Segment<D> {
        // Geometry producers must keep every segment within the index
        // range; truncating here would silently drop primitives.
        assert!(vertex_length <= MAX_VERTEX_ARRAY_LENGTH,
                "segment exceeds the 16-bit index range");
        Segment {
            vertex_offset,
            primitive_offset,
            vertex_length,
            primitive_length,
            vaos: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn vertex_offset(&self) -> u32 {
        self.vertex_offset
    }

    #[inline]
    pub fn primitive_offset(&self) -> u32 {
        self.primitive_offset
    }

    #[inline]
    pub fn vertex_length(&self) -> u32 {
        self.vertex_length
    }

    #[inline]
    pub fn primitive_length(&self) -> u32 {
        self.primitive_length
    }

    /// Establishes the attribute-binding state for this segment under the
    /// given layer. A cached binding is reactivated without redeclaring
    /// attribute pointers; it stays valid as long as the underlying
    /// buffers have not been reallocated, which is the buffer owner's
    /// contract to maintain.
    pub(crate) fn bind(&mut self,
                       device: &D,
                       attribute_locations: &FxHashMap<String, u32>,
                       layer_id: &str,
                       layout_vertex_buffer: &VertexBuffer<D>,
                       paint_vertex_buffers: &[VertexBuffer<D>],
                       index_buffer: &IndexBuffer<D>,
                       dynamic_vertex_buffer: Option<&VertexBuffer<D>>) {
        if let Some(vao) = self.vaos.get(layer_id) {
            device.bind_vertex_array(vao);
            return;
        }

        let vao = device.create_vertex_array();
        device.bind_vertex_array(&vao);
        self.configure_attributes(device, attribute_locations, layout_vertex_buffer);
        for paint_vertex_buffer in paint_vertex_buffers {
            self.configure_attributes(device, attribute_locations, paint_vertex_buffer);
        }
        if let Some(dynamic_vertex_buffer) = dynamic_vertex_buffer {
            self.configure_attributes(device, attribute_locations, dynamic_vertex_buffer);
        }
        device.bind_buffer(&index_buffer.buffer, BufferTarget::Index);
        self.vaos.insert(layer_id.to_owned(), vao);
    }

    fn configure_attributes(&self,
                            device: &D,
                            attribute_locations: &FxHashMap<String, u32>,
                            vertex_buffer: &VertexBuffer<D>) {
        device.bind_buffer(&vertex_buffer.buffer, BufferTarget::Vertex);
        for attribute in &vertex_buffer.attributes {
            if let Some(&location) = attribute_locations.get(attribute.name) {
                device.configure_vertex_attr(location, &VertexAttrDescriptor {
                    size: attribute.size,
                    attr_type: attribute.attr_type,
                    normalized: attribute.normalized,
                    stride: vertex_buffer.stride,
                    offset: self.vertex_offset as usize * vertex_buffer.stride + attribute.offset,
                });
            }
        }
    }
}

/// The ordered segments of one bucket.
pub struct SegmentVector<D> where D: Device {
    segments: Vec<Segment<D>>,
}

impl<D> SegmentVector<D> where D: Device {
    pub fn new() -> SegmentVector<D> {
        SegmentVector { segments: Vec::new() }
    }

    /// A single pre-sized segment, for geometry uploaded in one piece
    /// (e.g. the tile-extent quad).
    pub fn simple(vertex_length: u32, primitive_length: u32) -> SegmentVector<D> {
        SegmentVector { segments: vec![Segment::new(0, 0, vertex_length, primitive_length)] }
    }

    /// Returns the segment that will hold `vertex_count` more vertices and
    /// `primitive_count` more primitives, opening a new segment when the
    /// current one would overflow the index range. The returned segment's
    /// lengths already account for the new geometry.
    pub fn prepare(&mut self, vertex_count: u32, primitive_count: u32) -> &mut Segment<D> {
        assert!(vertex_count <= MAX_VERTEX_ARRAY_LENGTH,
                "single feature exceeds the 16-bit index range");

        let needs_new_segment = match self.segments.last() {
            None => true,
            Some(segment) => {
                segment.vertex_length + vertex_count > MAX_VERTEX_ARRAY_LENGTH
            }
        };
        if needs_new_segment {
            let (vertex_offset, primitive_offset) = match self.segments.last() {
                None => (0, 0),
                Some(segment) => (segment.vertex_offset + segment.vertex_length,
                                  segment.primitive_offset + segment.primitive_length),
            };
            self.segments.push(Segment::new(vertex_offset, primitive_offset, 0, 0));
        }

        let last = self.segments.len() - 1;
        let segment = &mut self.segments[last];
        segment.vertex_length += vertex_count;
        segment.primitive_length += primitive_count;
        segment
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment<D>> {
        self.segments.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Segment<D>> {
        self.segments.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
