// wayfarer/renderer/src/draw.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-layer-kind draw drivers.
//!
//! Each driver decides pass membership, assembles uniform values, acquires
//! the program variant for the tile's paint configuration, and hands the
//! bucket geometry to `Program::draw`. Recoverable conditions (missing
//! tile, missing bucket, pattern not yet resident) skip quietly; only
//! program build failures propagate.

use smallvec::SmallVec;
use wayfarer_geometry::vector::Vector2F;
use wayfarer_gpu::{Device, DrawMode, GpuError, StencilMode, UniformValue};

use crate::painter::{Painter, RenderPass};
use crate::pattern::{self, CrossFaded, DashAtlas, DashPosition, PatternAtlas, ResolvedPattern};
use crate::program::ProgramConfiguration;
use crate::shaders::ProgramKind;
use crate::style::{Alignment, BackgroundPaint, CirclePaint, LayerKind, LinePaint, StyleLayer};
use crate::tile::{pixels_to_tile_units, TileCoord, TileSource};

/// The background pseudo-tile grid used for pattern anchoring. Background
/// has no source tiles, so patterns tile as if drawn over 512px tiles.
const BACKGROUND_TILE_SIZE: f32 = 512.0;

type UniformList = SmallVec<[(&'static str, UniformValue); 24]>;

pub(crate) fn draw_layer<D, S, A, L>(painter: &mut Painter<D>,
                                     layer: &StyleLayer,
                                     source: &mut S,
                                     pattern_atlas: &A,
                                     dash_atlas: &L,
                                     coords: &[TileCoord])
                                     -> Result<(), GpuError>
where D: Device, S: TileSource<D>, A: PatternAtlas<D>, L: DashAtlas<D> {
    match layer.kind {
        LayerKind::Background(ref paint) => {
            draw_background(painter, &layer.id, paint, pattern_atlas, coords)
        }
        LayerKind::Circle(ref paint) => draw_circle(painter, &layer.id, paint, source, coords),
        LayerKind::Line(ref paint) => {
            draw_line(painter, &layer.id, paint, source, pattern_atlas, dash_atlas, coords)
        }
    }
}

/// Backgrounds draw the shared tile-extent quad under every visible tile.
/// A fully opaque background belongs to the opaque pass, where the depth
/// buffer culls everything it would overdraw.
fn draw_background<D, A>(painter: &mut Painter<D>,
                         layer_id: &str,
                         paint: &BackgroundPaint,
                         pattern_atlas: &A,
                         coords: &[TileCoord])
                         -> Result<(), GpuError>
where D: Device, A: PatternAtlas<D> {
    if paint.opacity == 0.0 {
        return Ok(());
    }

    let pass = if paint.pattern.is_none() && paint.color.a == 1.0 && paint.opacity == 1.0 {
        RenderPass::Opaque
    } else {
        RenderPass::Translucent
    };
    if painter.render_pass != pass {
        return Ok(());
    }

    let depth_mode = painter.depth_mode_for_sublayer(0, pass == RenderPass::Opaque);
    let color_mode = painter.color_mode_for_render_pass();
    let zoom = painter.transform.zoom;

    let resolved = match paint.pattern {
        None => None,
        Some(ref image) => match pattern::resolve(image, pattern_atlas) {
            Ok(resolved) => Some(resolved),
            Err(_) => return Ok(()),
        },
    };
    let kind = match resolved {
        Some(_) => ProgramKind::BackgroundPattern,
        None => ProgramKind::Background,
    };

    let configuration = ProgramConfiguration::empty();
    let (program, _) =
        painter.programs.acquire(&painter.device, &painter.shaders, kind, &configuration)?;

    if resolved.is_some() {
        painter.device.set_active_texture(0);
        pattern_atlas.bind(&painter.device);
    }

    for (index, coord) in coords.iter().enumerate() {
        let mut values = UniformList::new();
        values.push(("u_matrix", UniformValue::Mat4(coord.pos_matrix)));
        values.push(("u_opacity", UniformValue::Float(paint.opacity)));
        match resolved {
            Some(ref resolved) => {
                values.extend(resolved.uniform_values());
                values.extend(pattern::tile_uniform_values(coord.id,
                                                           BACKGROUND_TILE_SIZE,
                                                           zoom));
            }
            None => values.push(("u_color", UniformValue::Vec4(paint.color.to_array()))),
        }

        program.draw(&painter.device,
                     DrawMode::Triangles,
                     &depth_mode,
                     &StencilMode::disabled(),
                     &color_mode,
                     &values,
                     &[],
                     layer_id,
                     &painter.tile_extent_vertex_buffer,
                     &painter.tile_extent_index_buffer,
                     &mut painter.tile_extent_segments,
                     &[],
                     None,
                     index == 0);
    }
    Ok(())
}

/// Circles are always translucent and never stencil-clipped: a circle near
/// a tile edge extrudes past the tile boundary and must not be clipped by
/// the neighbor's mask.
fn draw_circle<D, S>(painter: &mut Painter<D>,
                     layer_id: &str,
                     paint: &CirclePaint,
                     source: &mut S,
                     coords: &[TileCoord])
                     -> Result<(), GpuError>
where D: Device, S: TileSource<D> {
    if painter.render_pass != RenderPass::Translucent {
        return Ok(());
    }
    let opacity = paint.opacity.constant_or(1.0);
    let stroke_width = paint.stroke_width.constant_or(1.0);
    let stroke_opacity = paint.stroke_opacity.constant_or(1.0);
    if opacity == 0.0 && (stroke_width == 0.0 || stroke_opacity == 0.0) {
        return Ok(());
    }

    let depth_mode = painter.depth_mode_for_sublayer(0, false);
    let color_mode = painter.color_mode_for_render_pass();
    let zoom = painter.transform.zoom;
    let camera_to_center_distance = painter.transform.camera_to_center_distance;
    let pixels_to_gl_units = painter.transform.pixels_to_gl_units;

    let scale_with_map = paint.pitch_scale == Alignment::Map;
    let pitch_with_map = paint.pitch_alignment == Alignment::Map;

    let default_configuration = ProgramConfiguration::empty();
    let mut first = true;
    for coord in coords {
        let tile = match source.get_tile(coord.id) {
            Some(tile) => tile,
            None => continue,
        };
        let tile_size = tile.tile_size;
        let bucket = match tile.buckets.get_mut(layer_id) {
            Some(bucket) => bucket,
            None => continue,
        };

        // Extrusion happens in the vertex shader; the scale converts the
        // unit extrusion vector into tile units (pitched with the map) or
        // clip-space units (billboarded to the viewport).
        let extrude_scale = if pitch_with_map {
            Vector2F::splat(pixels_to_tile_units(coord.id.z, tile_size, 1.0, zoom))
        } else {
            pixels_to_gl_units
        };

        let mut values = UniformList::new();
        values.push(("u_camera_to_center_distance",
                     UniformValue::Float(camera_to_center_distance)));
        values.push(("u_scale_with_map", UniformValue::Int(scale_with_map as i32)));
        values.push(("u_matrix", UniformValue::Mat4(coord.pos_matrix)));
        values.push(("u_pitch_with_map", UniformValue::Int(pitch_with_map as i32)));
        values.push(("u_extrude_scale", UniformValue::Vec2(extrude_scale)));

        let configuration =
            bucket.configurations.get(layer_id).unwrap_or(&default_configuration);
        let (program, _) = painter.programs.acquire(&painter.device,
                                                    &painter.shaders,
                                                    ProgramKind::Circle,
                                                    configuration)?;
        program.draw(&painter.device,
                     DrawMode::Triangles,
                     &depth_mode,
                     &StencilMode::disabled(),
                     &color_mode,
                     &values,
                     &configuration.binder_values,
                     layer_id,
                     &bucket.layout_vertex_buffer,
                     &bucket.index_buffer,
                     &mut bucket.segments,
                     &configuration.paint_vertex_buffers,
                     None,
                     first);
        first = false;
    }
    Ok(())
}

/// Lines pick their program by paint priority: a dasharray wins over a
/// pattern, a pattern over plain fill. Texture state is re-established
/// only when the program actually changed since the previous tile.
fn draw_line<D, S, A, L>(painter: &mut Painter<D>,
                         layer_id: &str,
                         paint: &LinePaint,
                         source: &mut S,
                         pattern_atlas: &A,
                         dash_atlas: &L,
                         coords: &[TileCoord])
                         -> Result<(), GpuError>
where D: Device, S: TileSource<D>, A: PatternAtlas<D>, L: DashAtlas<D> {
    if painter.render_pass != RenderPass::Translucent {
        return Ok(());
    }
    if paint.opacity.constant_or(1.0) == 0.0 {
        return Ok(());
    }

    enum LineVariant {
        Sdf { from: DashPosition, to: DashPosition, crossfade: CrossFaded<()> },
        Pattern(ResolvedPattern),
        Plain,
    }

    let (kind, variant) = match (&paint.dasharray, &paint.pattern) {
        (Some(dasharray), _) => {
            let from = dash_atlas.dash(&dasharray.from, paint.round_cap);
            let to = dash_atlas.dash(&dasharray.to, paint.round_cap);
            match (from, to) {
                (Some(from), Some(to)) => {
                    let crossfade = CrossFaded {
                        from: (),
                        to: (),
                        from_scale: dasharray.from_scale,
                        to_scale: dasharray.to_scale,
                        t: dasharray.t,
                    };
                    (ProgramKind::LineSdf, LineVariant::Sdf { from, to, crossfade })
                }
                _ => return Ok(()),
            }
        }
        (None, Some(image)) => match pattern::resolve(image, pattern_atlas) {
            Ok(resolved) => (ProgramKind::LinePattern, LineVariant::Pattern(resolved)),
            Err(_) => return Ok(()),
        },
        (None, None) => (ProgramKind::Line, LineVariant::Plain),
    };

    let depth_mode = painter.depth_mode_for_sublayer(0, false);
    let color_mode = painter.color_mode_for_render_pass();
    let zoom = painter.transform.zoom;
    let gl_units_to_pixels = painter.transform.pixels_to_gl_units.recip();
    let device_pixel_ratio = painter.device_pixel_ratio;

    let default_configuration = ProgramConfiguration::empty();
    let mut first = true;
    for coord in coords {
        let stencil_mode = painter.stencil_mode_for_clipping(coord.id);
        let tile = match source.get_tile(coord.id) {
            Some(tile) => tile,
            None => continue,
        };
        let tile_size = tile.tile_size;
        let bucket = match tile.buckets.get_mut(layer_id) {
            Some(bucket) => bucket,
            None => continue,
        };

        let configuration =
            bucket.configurations.get(layer_id).unwrap_or(&default_configuration);
        let (program, switched) =
            painter.programs.acquire(&painter.device, &painter.shaders, kind, configuration)?;

        let program_changed = first || switched;
        if program_changed {
            match variant {
                LineVariant::Sdf { .. } => {
                    painter.device.set_active_texture(0);
                    dash_atlas.bind(&painter.device);
                }
                LineVariant::Pattern(_) => {
                    painter.device.set_active_texture(0);
                    pattern_atlas.bind(&painter.device);
                }
                LineVariant::Plain => {}
            }
        }

        let mut values = UniformList::new();
        values.push(("u_matrix", UniformValue::Mat4(coord.pos_matrix)));
        values.push(("u_ratio",
                     UniformValue::Float(1.0 / pixels_to_tile_units(coord.id.z,
                                                                    tile_size,
                                                                    1.0,
                                                                    zoom))));
        values.push(("u_gl_units_to_pixels", UniformValue::Vec2(gl_units_to_pixels)));

        match variant {
            LineVariant::Sdf { ref from, ref to, ref crossfade } => {
                // Dash periods anchor to the nearest integer zoom so they
                // do not slide along the line during fractional zooming.
                let tile_ratio =
                    1.0 / pixels_to_tile_units(coord.id.z, tile_size, 1.0, zoom.floor());
                let width_from = from.width * crossfade.from_scale;
                let width_to = to.width * crossfade.to_scale;
                values.push(("u_patternscale_a",
                             UniformValue::Vec2(Vector2F::new(tile_ratio / width_from,
                                                              -from.height / 2.0))));
                values.push(("u_patternscale_b",
                             UniformValue::Vec2(Vector2F::new(tile_ratio / width_to,
                                                              -to.height / 2.0))));
                values.push(("u_sdfgamma",
                             UniformValue::Float(dash_atlas.width()
                                                 / (width_from.min(width_to)
                                                    * 256.0
                                                    * device_pixel_ratio)
                                                 / 2.0)));
                values.push(("u_image", UniformValue::TextureUnit(0)));
                values.push(("u_tex_y_a", UniformValue::Float(from.y)));
                values.push(("u_tex_y_b", UniformValue::Float(to.y)));
                values.push(("u_mix", UniformValue::Float(crossfade.t)));
            }
            LineVariant::Pattern(ref resolved) => {
                values.extend(resolved.uniform_values());
                values.extend(pattern::tile_uniform_values(coord.id, tile_size, zoom));
            }
            LineVariant::Plain => {}
        }

        program.draw(&painter.device,
                     DrawMode::Triangles,
                     &depth_mode,
                     &stencil_mode,
                     &color_mode,
                     &values,
                     &configuration.binder_values,
                     layer_id,
                     &bucket.layout_vertex_buffer,
                     &bucket.index_buffer,
                     &mut bucket.segments,
                     &configuration.paint_vertex_buffers,
                     None,
                     first);
        first = false;
    }
    Ok(())
}
