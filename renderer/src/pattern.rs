// wayfarer/renderer/src/pattern.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Cross-faded pattern sampling.
//!
//! A style transition between two pattern images is drawn by sampling both
//! atlas sub-regions and blending in the fragment stage. The resolver only
//! supplies the two texture rectangles, sizes, and scales plus the scalar
//! mix weight; it never performs the blend itself.

use smallvec::{smallvec, SmallVec};
use wayfarer_geometry::rect::RectF;
use wayfarer_geometry::vector::Vector2F;
use wayfarer_gpu::{Device, UniformValue};

use crate::tile::{pixels_to_tile_units, OverscaledTileId};

/// A value mid-transition between two stops. `t` is the blend weight in
/// [0, 1]: 0 selects `from` only, 1 selects `to` only. A zero-duration
/// transition collapses to an endpoint. `from_scale` and `to_scale` are
/// the zoom-stop factors bracketing the current zoom, accounting for
/// pattern images being stored at one fixed texel density while tiles
/// render at varying world-to-pixel ratios across integer zoom steps.
#[derive(Clone, Debug, PartialEq)]
pub struct CrossFaded<T> {
    pub from: T,
    pub to: T,
    pub from_scale: f32,
    pub to_scale: f32,
    pub t: f32,
}

impl<T> CrossFaded<T> {
    pub fn constant(value: T) -> CrossFaded<T> where T: Clone {
        CrossFaded { from: value.clone(), to: value, from_scale: 1.0, to_scale: 1.0, t: 1.0 }
    }
}

/// Where one image sits in the shared atlas texture. The rect is padded by
/// one texel on each side to keep linear sampling from bleeding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePosition {
    pub padded_rect: RectF,
    pub pixel_ratio: f32,
}

const PADDING: f32 = 1.0;

impl ImagePosition {
    fn content_rect(&self) -> RectF {
        self.padded_rect.contract(Vector2F::splat(PADDING))
    }

    pub fn texture_top_left(&self) -> Vector2F {
        self.content_rect().upper_left()
    }

    pub fn texture_bottom_right(&self) -> Vector2F {
        self.content_rect().lower_right()
    }

    pub fn display_size(&self) -> Vector2F {
        self.content_rect().size().scale(1.0 / self.pixel_ratio)
    }
}

/// The shared pattern atlas. Image loads are asynchronous and external; a
/// pattern not yet resident simply resolves to `None` until a later frame.
pub trait PatternAtlas<D> where D: Device {
    fn position(&self, name: &str) -> Option<ImagePosition>;
    /// Atlas texture size in texels.
    fn texture_size(&self) -> Vector2F;
    /// Activates the atlas texture on the current texture unit.
    fn bind(&self, device: &D);
}

/// One rendered dash row in the dash texture. `width` is the dash period
/// in texels; `y` is the row's normalized texture coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashPosition {
    pub y: f32,
    pub height: f32,
    pub width: f32,
}

/// The texture of pre-rendered signed-distance dash rows. Rows are
/// rendered on demand; a dasharray not yet rendered returns `None` and the
/// draw is retried next frame.
pub trait DashAtlas<D> where D: Device {
    fn dash(&self, dasharray: &[f32], round_cap: bool) -> Option<DashPosition>;
    /// Dash texture width in texels.
    fn width(&self) -> f32;
    /// Activates the dash texture on the current texture unit.
    fn bind(&self, device: &D);
}

/// Signals that a referenced pattern image is not yet loaded into the
/// atlas. The draw for that tile/layer is skipped this frame and retried
/// once the atlas reports the image resident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("pattern image not yet resident in the atlas")]
pub struct PatternUnavailable;

/// Returns true when a configured pattern cannot be drawn yet. A layer
/// with no pattern is never missing anything.
pub fn is_pattern_missing<D, A>(atlas: &A, image: Option<&CrossFaded<String>>) -> bool
where D: Device, A: PatternAtlas<D> {
    match image {
        None => false,
        Some(image) => {
            atlas.position(&image.from).is_none() || atlas.position(&image.to).is_none()
        }
    }
}

/// The resolved crossfade: both sub-rectangles, display sizes, per-stop
/// scales, and the mix weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedPattern {
    pub top_left_a: Vector2F,
    pub bottom_right_a: Vector2F,
    pub top_left_b: Vector2F,
    pub bottom_right_b: Vector2F,
    pub size_a: Vector2F,
    pub size_b: Vector2F,
    pub scale_a: f32,
    pub scale_b: f32,
    pub mix: f32,
    pub texture_size: Vector2F,
}

/// Resolves a pattern against the atlas. At an endpoint mix the inactive
/// stop is collapsed onto the active one, so a draw at `t == 0` samples
/// only the "from" image and a draw at `t == 1` only the "to" image.
pub fn resolve<D, A>(pattern: &CrossFaded<String>, atlas: &A)
                     -> Result<ResolvedPattern, PatternUnavailable>
where D: Device, A: PatternAtlas<D> {
    assert!(pattern.t >= 0.0 && pattern.t <= 1.0,
            "crossfade mix weight must lie within [0, 1]");

    let mut position_a = atlas.position(&pattern.from).ok_or(PatternUnavailable)?;
    let mut position_b = atlas.position(&pattern.to).ok_or(PatternUnavailable)?;
    let (mut scale_a, mut scale_b) = (pattern.from_scale, pattern.to_scale);

    if pattern.t == 0.0 {
        position_b = position_a;
        scale_b = scale_a;
    } else if pattern.t == 1.0 {
        position_a = position_b;
        scale_a = scale_b;
    }

    Ok(ResolvedPattern {
        top_left_a: position_a.texture_top_left(),
        bottom_right_a: position_a.texture_bottom_right(),
        top_left_b: position_b.texture_top_left(),
        bottom_right_b: position_b.texture_bottom_right(),
        size_a: position_a.display_size(),
        size_b: position_b.display_size(),
        scale_a,
        scale_b,
        mix: pattern.t,
        texture_size: atlas.texture_size(),
    })
}

impl ResolvedPattern {
    /// The tile-independent half of the pattern uniforms.
    pub fn uniform_values(&self) -> SmallVec<[(&'static str, UniformValue); 11]> {
        smallvec![
            ("u_image", UniformValue::TextureUnit(0)),
            ("u_pattern_tl_a", UniformValue::Vec2(self.top_left_a)),
            ("u_pattern_br_a", UniformValue::Vec2(self.bottom_right_a)),
            ("u_pattern_tl_b", UniformValue::Vec2(self.top_left_b)),
            ("u_pattern_br_b", UniformValue::Vec2(self.bottom_right_b)),
            ("u_texsize", UniformValue::Vec2(self.texture_size)),
            ("u_mix", UniformValue::Float(self.mix)),
            ("u_pattern_size_a", UniformValue::Vec2(self.size_a)),
            ("u_pattern_size_b", UniformValue::Vec2(self.size_b)),
            ("u_scale_a", UniformValue::Float(self.scale_a)),
            ("u_scale_b", UniformValue::Float(self.scale_b)),
        ]
    }
}

/// The tile-dependent half: the tile's pixel coordinate at the nearest
/// integer zoom (split into two vec2s to stay within mediump float
/// precision) and the tile-unit-to-pixel ratio for the current zoom.
pub fn tile_uniform_values(id: OverscaledTileId,
                           tile_size: f32,
                           zoom: f32)
                           -> SmallVec<[(&'static str, UniformValue); 3]> {
    let num_tiles = 2f32.powi(i32::from(id.z));
    let tile_size_at_nearest_zoom = tile_size * 2f32.powf(zoom.floor()) / num_tiles;
    let pixel_x = (tile_size_at_nearest_zoom * id.x as f32) as i64;
    let pixel_y = (tile_size_at_nearest_zoom * id.y as f32) as i64;

    smallvec![
        ("u_pixel_coord_upper",
         UniformValue::Vec2(Vector2F::new((pixel_x >> 16) as f32, (pixel_y >> 16) as f32))),
        ("u_pixel_coord_lower",
         UniformValue::Vec2(Vector2F::new((pixel_x & 0xffff) as f32,
                                          (pixel_y & 0xffff) as f32))),
        ("u_tile_units_to_pixels",
         UniformValue::Float(1.0 / pixels_to_tile_units(id.z, tile_size, 1.0, zoom))),
    ]
}
