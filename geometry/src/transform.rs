// wayfarer/geometry/src/transform.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! 3D transforms, as consumed by vertex shaders.

/// A column-major 4x4 matrix.
///
/// Tile position matrices are computed by the map transform (an external
/// collaborator) and flow through here untouched, ending up in a `u_matrix`
/// uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform4F {
    columns: [f32; 16],
}

impl Transform4F {
    #[inline]
    pub fn from_columns(columns: [f32; 16]) -> Transform4F {
        Transform4F { columns }
    }

    #[inline]
    pub fn to_columns(self) -> [f32; 16] {
        self.columns
    }

    #[inline]
    pub fn scale(x: f32, y: f32, z: f32) -> Transform4F {
        let mut columns = [0.0; 16];
        columns[0] = x;
        columns[5] = y;
        columns[10] = z;
        columns[15] = 1.0;
        Transform4F { columns }
    }
}

impl Default for Transform4F {
    #[inline]
    fn default() -> Transform4F {
        Transform4F::scale(1.0, 1.0, 1.0)
    }
}
