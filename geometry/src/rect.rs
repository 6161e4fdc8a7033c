// wayfarer/geometry/src/rect.rs
//
// Copyright © 2026 The Wayfarer Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! 2D axis-aligned rectangles.

use crate::vector::Vector2F;

/// A rectangle with 32-bit floating point origin and size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectF {
    origin: Vector2F,
    size: Vector2F,
}

impl RectF {
    #[inline]
    pub fn new(origin: Vector2F, size: Vector2F) -> RectF {
        RectF { origin, size }
    }

    #[inline]
    pub fn origin(self) -> Vector2F {
        self.origin
    }

    #[inline]
    pub fn size(self) -> Vector2F {
        self.size
    }

    #[inline]
    pub fn upper_left(self) -> Vector2F {
        self.origin
    }

    #[inline]
    pub fn lower_right(self) -> Vector2F {
        self.origin + self.size
    }

    #[inline]
    pub fn contract(self, amount: Vector2F) -> RectF {
        RectF::new(self.origin + amount, self.size - amount.scale(2.0))
    }
}

#[cfg(test)]
mod test {
    use crate::vector::Vector2F;
    use super::RectF;

    #[test]
    fn contract_shrinks_symmetrically() {
        let rect = RectF::new(Vector2F::new(64.0, 0.0), Vector2F::new(34.0, 18.0));
        let inner = rect.contract(Vector2F::splat(1.0));
        assert_eq!(inner.origin(), Vector2F::new(65.0, 1.0));
        assert_eq!(inner.size(), Vector2F::new(32.0, 16.0));
        assert_eq!(inner.lower_right(), Vector2F::new(97.0, 17.0));
    }
}
