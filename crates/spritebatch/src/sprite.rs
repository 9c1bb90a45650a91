use spritebatch_core::math::Vec2;
use spritebatch_host::TextureHandle;

use crate::Color;

/// A single textured quad queued on a [`SpriteBatch`](crate::SpriteBatch).
///
/// The quad is the full texture at its native size. `origin` is the pivot in
/// texture-local pixels; rotation and scale are applied around it and it is
/// placed at `position`.
///
/// ```
/// use spritebatch::{Color, Sprite, TextureHandle, Vec2};
///
/// let texture = TextureHandle::new(1, 32, 32);
/// let sprite = Sprite::new(texture, Vec2::new(100.0, 50.0))
///     .with_origin(Vec2::splat(16.0))
///     .with_rotation(std::f32::consts::FRAC_PI_4)
///     .with_color(Color::RED);
///
/// assert!(!sprite.is_axis_aligned());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub texture: TextureHandle,
    pub position: Vec2,
    pub color: Color,
    /// Radians, clockwise on screen (Y down).
    pub rotation: f32,
    pub origin: Vec2,
    /// Uniform scale.
    pub scale: f32,
}

impl Sprite {
    /// Opaque white, unrotated, unscaled, origin at the top-left corner.
    pub fn new(texture: TextureHandle, position: Vec2) -> Self {
        Self {
            texture,
            position,
            color: Color::WHITE,
            rotation: 0.0,
            origin: Vec2::ZERO,
            scale: 1.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// True when the quad can be placed by translation alone.
    #[inline]
    pub fn is_axis_aligned(&self) -> bool {
        self.rotation == 0.0 && self.scale == 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let sprite = Sprite::new(TextureHandle::new(3, 8, 8), Vec2::new(1.0, 2.0));

        assert_eq!(sprite.color, Color::WHITE);
        assert_eq!(sprite.rotation, 0.0);
        assert_eq!(sprite.origin, Vec2::ZERO);
        assert_eq!(sprite.scale, 1.0);
        assert!(sprite.is_axis_aligned());
    }

    #[test]
    fn test_builders() {
        let sprite = Sprite::new(TextureHandle::new(3, 8, 8), Vec2::ZERO)
            .with_scale(2.0)
            .with_origin(Vec2::new(4.0, 4.0));

        assert_eq!(sprite.scale, 2.0);
        assert_eq!(sprite.origin, Vec2::new(4.0, 4.0));
        assert!(!sprite.is_axis_aligned());
        assert!(sprite.with_scale(1.0).is_axis_aligned());
    }
}
