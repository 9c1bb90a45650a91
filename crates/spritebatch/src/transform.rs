//! Per-sprite vertex generation.
//!
//! Local quad corners are `(0,0), (w,0), (w,h), (0,h)` in texture pixels,
//! where `w`/`h` is the texture size. The world transform is
//! `Translate(position) * Rotate(rotation) * Scale(scale) * Translate(-origin)`.
//! Unrotated, unscaled sprites skip the matrix and are placed by translation.

use spritebatch_core::math::{Mat3, Vec2, Vec3};

use crate::Sprite;
use crate::vertex::{QUAD_UVS, SpriteVertex, VERTICES_PER_SPRITE};

/// Local corners of a `size` quad in vertex order.
#[inline]
pub fn local_corners(size: Vec2) -> [Vec2; VERTICES_PER_SPRITE] {
    [
        Vec2::ZERO,
        Vec2::new(size.x, 0.0),
        size,
        Vec2::new(0.0, size.y),
    ]
}

/// Closed form of the sprite world transform.
pub fn sprite_transform(position: Vec2, rotation: f32, scale: f32, origin: Vec2) -> Mat3 {
    let (sin, cos) = rotation.sin_cos();
    let (sin_s, cos_s) = (sin * scale, cos * scale);

    Mat3::from_cols(
        Vec3::new(cos_s, sin_s, 0.0),
        Vec3::new(-sin_s, cos_s, 0.0),
        Vec3::new(
            -origin.x * cos_s + origin.y * sin_s + position.x,
            -origin.x * sin_s - origin.y * cos_s + position.y,
            1.0,
        ),
    )
}

/// The same transform built by composing the four elementary matrices.
pub fn composed_transform(position: Vec2, rotation: f32, scale: f32, origin: Vec2) -> Mat3 {
    Mat3::from_translation(position)
        * Mat3::from_angle(rotation)
        * Mat3::from_scale(Vec2::splat(scale))
        * Mat3::from_translation(-origin)
}

/// World-space corners of `sprite` drawn with a texture of `size`.
pub fn quad_corners(sprite: &Sprite, size: Vec2) -> [Vec2; VERTICES_PER_SPRITE] {
    let local = local_corners(size);

    if sprite.is_axis_aligned() {
        let offset = sprite.position - sprite.origin;
        local.map(|corner| corner + offset)
    } else {
        let transform =
            sprite_transform(sprite.position, sprite.rotation, sprite.scale, sprite.origin);
        local.map(|corner| transform.transform_point2(corner))
    }
}

/// Write the four vertices of `sprite` into `out`.
#[inline]
pub fn write_quad(sprite: &Sprite, size: Vec2, out: &mut [SpriteVertex; VERTICES_PER_SPRITE]) {
    let color = sprite.color.to_packed_rgba8();
    let corners = quad_corners(sprite, size);

    for ((vertex, corner), uv) in out.iter_mut().zip(corners).zip(QUAD_UVS) {
        *vertex = SpriteVertex::new(corner.x, corner.y, color, uv);
    }
}

/// Fill `out` with the quads of `sprites`, all drawn with a texture of `size`.
///
/// `out` must hold exactly four vertices per sprite.
pub fn write_sprite_vertices(sprites: &[Sprite], size: Vec2, out: &mut [SpriteVertex]) {
    debug_assert_eq!(out.len(), sprites.len() * VERTICES_PER_SPRITE);

    let (quads, _) = out.as_chunks_mut::<VERTICES_PER_SPRITE>();
    for (sprite, quad) in sprites.iter().zip(quads) {
        write_quad(sprite, size, quad);
    }
}
