//! Sprite vertex layout and the static quad index pattern.

use bytemuck::{Pod, Zeroable};
use spritebatch_host::VertexElements;

pub const VERTICES_PER_SPRITE: usize = 4;
pub const INDICES_PER_SPRITE: usize = 6;

/// Largest sprite count whose vertices are all addressable by `u16` indices.
pub const MAX_INDEXABLE_SPRITES: u32 = (u16::MAX as u32 + 1) / VERTICES_PER_SPRITE as u32;

/// Texture coordinates for top-left, top-right, bottom-right, bottom-left.
pub const QUAD_UVS: [[f32; 2]; VERTICES_PER_SPRITE] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// One corner of a sprite quad, 24 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    /// Screen-space position, `z` is always 0.
    pub position: [f32; 3],
    /// See [`Color::to_packed_rgba8`](crate::Color::to_packed_rgba8).
    pub color: u32,
    pub uv: [f32; 2],
}

impl SpriteVertex {
    pub const ELEMENTS: VertexElements = VertexElements::SPRITE;

    pub const fn new(x: f32, y: f32, color: u32, uv: [f32; 2]) -> Self {
        Self {
            position: [x, y, 0.0],
            color,
            uv,
        }
    }
}

/// Two triangles per sprite: `[4i, 4i+1, 4i+2, 4i+2, 4i+3, 4i]`.
///
/// `capacity` must not exceed [`MAX_INDEXABLE_SPRITES`].
pub fn quad_indices(capacity: u32) -> Vec<u16> {
    debug_assert!(capacity <= MAX_INDEXABLE_SPRITES);

    (0..capacity)
        .flat_map(|sprite| {
            let base = (sprite * VERTICES_PER_SPRITE as u32) as u16;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect()
}
