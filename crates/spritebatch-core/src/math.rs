/// Fast mathematical operations using SIMD-accelerated `glam` types.
///
/// Sprite transforms are computed on the CPU with these types before the
/// results are written into `#[repr(C)]` vertex structs.
///
/// ```
/// use spritebatch_core::math::{Mat3, Vec2};
///
/// let transform = Mat3::from_translation(Vec2::new(10.0, 20.0));
/// assert_eq!(transform.transform_point2(Vec2::ZERO), Vec2::new(10.0, 20.0));
/// ```
pub mod fast {
    pub use glam::*;
}

pub use fast::*;
