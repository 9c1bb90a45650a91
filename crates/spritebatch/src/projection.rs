//! Screen-space orthographic projection.

use spritebatch_core::geometry::Size;
use spritebatch_core::math::Mat4;

/// Maps `[0, W] x [0, H]` (origin top-left, Y down) to clip space `[-1, 1]`
/// with Y flipped.
///
/// Zero extents are treated as 1 so a minimized window never yields a
/// non-finite matrix.
pub fn screen_projection(size: Size<u32>) -> Mat4 {
    let Size { width, height } = size.to_f32();
    let width = width.max(1.0);
    let height = height.max(1.0);

    Mat4::from_cols_array_2d(&[
        [2.0 / width, 0.0, 0.0, 0.0],
        [0.0, -2.0 / height, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0, 1.0],
    ])
}

/// Holds the last projection and rebuilds it only when the size changes.
#[derive(Debug, Clone, Default)]
pub struct ProjectionCache {
    cached: Option<(Size<u32>, Mat4)>,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, size: Size<u32>) -> Mat4 {
        match self.cached {
            Some((cached_size, matrix)) if cached_size == size => matrix,
            _ => {
                let matrix = screen_projection(size);
                if size.is_empty() {
                    tracing::debug!(width = size.width, height = size.height, "Projecting onto an empty screen");
                }
                tracing::trace!(width = size.width, height = size.height, "Rebuilt sprite projection");
                self.cached = Some((size, matrix));
                matrix
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spritebatch_core::math::{Vec3, Vec4};

    fn project(matrix: Mat4, x: f32, y: f32) -> Vec3 {
        matrix.project_point3(Vec3::new(x, y, 0.0))
    }

    #[test]
    fn test_corners_map_to_clip_space() {
        let matrix = screen_projection(Size::new(800, 600));

        let cases = [
            ((0.0, 0.0), Vec3::new(-1.0, 1.0, 0.0)),
            ((800.0, 600.0), Vec3::new(1.0, -1.0, 0.0)),
            ((400.0, 300.0), Vec3::ZERO),
            ((800.0, 0.0), Vec3::new(1.0, 1.0, 0.0)),
        ];
        for ((x, y), expected) in cases {
            assert!(project(matrix, x, y).abs_diff_eq(expected, 0.0001));
        }
    }

    #[test]
    fn test_row_layout() {
        let matrix = screen_projection(Size::new(200, 100));
        assert_eq!(matrix.row(0), Vec4::new(0.01, 0.0, 0.0, -1.0));
        assert_eq!(matrix.row(1), Vec4::new(0.0, -0.02, 0.0, 1.0));
        assert_eq!(matrix.row(3), Vec4::W);
    }

    #[test]
    fn test_zero_size_is_finite() {
        let matrix = screen_projection(Size::new(0, 0));
        assert!(matrix.is_finite());
        assert_eq!(matrix, screen_projection(Size::new(1, 1)));
    }

    #[test]
    fn test_cache_rebuilds_on_resize() {
        let mut cache = ProjectionCache::new();
        let small = cache.get(Size::new(100, 100));
        assert_eq!(cache.get(Size::new(100, 100)), small);

        let large = cache.get(Size::new(200, 100));
        assert_ne!(large, small);
        assert_eq!(large, screen_projection(Size::new(200, 100)));
    }
}
