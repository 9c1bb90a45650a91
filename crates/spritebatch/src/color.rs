/// An RGBA color with `f32` components in the `0.0..=1.0` range.
///
/// ```
/// use spritebatch::Color;
///
/// let red = Color::rgb(1.0, 0.0, 0.0);
/// let faded = Color::rgba(1.0, 1.0, 1.0, 0.5);
///
/// assert_eq!(red.to_packed_rgba8(), 0xFF00_00FF);
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Create a color from RGB components with full opacity.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Pack into the vertex color format: `r | g << 8 | b << 16 | a << 24`.
    ///
    /// Each channel is clamped to `0.0..=1.0` and scaled by 255 with
    /// truncation, so the little-endian bytes read `[r, g, b, a]`
    /// (`Unorm8x4`).
    pub fn to_packed_rgba8(self) -> u32 {
        #[inline]
        fn channel(c: f32) -> u32 {
            // NaN falls through clamp and casts to 0.
            (c.clamp(0.0, 1.0) * 255.0) as u32
        }

        channel(self.r) | channel(self.g) << 8 | channel(self.b) << 16 | channel(self.a) << 24
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Color {
    fn from(arr: [f32; 4]) -> Self {
        Self {
            r: arr[0],
            g: arr[1],
            b: arr[2],
            a: arr[3],
        }
    }
}

impl From<Color> for [f32; 4] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}
