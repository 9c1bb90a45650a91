#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }
}

impl Size<u32> {
    /// Size in `f32`, the unit vertex math works in.
    pub fn to_f32(self) -> Size<f32> {
        Size {
            width: self.width as f32,
            height: self.height as f32,
        }
    }

    /// True when either side is zero (e.g. a minimized window).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Size<u32> {
    fn from((width, height): (u32, u32)) -> Self {
        Size { width, height }
    }
}
