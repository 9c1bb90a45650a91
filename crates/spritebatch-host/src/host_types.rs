//! Handle and descriptor types exchanged with a graphics host.
//!
//! Buffer and shader handles wrap a real wgpu resource or, with the `mock`
//! feature, an id recorded by the mock host.

use std::fmt;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;
use spritebatch_core::math::Mat4;

/// Wrapper around a host buffer that can be real or mock.
///
/// Cheap to clone (wgpu buffers are reference counted).
#[derive(Clone, Debug)]
pub struct HostBuffer {
    inner: HostBufferInner,
}

#[derive(Clone, Debug)]
enum HostBufferInner {
    Real(wgpu::Buffer),
    #[cfg(feature = "mock")]
    Mock { id: usize, size: u64 },
}

impl HostBuffer {
    /// Create from real WGPU buffer
    pub fn from_wgpu(buffer: wgpu::Buffer) -> Self {
        Self {
            inner: HostBufferInner::Real(buffer),
        }
    }

    /// Create mock buffer (for testing)
    #[cfg(feature = "mock")]
    pub fn mock(id: usize, size: u64) -> Self {
        Self {
            inner: HostBufferInner::Mock { id, size },
        }
    }

    /// Size of the buffer in bytes.
    pub fn size(&self) -> u64 {
        match &self.inner {
            HostBufferInner::Real(buffer) => buffer.size(),
            #[cfg(feature = "mock")]
            HostBufferInner::Mock { size, .. } => *size,
        }
    }

    /// Get the underlying wgpu::Buffer, or `None` for a mock buffer.
    pub fn as_wgpu(&self) -> Option<&wgpu::Buffer> {
        match &self.inner {
            HostBufferInner::Real(buffer) => Some(buffer),
            #[cfg(feature = "mock")]
            HostBufferInner::Mock { .. } => None,
        }
    }

    /// Check if this is a mock (useful in tests)
    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, HostBufferInner::Mock { .. })
    }

    /// Get mock ID (for test assertions)
    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            HostBufferInner::Mock { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// A shader program resolved by name and feature set.
#[derive(Clone, Debug)]
pub struct HostShader {
    inner: HostShaderInner,
    features: ShaderFeatures,
}

#[derive(Clone, Debug)]
enum HostShaderInner {
    Real(wgpu::ShaderModule),
    #[cfg(feature = "mock")]
    Mock { id: usize },
}

impl HostShader {
    /// Create from real WGPU shader module
    pub fn from_wgpu(module: wgpu::ShaderModule, features: ShaderFeatures) -> Self {
        Self {
            inner: HostShaderInner::Real(module),
            features,
        }
    }

    /// Create mock shader (for testing)
    #[cfg(feature = "mock")]
    pub fn mock(id: usize, features: ShaderFeatures) -> Self {
        Self {
            inner: HostShaderInner::Mock { id },
            features,
        }
    }

    /// Feature permutation this program was built with.
    pub fn features(&self) -> ShaderFeatures {
        self.features
    }

    /// Get the underlying wgpu::ShaderModule, or `None` for a mock shader.
    pub fn as_wgpu(&self) -> Option<&wgpu::ShaderModule> {
        match &self.inner {
            HostShaderInner::Real(module) => Some(module),
            #[cfg(feature = "mock")]
            HostShaderInner::Mock { .. } => None,
        }
    }

    /// Check if this is a mock
    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, HostShaderInner::Mock { .. })
    }

    /// Get mock ID (for test assertions)
    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            HostShaderInner::Mock { id } => Some(*id),
            _ => None,
        }
    }
}

/// Non-owning reference to a texture that lives in the host.
///
/// Two handles are the same texture when their ids match; the cached size is
/// not part of the identity. The caller keeps the texture alive for as long
/// as a batch may still draw with the handle.
#[derive(Debug, Clone, Copy)]
pub struct TextureHandle {
    id: u64,
    width: u32,
    height: u32,
}

impl TextureHandle {
    pub const fn new(id: u64, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    #[inline]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height in texels.
    #[inline]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextureHandle {}

impl Hash for TextureHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

bitflags! {
    /// Vertex elements present in a vertex buffer, in declaration order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexElements: u8 {
        /// `Float32x3` position.
        const POSITION = 1 << 0;
        /// `Unorm8x4` packed RGBA color.
        const COLOR = 1 << 1;
        /// `Float32x2` texture coordinate.
        const TEXCOORD = 1 << 2;

        const SPRITE = Self::POSITION.bits() | Self::COLOR.bits() | Self::TEXCOORD.bits();
    }
}

impl VertexElements {
    const ORDER: [(VertexElements, wgpu::VertexFormat); 3] = [
        (VertexElements::POSITION, wgpu::VertexFormat::Float32x3),
        (VertexElements::COLOR, wgpu::VertexFormat::Unorm8x4),
        (VertexElements::TEXCOORD, wgpu::VertexFormat::Float32x2),
    ];

    /// Size of one vertex in bytes.
    pub fn stride(self) -> u64 {
        Self::ORDER
            .iter()
            .filter(|(element, _)| self.contains(*element))
            .map(|(_, format)| format.size())
            .sum()
    }

    /// Tightly packed attributes with shader locations assigned in order.
    pub fn attributes(self) -> Vec<wgpu::VertexAttribute> {
        let mut offset = 0;
        Self::ORDER
            .iter()
            .filter(|(element, _)| self.contains(*element))
            .enumerate()
            .map(|(location, (_, format))| {
                let attribute = wgpu::VertexAttribute {
                    format: *format,
                    offset,
                    shader_location: location as u32,
                };
                offset += format.size();
                attribute
            })
            .collect()
    }
}

bitflags! {
    /// Compile-time feature permutation of a shader program.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderFeatures: u8 {
        /// Sample the diffuse texture.
        const DIFFMAP = 1 << 0;
        /// Multiply by the per-vertex color.
        const VERTEXCOLOR = 1 << 1;
    }
}

impl ShaderFeatures {
    /// Parse a whitespace separated define list such as `"DIFFMAP VERTEXCOLOR"`.
    ///
    /// Unknown defines are skipped with a warning.
    pub fn from_defines(defines: &str) -> Self {
        defines
            .split_whitespace()
            .fold(Self::empty(), |features, define| {
                match Self::from_name(define) {
                    Some(flag) => features | flag,
                    None => {
                        tracing::warn!(define, "Ignoring unknown shader define");
                        features
                    }
                }
            })
    }
}

impl fmt::Display for ShaderFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// Static index buffer, filled once at creation.
#[derive(Debug, Clone, Default)]
pub struct IndexBufferDescriptor<'a> {
    pub label: Option<&'a str>,
}

/// Dynamic vertex buffer, rewritten by the caller between draws.
#[derive(Debug, Clone)]
pub struct VertexBufferDescriptor<'a> {
    pub label: Option<&'a str>,
    pub vertex_count: u32,
    pub elements: VertexElements,
}

impl VertexBufferDescriptor<'_> {
    /// Buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.vertex_count as u64 * self.elements.stride()
    }
}

/// Shader parameters the batch sets once per flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderParameter {
    /// Material tint multiplied into every fragment.
    MaterialDiffuseColor,
    /// Model matrix.
    Model,
    /// Combined view-projection matrix.
    ViewProjection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderValue {
    /// Linear RGBA.
    Color([f32; 4]),
    Mat4(Mat4),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureUnit {
    Diffuse,
}

/// One indexed draw submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub topology: wgpu::PrimitiveTopology,
    pub index_start: u32,
    pub index_count: u32,
    /// Lowest vertex the indices reference. A range hint, not a base offset.
    pub vertex_start: u32,
    pub vertex_count: u32,
}

impl DrawCall {
    pub fn triangle_list(index_count: u32, vertex_count: u32) -> Self {
        Self {
            topology: wgpu::PrimitiveTopology::TriangleList,
            index_start: 0,
            index_count,
            vertex_start: 0,
            vertex_count,
        }
    }
}

/// Per-draw limits reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLimits {
    pub max_vertices_per_draw: u32,
    pub max_indices_per_draw: u32,
}

impl Default for HostLimits {
    fn default() -> Self {
        Self {
            max_vertices_per_draw: u32::MAX,
            max_indices_per_draw: u32::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_handle_identity_ignores_size() {
        let a = TextureHandle::new(7, 32, 32);
        let b = TextureHandle::new(7, 64, 16);
        let c = TextureHandle::new(8, 32, 32);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(b.size(), (64, 16));
    }

    #[test]
    fn test_sprite_vertex_layout() {
        assert_eq!(VertexElements::SPRITE.stride(), 24);

        let attributes = VertexElements::SPRITE.attributes();
        assert_eq!(attributes.len(), 3);
        assert_eq!(attributes[0].offset, 0);
        assert_eq!(attributes[0].format, wgpu::VertexFormat::Float32x3);
        assert_eq!(attributes[1].offset, 12);
        assert_eq!(attributes[1].format, wgpu::VertexFormat::Unorm8x4);
        assert_eq!(attributes[2].offset, 16);
        assert_eq!(attributes[2].shader_location, 2);
    }

    #[test]
    fn test_partial_vertex_layout() {
        let elements = VertexElements::POSITION | VertexElements::TEXCOORD;
        assert_eq!(elements.stride(), 20);
        assert_eq!(elements.attributes()[1].offset, 12);
        assert_eq!(elements.attributes()[1].shader_location, 1);
    }

    #[test]
    fn test_shader_features_from_defines() {
        let features = ShaderFeatures::from_defines("DIFFMAP VERTEXCOLOR");
        assert_eq!(features, ShaderFeatures::DIFFMAP | ShaderFeatures::VERTEXCOLOR);
        assert_eq!(features.to_string(), "DIFFMAP VERTEXCOLOR");

        assert_eq!(
            ShaderFeatures::from_defines("  VERTEXCOLOR  UNKNOWN "),
            ShaderFeatures::VERTEXCOLOR
        );
        assert!(ShaderFeatures::from_defines("").is_empty());
    }

    #[test]
    fn test_vertex_buffer_size() {
        let desc = VertexBufferDescriptor {
            label: None,
            vertex_count: 8000,
            elements: VertexElements::SPRITE,
        };
        assert_eq!(desc.size(), 192_000);
    }
}
