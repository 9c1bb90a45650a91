//! The capability surface the sprite batch renders through.

use spritebatch_core::geometry::Size;

use crate::{
    BlendMode, DrawCall, HostBuffer, HostLimits, HostShader, IndexBufferDescriptor,
    ShaderFeatures, ShaderParameter, ShaderValue, TextureHandle, TextureUnit,
    VertexBufferDescriptor,
};

/// Buffer, shader and draw primitives supplied by a host engine.
///
/// All methods take `&self`; implementations keep their pipeline state behind
/// interior mutability so a single host can be shared through an `Arc`.
///
/// State set through the `set_*` methods applies to every following
/// [`draw`](GraphicsHost::draw) until it is set again.
///
/// # Example
///
/// ```rust,no_run
/// use spritebatch_host::*;
///
/// fn draw_one_quad(host: &dyn GraphicsHost, vertices: &HostBuffer, texture: &TextureHandle) {
///     host.set_vertex_buffer(vertices);
///     host.set_texture(TextureUnit::Diffuse, texture);
///     host.draw(&DrawCall::triangle_list(6, 4));
/// }
/// ```
pub trait GraphicsHost: Send + Sync {
    // Buffer operations

    /// Create a static index buffer holding `indices`.
    fn create_index_buffer(&self, desc: &IndexBufferDescriptor, indices: &[u16]) -> HostBuffer;

    /// Create a dynamic vertex buffer of `desc.size()` bytes.
    fn create_vertex_buffer(&self, desc: &VertexBufferDescriptor) -> HostBuffer;

    /// Write `data` into `buffer` starting at byte `offset`.
    ///
    /// The write must be visible to every draw submitted after this call and
    /// to none submitted before it.
    fn write_buffer(&self, buffer: &HostBuffer, offset: u64, data: &[u8]);

    // Shader lookup

    /// Look up a shader program by name and feature permutation.
    fn shader(&self, name: &str, features: ShaderFeatures) -> Option<HostShader>;

    // Pipeline state

    fn set_blend_mode(&self, mode: BlendMode);

    fn set_vertex_buffer(&self, buffer: &HostBuffer);

    fn set_index_buffer(&self, buffer: &HostBuffer);

    fn set_shader(&self, shader: &HostShader);

    fn set_shader_parameter(&self, parameter: ShaderParameter, value: ShaderValue);

    fn set_texture(&self, unit: TextureUnit, texture: &TextureHandle);

    // Submission

    /// Submit an indexed draw with the current state.
    fn draw(&self, call: &DrawCall);

    // Queries

    /// Size of the current render target in pixels.
    fn screen_size(&self) -> Size<u32>;

    fn limits(&self) -> HostLimits;
}
