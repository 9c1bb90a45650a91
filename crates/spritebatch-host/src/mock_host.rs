//! Mock implementation of GraphicsHost for testing.
//!
//! The mock keeps buffer contents in memory and records every call so tests
//! can assert on the exact sequence of state changes and draws.

use parking_lot::Mutex;
use spritebatch_core::geometry::Size;

use crate::{
    BlendMode, DrawCall, GraphicsHost, HostBuffer, HostLimits, HostShader,
    IndexBufferDescriptor, ShaderFeatures, ShaderParameter, ShaderValue, TextureHandle,
    TextureUnit, VertexBufferDescriptor,
};

/// Records a host operation for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateIndexBuffer {
        buffer_id: usize,
        index_count: usize,
    },
    CreateVertexBuffer {
        buffer_id: usize,
        vertex_count: u32,
        stride: u64,
    },
    WriteBuffer {
        buffer_id: usize,
        offset: u64,
        data: Vec<u8>,
    },
    Shader {
        name: String,
        features: ShaderFeatures,
        found: bool,
    },
    SetBlendMode(BlendMode),
    SetVertexBuffer {
        buffer_id: usize,
    },
    SetIndexBuffer {
        buffer_id: usize,
    },
    SetShader {
        shader_id: usize,
    },
    SetShaderParameter {
        parameter: ShaderParameter,
        value: ShaderValue,
    },
    SetTexture {
        unit: TextureUnit,
        texture_id: u64,
    },
    Draw(DrawCall),
}

#[derive(Debug, Clone)]
struct MockBuffer {
    contents: Vec<u8>,
}

/// Mock implementation of GraphicsHost for testing.
///
/// Every `&self` method records into a `Mutex<Vec<HostCall>>`; `parking_lot`
/// keeps the mock `Send + Sync` like a real host.
///
/// # Example
///
/// ```rust
/// use spritebatch_host::*;
///
/// let host = MockGraphicsHost::new();
/// let texture = host.create_texture(32, 32);
///
/// host.set_texture(TextureUnit::Diffuse, &texture);
/// host.draw(&DrawCall::triangle_list(6, 4));
///
/// assert_eq!(host.count_draws(), 1);
/// assert_eq!(host.bound_textures(), vec![texture.id()]);
/// ```
pub struct MockGraphicsHost {
    /// Recorded calls for verification
    calls: Mutex<Vec<HostCall>>,

    /// Buffer contents indexed by mock id
    buffers: Mutex<Vec<MockBuffer>>,

    /// Shader names the mock resolves
    shaders: Mutex<Vec<String>>,

    screen_size: Mutex<Size<u32>>,
    limits: Mutex<HostLimits>,

    next_shader_id: Mutex<usize>,
    next_texture_id: Mutex<u64>,
}

impl MockGraphicsHost {
    /// Screen size a fresh mock reports.
    pub const DEFAULT_SCREEN_SIZE: Size<u32> = Size::new(800, 600);

    /// Create a mock host that resolves the `Basic` shader.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            buffers: Mutex::new(Vec::new()),
            shaders: Mutex::new(vec!["Basic".to_string()]),
            screen_size: Mutex::new(Self::DEFAULT_SCREEN_SIZE),
            limits: Mutex::new(HostLimits::default()),
            next_shader_id: Mutex::new(0),
            next_texture_id: Mutex::new(1),
        }
    }

    pub fn with_limits(self, limits: HostLimits) -> Self {
        *self.limits.lock() = limits;
        self
    }

    pub fn with_screen_size(self, width: u32, height: u32) -> Self {
        self.set_screen_size(width, height);
        self
    }

    /// Change the reported screen size, as a window resize would.
    pub fn set_screen_size(&self, width: u32, height: u32) {
        *self.screen_size.lock() = Size::new(width, height);
    }

    /// Make `shader(name, ..)` resolve.
    pub fn register_shader(&self, name: &str) {
        let mut shaders = self.shaders.lock();
        if !shaders.iter().any(|s| s == name) {
            shaders.push(name.to_string());
        }
    }

    /// Make `shader(name, ..)` return `None`.
    pub fn unregister_shader(&self, name: &str) {
        self.shaders.lock().retain(|s| s != name);
    }

    /// Hand out a texture handle with a fresh id. Nothing is recorded.
    pub fn create_texture(&self, width: u32, height: u32) -> TextureHandle {
        let mut id = self.next_texture_id.lock();
        let texture_id = *id;
        *id += 1;
        TextureHandle::new(texture_id, width, height)
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Clear recorded calls (useful between test steps).
    ///
    /// Buffer contents are kept.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Get total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count_draws(&self) -> usize {
        self.count(|call| matches!(call, HostCall::Draw(_)))
    }

    pub fn count_buffer_writes(&self) -> usize {
        self.count(|call| matches!(call, HostCall::WriteBuffer { .. }))
    }

    pub fn count_buffer_creates(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                HostCall::CreateIndexBuffer { .. } | HostCall::CreateVertexBuffer { .. }
            )
        })
    }

    /// Count every call that changes pipeline state.
    pub fn count_state_changes(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                HostCall::SetBlendMode(_)
                    | HostCall::SetVertexBuffer { .. }
                    | HostCall::SetIndexBuffer { .. }
                    | HostCall::SetShader { .. }
                    | HostCall::SetShaderParameter { .. }
                    | HostCall::SetTexture { .. }
            )
        })
    }

    /// Draw calls in submission order.
    pub fn draws(&self) -> Vec<DrawCall> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::Draw(draw) => Some(*draw),
                _ => None,
            })
            .collect()
    }

    /// Payloads of every buffer write, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::WriteBuffer { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Ids of textures bound to the diffuse unit, in order.
    pub fn bound_textures(&self) -> Vec<u64> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::SetTexture {
                    unit: TextureUnit::Diffuse,
                    texture_id,
                } => Some(*texture_id),
                _ => None,
            })
            .collect()
    }

    /// Most recent value set for `parameter`.
    pub fn shader_parameter(&self, parameter: ShaderParameter) -> Option<ShaderValue> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            HostCall::SetShaderParameter { parameter: p, value } if *p == parameter => {
                Some(*value)
            }
            _ => None,
        })
    }

    /// Current contents of a mock buffer.
    pub fn buffer_contents(&self, buffer: &HostBuffer) -> Option<Vec<u8>> {
        let id = buffer.mock_id()?;
        self.buffers.lock().get(id).map(|b| b.contents.clone())
    }

    fn count(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }

    fn allocate_buffer(&self, contents: Vec<u8>) -> HostBuffer {
        let mut buffers = self.buffers.lock();
        let id = buffers.len();
        let size = contents.len() as u64;
        buffers.push(MockBuffer { contents });
        HostBuffer::mock(id, size)
    }
}

impl Default for MockGraphicsHost {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsHost for MockGraphicsHost {
    fn create_index_buffer(&self, _desc: &IndexBufferDescriptor, indices: &[u16]) -> HostBuffer {
        let contents = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        let buffer = self.allocate_buffer(contents);

        if let Some(buffer_id) = buffer.mock_id() {
            self.record(HostCall::CreateIndexBuffer {
                buffer_id,
                index_count: indices.len(),
            });
        }

        buffer
    }

    fn create_vertex_buffer(&self, desc: &VertexBufferDescriptor) -> HostBuffer {
        let buffer = self.allocate_buffer(vec![0; desc.size() as usize]);

        if let Some(buffer_id) = buffer.mock_id() {
            self.record(HostCall::CreateVertexBuffer {
                buffer_id,
                vertex_count: desc.vertex_count,
                stride: desc.elements.stride(),
            });
        }

        buffer
    }

    fn write_buffer(&self, buffer: &HostBuffer, offset: u64, data: &[u8]) {
        let Some(buffer_id) = buffer.mock_id() else {
            return;
        };

        if let Some(mock) = self.buffers.lock().get_mut(buffer_id) {
            let start = offset as usize;
            let end = start + data.len();
            assert!(
                end <= mock.contents.len(),
                "write of {} bytes at {} overflows mock buffer {} ({} bytes)",
                data.len(),
                offset,
                buffer_id,
                mock.contents.len()
            );
            mock.contents[start..end].copy_from_slice(data);
        }

        self.record(HostCall::WriteBuffer {
            buffer_id,
            offset,
            data: data.to_vec(),
        });
    }

    fn shader(&self, name: &str, features: ShaderFeatures) -> Option<HostShader> {
        let found = self.shaders.lock().iter().any(|s| s == name);

        self.record(HostCall::Shader {
            name: name.to_string(),
            features,
            found,
        });

        found.then(|| {
            let mut id = self.next_shader_id.lock();
            let shader_id = *id;
            *id += 1;
            HostShader::mock(shader_id, features)
        })
    }

    fn set_blend_mode(&self, mode: BlendMode) {
        self.record(HostCall::SetBlendMode(mode));
    }

    fn set_vertex_buffer(&self, buffer: &HostBuffer) {
        if let Some(buffer_id) = buffer.mock_id() {
            self.record(HostCall::SetVertexBuffer { buffer_id });
        }
    }

    fn set_index_buffer(&self, buffer: &HostBuffer) {
        if let Some(buffer_id) = buffer.mock_id() {
            self.record(HostCall::SetIndexBuffer { buffer_id });
        }
    }

    fn set_shader(&self, shader: &HostShader) {
        if let Some(shader_id) = shader.mock_id() {
            self.record(HostCall::SetShader { shader_id });
        }
    }

    fn set_shader_parameter(&self, parameter: ShaderParameter, value: ShaderValue) {
        self.record(HostCall::SetShaderParameter { parameter, value });
    }

    fn set_texture(&self, unit: TextureUnit, texture: &TextureHandle) {
        self.record(HostCall::SetTexture {
            unit,
            texture_id: texture.id(),
        });
    }

    fn draw(&self, call: &DrawCall) {
        self.record(HostCall::Draw(*call));
    }

    fn screen_size(&self) -> Size<u32> {
        *self.screen_size.lock()
    }

    fn limits(&self) -> HostLimits {
        *self.limits.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VertexElements;

    #[test]
    fn test_mock_index_buffer_keeps_contents() {
        let host = MockGraphicsHost::new();

        let buffer = host.create_index_buffer(&IndexBufferDescriptor::default(), &[0, 1, 2, 513]);

        assert!(buffer.is_mock());
        assert_eq!(buffer.size(), 8);
        assert_eq!(host.count_buffer_creates(), 1);
        assert_eq!(
            host.buffer_contents(&buffer),
            Some(vec![0, 0, 1, 0, 2, 0, 1, 2])
        );
    }

    #[test]
    fn test_mock_buffer_write() {
        let host = MockGraphicsHost::new();
        let buffer = host.create_vertex_buffer(&VertexBufferDescriptor {
            label: None,
            vertex_count: 2,
            elements: VertexElements::SPRITE,
        });
        assert_eq!(buffer.size(), 48);

        host.write_buffer(&buffer, 24, &[7u8; 24]);

        assert_eq!(host.count_buffer_writes(), 1);
        assert_eq!(host.writes(), vec![vec![7u8; 24]]);
        let contents = host.buffer_contents(&buffer).unwrap();
        assert!(contents[..24].iter().all(|b| *b == 0));
        assert!(contents[24..].iter().all(|b| *b == 7));
    }

    #[test]
    #[should_panic(expected = "overflows mock buffer")]
    fn test_mock_buffer_overflow_panics() {
        let host = MockGraphicsHost::new();
        let buffer = host.create_vertex_buffer(&VertexBufferDescriptor {
            label: None,
            vertex_count: 1,
            elements: VertexElements::SPRITE,
        });
        host.write_buffer(&buffer, 0, &[0u8; 48]);
    }

    #[test]
    fn test_mock_shader_lookup() {
        let host = MockGraphicsHost::new();
        let features = ShaderFeatures::DIFFMAP | ShaderFeatures::VERTEXCOLOR;

        let shader = host.shader("Basic", features).unwrap();
        assert!(shader.is_mock());
        assert_eq!(shader.features(), features);
        assert!(host.shader("Unlit", features).is_none());

        host.unregister_shader("Basic");
        assert!(host.shader("Basic", features).is_none());

        host.register_shader("Unlit");
        assert!(host.shader("Unlit", features).is_some());
    }

    #[test]
    fn test_mock_textures_get_distinct_ids() {
        let host = MockGraphicsHost::new();
        let a = host.create_texture(16, 16);
        let b = host.create_texture(16, 16);

        assert_ne!(a, b);
        assert_eq!(host.call_count(), 0);
    }

    #[test]
    fn test_screen_size_and_limits() {
        let limits = HostLimits {
            max_vertices_per_draw: 400,
            max_indices_per_draw: 600,
        };
        let host = MockGraphicsHost::new()
            .with_screen_size(1024, 768)
            .with_limits(limits);

        assert_eq!(host.screen_size(), Size::new(1024, 768));
        assert_eq!(host.limits(), limits);

        host.set_screen_size(0, 0);
        assert!(host.screen_size().is_empty());
    }

    #[test]
    fn test_clear_calls() {
        let host = MockGraphicsHost::new();
        host.set_blend_mode(BlendMode::Alpha);
        host.draw(&DrawCall::triangle_list(6, 4));

        assert_eq!(host.call_count(), 2);
        assert_eq!(host.count_state_changes(), 1);

        host.clear_calls();
        assert_eq!(host.call_count(), 0);
    }

    #[test]
    fn test_host_trait_object() {
        fn uses_host(host: &dyn GraphicsHost) -> usize {
            let shader = host.shader("Basic", ShaderFeatures::DIFFMAP);
            shader.map(|s| s.features().bits() as usize).unwrap_or(0)
        }

        let host = MockGraphicsHost::new();
        assert_eq!(uses_host(&host), ShaderFeatures::DIFFMAP.bits() as usize);
    }
}
