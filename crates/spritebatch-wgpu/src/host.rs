//! [`GraphicsHost`] on top of a wgpu device.
//!
//! Every [`draw`](GraphicsHost::draw) records one render pass into its own
//! encoder and submits it right away. Buffer writes go through
//! `Queue::write_buffer`, which lands before the next submission, so a
//! vertex buffer rewritten between two draws is never observed early.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use bytemuck::{Pod, Zeroable};
use parking_lot::Mutex;
use spritebatch_core::geometry::Size;
use spritebatch_core::math::Mat4;
use spritebatch_core::profiling::profile_function;
use spritebatch_host::{
    BlendMode, DrawCall, GraphicsHost, HostBuffer, HostLimits, HostShader, IndexBufferDescriptor,
    ShaderFeatures, ShaderParameter, ShaderValue, TextureHandle, TextureUnit, VertexBufferDescriptor,
    VertexElements,
};
use wgpu::util::DeviceExt;

use crate::WgpuContext;

/// Name under which the built-in sprite shader is found.
pub const BASIC_SHADER: &str = "Basic";

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SpriteUniforms {
    tint: [f32; 4],
    model: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
}

impl Default for SpriteUniforms {
    fn default() -> Self {
        Self {
            tint: [1.0; 4],
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

struct RegisteredTexture {
    bind_group: wgpu::BindGroup,
    /// Set when the host created the texture and therefore keeps it alive.
    _texture: Option<wgpu::Texture>,
}

struct RenderTarget {
    view: wgpu::TextureView,
    size: Size<u32>,
}

#[derive(Default)]
struct DrawState {
    blend: BlendMode,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    features: Option<ShaderFeatures>,
    texture: Option<u64>,
    uniforms: SpriteUniforms,
    uniforms_dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    features: ShaderFeatures,
    blend: BlendMode,
    topology: wgpu::PrimitiveTopology,
}

/// Options for configuring the wgpu host.
#[derive(Debug, Clone)]
pub struct WgpuHostOptions {
    /// Filter mode for texture sampling (Linear or Nearest)
    pub filter_mode: wgpu::FilterMode,
}

impl Default for WgpuHostOptions {
    fn default() -> Self {
        Self {
            filter_mode: wgpu::FilterMode::Linear,
        }
    }
}

impl WgpuHostOptions {
    /// Nearest-neighbor filtering (pixel art).
    pub fn nearest() -> Self {
        Self {
            filter_mode: wgpu::FilterMode::Nearest,
        }
    }
}

/// A graphics host that renders into a caller-provided texture view.
///
/// # Example
///
/// ```ignore
/// let context = WgpuContext::new_owned_sync()?;
/// let host = Arc::new(WgpuGraphicsHost::new(context, wgpu::TextureFormat::Rgba8UnormSrgb));
/// let player = host.create_texture_rgba8(Some("player"), 32, 32, &pixels);
///
/// let mut batch = SpriteBatch::new(host.clone())?;
///
/// // Each frame:
/// host.set_render_target(frame_view, Size::new(width, height));
/// batch.begin()?;
/// batch.draw(player, Vec2::new(100.0, 100.0))?;
/// batch.end()?;
/// ```
pub struct WgpuGraphicsHost {
    context: Arc<WgpuContext>,
    target_format: wgpu::TextureFormat,
    module: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    pipelines: Mutex<AHashMap<PipelineKey, wgpu::RenderPipeline>>,
    textures: Mutex<AHashMap<u64, RegisteredTexture>>,
    next_texture_id: AtomicU64,
    target: Mutex<Option<RenderTarget>>,
    state: Mutex<DrawState>,
}

impl WgpuGraphicsHost {
    /// Create a host rendering into targets of `target_format`.
    pub fn new(context: Arc<WgpuContext>, target_format: wgpu::TextureFormat) -> Self {
        Self::new_with_options(context, target_format, WgpuHostOptions::default())
    }

    pub fn new_with_options(
        context: Arc<WgpuContext>,
        target_format: wgpu::TextureFormat,
        options: WgpuHostOptions,
    ) -> Self {
        profile_function!();
        let device = context.device();

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Basic Shader"),
            source: wgpu::ShaderSource::Wgsl(BASIC_SHADER_SOURCE.into()),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: options.filter_mode,
            min_filter: options.filter_mode,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SpriteUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Uniform Buffer"),
            contents: bytemuck::bytes_of(&SpriteUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        tracing::debug!(?target_format, "Created wgpu sprite host");

        Self {
            context,
            target_format,
            module,
            pipeline_layout,
            texture_layout,
            sampler,
            uniform_buffer,
            uniform_bind_group,
            pipelines: Mutex::new(AHashMap::new()),
            textures: Mutex::new(AHashMap::new()),
            next_texture_id: AtomicU64::new(1),
            target: Mutex::new(None),
            state: Mutex::new(DrawState::default()),
        }
    }

    pub fn context(&self) -> &Arc<WgpuContext> {
        &self.context
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    /// Render following draws into `view`, which is `size` pixels large.
    ///
    /// The view must have the format the host was created with.
    pub fn set_render_target(&self, view: wgpu::TextureView, size: Size<u32>) {
        *self.target.lock() = Some(RenderTarget { view, size });
    }

    pub fn clear_render_target(&self) {
        *self.target.lock() = None;
    }

    /// Make an existing texture drawable and return its handle.
    ///
    /// The caller keeps `texture` alive while the handle is in use.
    pub fn register_texture(&self, texture: &wgpu::Texture) -> TextureHandle {
        self.insert_texture(texture, false)
    }

    /// Upload tightly packed RGBA8 pixels into a new texture owned by the host.
    pub fn create_texture_rgba8(
        &self,
        label: Option<&str>,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> TextureHandle {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.context.device().create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.context.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        self.insert_texture(&texture, true)
    }

    /// Forget a texture. Returns false if the handle was unknown.
    pub fn unregister_texture(&self, handle: &TextureHandle) -> bool {
        self.textures.lock().remove(&handle.id()).is_some()
    }

    fn insert_texture(&self, texture: &wgpu::Texture, owned: bool) -> TextureHandle {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self
            .context
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Sprite Texture Bind Group"),
                layout: &self.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

        let id = self.next_texture_id.fetch_add(1, Ordering::Relaxed);
        self.textures.lock().insert(
            id,
            RegisteredTexture {
                bind_group,
                _texture: owned.then(|| texture.clone()),
            },
        );

        TextureHandle::new(id, texture.width(), texture.height())
    }

    fn pipeline(&self, key: PipelineKey) -> wgpu::RenderPipeline {
        let mut pipelines = self.pipelines.lock();
        if let Some(pipeline) = pipelines.get(&key) {
            return pipeline.clone();
        }

        tracing::debug!(
            features = %key.features,
            blend = ?key.blend,
            topology = ?key.topology,
            "Creating sprite pipeline"
        );

        let flag = |feature| if key.features.contains(feature) { 1.0_f64 } else { 0.0 };
        let constants = [
            ("DIFFMAP", flag(ShaderFeatures::DIFFMAP)),
            ("VERTEXCOLOR", flag(ShaderFeatures::VERTEXCOLOR)),
        ];
        let attributes = VertexElements::SPRITE.attributes();

        let pipeline = self
            .context
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Sprite Pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.module,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: VertexElements::SPRITE.stride(),
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(key.blend.color_target(self.target_format))],
                    compilation_options: wgpu::PipelineCompilationOptions {
                        constants: &constants,
                        ..Default::default()
                    },
                }),
                primitive: wgpu::PrimitiveState {
                    topology: key.topology,
                    strip_index_format: key
                        .topology
                        .is_strip()
                        .then_some(wgpu::IndexFormat::Uint16),
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            });

        pipelines.insert(key, pipeline.clone());
        pipeline
    }
}

impl GraphicsHost for WgpuGraphicsHost {
    fn create_index_buffer(&self, desc: &IndexBufferDescriptor, indices: &[u16]) -> HostBuffer {
        let buffer = self
            .context
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: desc.label,
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        HostBuffer::from_wgpu(buffer)
    }

    fn create_vertex_buffer(&self, desc: &VertexBufferDescriptor) -> HostBuffer {
        let buffer = self.context.device().create_buffer(&wgpu::BufferDescriptor {
            label: desc.label,
            size: desc.size(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        HostBuffer::from_wgpu(buffer)
    }

    fn write_buffer(&self, buffer: &HostBuffer, offset: u64, data: &[u8]) {
        match buffer.as_wgpu() {
            Some(buffer) => self.context.queue().write_buffer(buffer, offset, data),
            None => tracing::warn!("Ignoring write to a buffer that is not a wgpu buffer"),
        }
    }

    fn shader(&self, name: &str, features: ShaderFeatures) -> Option<HostShader> {
        if name != BASIC_SHADER {
            tracing::debug!(name, "Unknown shader requested");
            return None;
        }
        Some(HostShader::from_wgpu(self.module.clone(), features))
    }

    fn set_blend_mode(&self, mode: BlendMode) {
        self.state.lock().blend = mode;
    }

    fn set_vertex_buffer(&self, buffer: &HostBuffer) {
        self.state.lock().vertex_buffer = buffer.as_wgpu().cloned();
    }

    fn set_index_buffer(&self, buffer: &HostBuffer) {
        self.state.lock().index_buffer = buffer.as_wgpu().cloned();
    }

    fn set_shader(&self, shader: &HostShader) {
        self.state.lock().features = shader.as_wgpu().map(|_| shader.features());
    }

    fn set_shader_parameter(&self, parameter: ShaderParameter, value: ShaderValue) {
        let mut state = self.state.lock();
        match (parameter, value) {
            (ShaderParameter::MaterialDiffuseColor, ShaderValue::Color(tint)) => {
                state.uniforms.tint = tint;
            }
            (ShaderParameter::Model, ShaderValue::Mat4(model)) => {
                state.uniforms.model = model.to_cols_array_2d();
            }
            (ShaderParameter::ViewProjection, ShaderValue::Mat4(view_proj)) => {
                state.uniforms.view_proj = view_proj.to_cols_array_2d();
            }
            (parameter, value) => {
                tracing::warn!(?parameter, ?value, "Shader parameter type mismatch, ignoring");
                return;
            }
        }
        state.uniforms_dirty = true;
    }

    fn set_texture(&self, unit: TextureUnit, texture: &TextureHandle) {
        match unit {
            TextureUnit::Diffuse => self.state.lock().texture = Some(texture.id()),
        }
    }

    fn draw(&self, call: &DrawCall) {
        profile_function!();

        let target = self.target.lock();
        let Some(target) = target.as_ref() else {
            tracing::warn!("Draw submitted without a render target, skipping");
            return;
        };

        let mut state = self.state.lock();
        let (Some(vertex_buffer), Some(index_buffer), Some(features), Some(texture_id)) = (
            state.vertex_buffer.clone(),
            state.index_buffer.clone(),
            state.features,
            state.texture,
        ) else {
            tracing::warn!("Draw submitted with incomplete pipeline state, skipping");
            return;
        };

        let textures = self.textures.lock();
        let Some(texture) = textures.get(&texture_id) else {
            tracing::warn!(texture_id, "Draw references an unregistered texture, skipping");
            return;
        };

        if state.uniforms_dirty {
            self.context.queue().write_buffer(
                &self.uniform_buffer,
                0,
                bytemuck::bytes_of(&state.uniforms),
            );
            state.uniforms_dirty = false;
        }

        let pipeline = self.pipeline(PipelineKey {
            features,
            blend: state.blend,
            topology: call.topology,
        });

        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Sprite Draw Encoder"),
                });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Draw Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_bind_group(1, &texture.bind_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(call.index_start..call.index_start + call.index_count, 0, 0..1);
        }

        self.context.queue().submit(Some(encoder.finish()));
    }

    fn screen_size(&self) -> Size<u32> {
        self.target
            .lock()
            .as_ref()
            .map(|target| target.size)
            .unwrap_or_default()
    }

    fn limits(&self) -> HostLimits {
        let max_buffer_size = self.context.device().limits().max_buffer_size;
        let per_draw = |stride: u64| (max_buffer_size / stride).min(u32::MAX as u64) as u32;

        HostLimits {
            max_vertices_per_draw: per_draw(VertexElements::SPRITE.stride()),
            max_indices_per_draw: per_draw(std::mem::size_of::<u16>() as u64),
        }
    }
}

/// WGSL sprite shader: vertex color * diffuse texture * material tint.
const BASIC_SHADER_SOURCE: &str = r#"
override DIFFMAP: bool = true;
override VERTEXCOLOR: bool = true;

struct SpriteUniforms {
    tint: vec4<f32>,
    model: mat4x4<f32>,
    view_proj: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> uniforms: SpriteUniforms;

@group(1) @binding(0)
var diffuse_texture: texture_2d<f32>;
@group(1) @binding(1)
var diffuse_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * uniforms.model * vec4<f32>(in.position, 1.0);
    out.color = in.color;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var color = uniforms.tint;
    let sampled = textureSample(diffuse_texture, diffuse_sampler, in.uv);
    if DIFFMAP {
        color = color * sampled;
    }
    if VERTEXCOLOR {
        color = color * in.color;
    }
    return color;
}
"#;
