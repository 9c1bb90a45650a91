//! The sprite accumulator and renderer.

use std::sync::Arc;

use bytemuck::Zeroable;
use spritebatch_core::math::{Mat4, Vec2};
use spritebatch_core::profiling::{profile_function, profile_scope};
use spritebatch_host::{
    BlendMode, DrawCall, GraphicsHost, HostBuffer, HostShader, IndexBufferDescriptor,
    ShaderFeatures, ShaderParameter, ShaderValue, TextureHandle, TextureUnit,
    VertexBufferDescriptor,
};

use crate::descriptor::SpriteBatchDescriptor;
use crate::error::{Result, SpriteBatchError};
use crate::partition::{Portion, Portions};
use crate::projection::ProjectionCache;
use crate::transform::write_sprite_vertices;
use crate::vertex::{INDICES_PER_SPRITE, SpriteVertex, VERTICES_PER_SPRITE, quad_indices};
use crate::{Color, Sprite};

/// Result of one [`SpriteBatch::end`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Sprites drawn.
    pub sprites: usize,
    /// Draw calls issued.
    pub portions: usize,
}

/// Collects sprites between [`begin`](Self::begin) and [`end`](Self::end) and
/// draws them with one call per run of same-texture sprites.
///
/// Sprites are drawn in the order they were queued. A run ends when the
/// texture changes or the run reaches [`capacity`](Self::capacity) sprites.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "mock")]
/// # {
/// use std::sync::Arc;
/// use spritebatch::{Sprite, SpriteBatch, Vec2};
/// use spritebatch_host::MockGraphicsHost;
///
/// let host = Arc::new(MockGraphicsHost::new());
/// let player = host.create_texture(32, 32);
/// let mut batch = SpriteBatch::new(host.clone()).unwrap();
///
/// batch.begin().unwrap();
/// batch.draw(player, Vec2::new(10.0, 10.0)).unwrap();
/// batch
///     .draw_sprite(Sprite::new(player, Vec2::new(50.0, 10.0)).with_scale(2.0))
///     .unwrap();
/// let stats = batch.end().unwrap();
///
/// assert_eq!(stats.portions, 1);
/// assert_eq!(host.count_draws(), 1);
/// # }
/// ```
pub struct SpriteBatch {
    host: Arc<dyn GraphicsHost>,
    shader: HostShader,
    index_buffer: HostBuffer,
    vertex_buffer: HostBuffer,
    /// Queued sprites, kept until the next `begin`.
    sprites: Vec<Sprite>,
    /// CPU staging for one portion, `capacity * 4` vertices.
    vertices: Vec<SpriteVertex>,
    capacity: usize,
    projection: ProjectionCache,
    active: bool,
}

impl SpriteBatch {
    /// Create a batch with the default descriptor.
    pub fn new(host: Arc<dyn GraphicsHost>) -> Result<Self> {
        Self::with_descriptor(host, SpriteBatchDescriptor::default())
    }

    /// Create a batch, allocating its index and vertex buffers on `host`.
    pub fn with_descriptor(
        host: Arc<dyn GraphicsHost>,
        descriptor: SpriteBatchDescriptor,
    ) -> Result<Self> {
        profile_function!();

        let capacity = descriptor.capacity.resolve(host.limits())?;

        let features = ShaderFeatures::from_defines(&descriptor.shader.defines);
        let shader = host
            .shader(&descriptor.shader.name, features)
            .ok_or_else(|| SpriteBatchError::ShaderNotFound {
                name: descriptor.shader.name.clone(),
                defines: descriptor.shader.defines.clone(),
            })?;

        let indices = quad_indices(capacity);
        let index_buffer = host.create_index_buffer(
            &IndexBufferDescriptor {
                label: descriptor.label,
            },
            &indices,
        );

        let vertex_count = capacity * VERTICES_PER_SPRITE as u32;
        let vertex_buffer = host.create_vertex_buffer(&VertexBufferDescriptor {
            label: descriptor.label,
            vertex_count,
            elements: SpriteVertex::ELEMENTS,
        });

        tracing::info!(
            label = descriptor.label.unwrap_or("sprite batch"),
            capacity,
            vertex_bytes = vertex_buffer.size(),
            index_count = indices.len(),
            "Created sprite batch"
        );

        Ok(Self {
            host,
            shader,
            index_buffer,
            vertex_buffer,
            sprites: Vec::new(),
            vertices: vec![SpriteVertex::zeroed(); vertex_count as usize],
            capacity: capacity as usize,
            projection: ProjectionCache::new(),
            active: false,
        })
    }

    /// Start collecting sprites, discarding whatever the previous cycle queued.
    pub fn begin(&mut self) -> Result<()> {
        if self.active {
            return Err(SpriteBatchError::AlreadyBegun);
        }
        self.sprites.clear();
        self.active = true;
        Ok(())
    }

    /// Queue `texture` at `position`, untinted, unrotated and unscaled.
    pub fn draw(&mut self, texture: TextureHandle, position: Vec2) -> Result<()> {
        self.draw_sprite(Sprite::new(texture, position))
    }

    /// Queue a fully specified sprite.
    ///
    /// The texture behind `sprite.texture` must stay alive until [`end`](Self::end).
    pub fn draw_sprite(&mut self, sprite: Sprite) -> Result<()> {
        if !self.active {
            return Err(SpriteBatchError::NotBegun);
        }
        self.sprites.push(sprite);
        Ok(())
    }

    /// Draw everything queued since [`begin`](Self::begin).
    ///
    /// An empty batch touches the host not at all.
    pub fn end(&mut self) -> Result<BatchStats> {
        if !self.active {
            return Err(SpriteBatchError::NotBegun);
        }
        self.active = false;

        if self.sprites.is_empty() {
            return Ok(BatchStats::default());
        }

        profile_scope!("sprite_batch_end");

        self.bind_state();

        let host = self.host.as_ref();
        let mut portions = 0;
        for portion in Portions::new(&self.sprites, self.capacity) {
            profile_scope!("sprite_batch_portion");

            let sprites = &self.sprites[portion.range()];
            let vertices = &mut self.vertices[..portion.len * VERTICES_PER_SPRITE];
            let (width, height) = portion.texture.size();
            write_sprite_vertices(sprites, Vec2::new(width as f32, height as f32), vertices);

            host.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
            host.set_texture(TextureUnit::Diffuse, &portion.texture);
            host.draw(&portion_draw_call(&portion));

            tracing::trace!(
                start = portion.start,
                count = portion.len,
                texture = portion.texture.id(),
                "Flushed sprite portion"
            );
            portions += 1;
        }

        let stats = BatchStats {
            sprites: self.sprites.len(),
            portions,
        };
        tracing::debug!(sprites = stats.sprites, portions = stats.portions, "Sprite batch ended");

        Ok(stats)
    }

    /// The portions the queued sprites split into, without drawing anything.
    pub fn portions(&self) -> Portions<'_> {
        Portions::new(&self.sprites, self.capacity)
    }

    /// Sprites queued in the current or most recent cycle.
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Whether a `begin` is waiting for its `end`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Maximum sprites per draw call.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn host(&self) -> &Arc<dyn GraphicsHost> {
        &self.host
    }

    /// Pipeline state shared by every portion of one flush.
    fn bind_state(&mut self) {
        let view_projection = self.projection.get(self.host.screen_size());
        let host = self.host.as_ref();

        host.set_blend_mode(BlendMode::Alpha);
        host.set_vertex_buffer(&self.vertex_buffer);
        host.set_index_buffer(&self.index_buffer);
        host.set_shader(&self.shader);
        host.set_shader_parameter(
            ShaderParameter::MaterialDiffuseColor,
            ShaderValue::Color(Color::WHITE.to_array()),
        );
        host.set_shader_parameter(ShaderParameter::Model, ShaderValue::Mat4(Mat4::IDENTITY));
        host.set_shader_parameter(
            ShaderParameter::ViewProjection,
            ShaderValue::Mat4(view_projection),
        );
    }
}

fn portion_draw_call(portion: &Portion) -> DrawCall {
    DrawCall::triangle_list(
        (portion.len * INDICES_PER_SPRITE) as u32,
        (portion.len * VERTICES_PER_SPRITE) as u32,
    )
}

impl std::fmt::Debug for SpriteBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteBatch")
            .field("capacity", &self.capacity)
            .field("queued", &self.sprites.len())
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spritebatch_host::{HostCall, MockGraphicsHost};

    fn batch(host: &Arc<MockGraphicsHost>) -> SpriteBatch {
        SpriteBatch::new(host.clone()).unwrap()
    }

    #[test]
    fn test_construction_allocates_buffers() {
        let host = Arc::new(MockGraphicsHost::new());
        let batch = batch(&host);

        assert_eq!(batch.capacity(), 2000);
        assert_eq!(host.count_buffer_creates(), 2);
        assert!(host.calls().contains(&HostCall::CreateIndexBuffer {
            buffer_id: 0,
            index_count: 12_000,
        }));
        assert!(host.calls().contains(&HostCall::CreateVertexBuffer {
            buffer_id: 1,
            vertex_count: 8000,
            stride: 24,
        }));
    }

    #[test]
    fn test_missing_shader() {
        let host = Arc::new(MockGraphicsHost::new());
        host.unregister_shader("Basic");

        let err = SpriteBatch::new(host.clone()).unwrap_err();
        assert_eq!(
            err,
            SpriteBatchError::ShaderNotFound {
                name: "Basic".into(),
                defines: "DIFFMAP VERTEXCOLOR".into(),
            }
        );
        assert_eq!(host.count_buffer_creates(), 0);
    }

    #[test]
    fn test_state_machine() {
        let host = Arc::new(MockGraphicsHost::new());
        let texture = host.create_texture(8, 8);
        let mut batch = batch(&host);

        assert_eq!(batch.draw(texture, Vec2::ZERO), Err(SpriteBatchError::NotBegun));
        assert_eq!(batch.end(), Err(SpriteBatchError::NotBegun));

        batch.begin().unwrap();
        assert!(batch.is_active());
        assert_eq!(batch.begin(), Err(SpriteBatchError::AlreadyBegun));

        batch.end().unwrap();
        assert!(!batch.is_active());
        assert_eq!(batch.end(), Err(SpriteBatchError::NotBegun));
    }

    #[test]
    fn test_empty_end_touches_nothing() {
        let host = Arc::new(MockGraphicsHost::new());
        let mut batch = batch(&host);
        host.clear_calls();

        batch.begin().unwrap();
        let stats = batch.end().unwrap();

        assert_eq!(stats, BatchStats::default());
        assert_eq!(host.call_count(), 0);
    }

    #[test]
    fn test_sprites_survive_until_next_begin() {
        let host = Arc::new(MockGraphicsHost::new());
        let texture = host.create_texture(8, 8);
        let mut batch = batch(&host);

        batch.begin().unwrap();
        batch.draw(texture, Vec2::ZERO).unwrap();
        batch.draw(texture, Vec2::ONE).unwrap();
        batch.end().unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.portions().count(), 1);

        batch.begin().unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_state_bound_once_per_flush() {
        let host = Arc::new(MockGraphicsHost::new().with_screen_size(640, 480));
        let a = host.create_texture(8, 8);
        let b = host.create_texture(8, 8);
        let mut batch = batch(&host);
        host.clear_calls();

        batch.begin().unwrap();
        for texture in [a, b, a] {
            batch.draw(texture, Vec2::ZERO).unwrap();
        }
        batch.end().unwrap();

        let calls = host.calls();
        assert_eq!(calls[0], HostCall::SetBlendMode(BlendMode::Alpha));
        assert_eq!(
            calls.iter().filter(|c| matches!(c, HostCall::SetShader { .. })).count(),
            1
        );
        assert_eq!(
            host.shader_parameter(ShaderParameter::MaterialDiffuseColor),
            Some(ShaderValue::Color([1.0; 4]))
        );
        assert_eq!(
            host.shader_parameter(ShaderParameter::Model),
            Some(ShaderValue::Mat4(Mat4::IDENTITY))
        );
        assert_eq!(
            host.shader_parameter(ShaderParameter::ViewProjection),
            Some(ShaderValue::Mat4(crate::screen_projection((640, 480).into())))
        );
        assert_eq!(host.bound_textures(), vec![a.id(), b.id(), a.id()]);
    }

    #[test]
    fn test_write_precedes_each_draw() {
        let host = Arc::new(MockGraphicsHost::new());
        let a = host.create_texture(8, 8);
        let b = host.create_texture(8, 8);
        let mut batch = batch(&host);
        host.clear_calls();

        batch.begin().unwrap();
        batch.draw(a, Vec2::ZERO).unwrap();
        batch.draw(b, Vec2::ZERO).unwrap();
        batch.end().unwrap();

        let order: Vec<&str> = host
            .calls()
            .iter()
            .filter_map(|call| match call {
                HostCall::WriteBuffer { .. } => Some("write"),
                HostCall::SetTexture { .. } => Some("texture"),
                HostCall::Draw(_) => Some("draw"),
                _ => None,
            })
            .collect();
        assert_eq!(order, ["write", "texture", "draw", "write", "texture", "draw"]);
    }
}
