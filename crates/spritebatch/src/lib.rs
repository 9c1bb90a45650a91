//! Sprite batching for 2D rendering.
//!
//! A [`SpriteBatch`] collects textured quads between `begin` and `end`, then
//! splits them into contiguous runs that share a texture and draws each run
//! with a single indexed draw call on a [`GraphicsHost`].
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use std::sync::Arc;
//! use spritebatch::{SpriteBatch, Vec2};
//! use spritebatch_host::MockGraphicsHost;
//!
//! let host = Arc::new(MockGraphicsHost::new());
//! let grass = host.create_texture(16, 16);
//! let tree = host.create_texture(32, 64);
//!
//! let mut batch = SpriteBatch::new(host.clone()).unwrap();
//! batch.begin().unwrap();
//! for x in 0..10 {
//!     batch.draw(grass, Vec2::new(x as f32 * 16.0, 100.0)).unwrap();
//! }
//! batch.draw(tree, Vec2::new(40.0, 36.0)).unwrap();
//! let stats = batch.end().unwrap();
//!
//! assert_eq!(stats.sprites, 11);
//! assert_eq!(stats.portions, 2);
//! # }
//! ```

pub mod batch;
pub mod color;
pub mod descriptor;
pub mod error;
pub mod partition;
pub mod projection;
pub mod sprite;
pub mod transform;
pub mod vertex;

pub use batch::{BatchStats, SpriteBatch};
pub use color::Color;
pub use descriptor::{
    DEFAULT_PORTION_CAPACITY, PortionCapacity, ShaderDescriptor, SpriteBatchDescriptor,
};
pub use error::{Result, SpriteBatchError};
pub use partition::{Portion, Portions, portion_length};
pub use projection::{ProjectionCache, screen_projection};
pub use sprite::Sprite;
pub use vertex::{MAX_INDEXABLE_SPRITES, SpriteVertex};

pub use spritebatch_core::math::Vec2;
pub use spritebatch_host::{GraphicsHost, TextureHandle};
