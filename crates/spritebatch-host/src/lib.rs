//! Graphics host abstraction for the sprite batcher.
//!
//! The batcher never talks to a device directly. It needs a small set of
//! primitives from whatever engine it runs inside: create and write buffers,
//! look up a shader, set pipeline state and submit indexed draws. Those
//! primitives make up the [`GraphicsHost`] trait.
//!
//! # Overview
//!
//! - [`GraphicsHost`] - Trait the batcher renders through
//! - `MockGraphicsHost` - Recording implementation for tests (requires `mock` feature)
//! - Host handle types ([`HostBuffer`], [`HostShader`], [`TextureHandle`]) - Can be real or mock
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use spritebatch_host::*;
//!
//! let host = MockGraphicsHost::new();
//! let buffer = host.create_vertex_buffer(&VertexBufferDescriptor {
//!     label: Some("sprites"),
//!     vertex_count: 4,
//!     elements: VertexElements::SPRITE,
//! });
//!
//! host.write_buffer(&buffer, 0, &[0u8; 96]);
//!
//! assert!(buffer.is_mock());
//! assert_eq!(host.count_buffer_writes(), 1);
//! # }
//! ```
//!
//! # Object Safety
//!
//! `GraphicsHost` is object-safe and every method takes `&self`, so a batch
//! holds an `Arc<dyn GraphicsHost>` and hosts use interior mutability for
//! their pipeline state.

pub mod blend;
pub mod graphics_host;
pub mod host_types;
#[cfg(feature = "mock")]
pub mod mock_host;

pub use blend::BlendMode;
pub use graphics_host::*;
pub use host_types::*;
#[cfg(feature = "mock")]
pub use mock_host::*;
