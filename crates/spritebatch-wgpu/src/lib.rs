//! wgpu graphics host for `spritebatch`.
//!
//! [`WgpuGraphicsHost`] implements [`GraphicsHost`](spritebatch_host::GraphicsHost)
//! with a built-in WGSL `Basic` shader (vertex color x diffuse texture x tint)
//! and draws into whatever texture view the caller sets as the render target.
//! [`WgpuContext`] creates a headless device for tools and tests.

pub mod context;
pub mod host;

pub use context::{ContextError, WgpuContext, WgpuContextDescriptor};
pub use host::{BASIC_SHADER, WgpuGraphicsHost, WgpuHostOptions};
