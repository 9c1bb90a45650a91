//! Construction-time configuration for [`SpriteBatch`](crate::SpriteBatch).

use spritebatch_host::HostLimits;

use crate::error::{Result, SpriteBatchError};
use crate::vertex::{INDICES_PER_SPRITE, MAX_INDEXABLE_SPRITES, VERTICES_PER_SPRITE};

/// Sprites per portion when nothing else is configured.
pub const DEFAULT_PORTION_CAPACITY: u32 = 2000;

/// How many sprites a single draw call may cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortionCapacity {
    /// Exactly `n` sprites, clamped down to what the host can draw at once.
    Fixed(u32),
    /// As many as the host limits and 16-bit indices allow.
    FromLimits,
}

impl Default for PortionCapacity {
    fn default() -> Self {
        PortionCapacity::Fixed(DEFAULT_PORTION_CAPACITY)
    }
}

impl PortionCapacity {
    /// Resolve to a concrete sprite count for a host with `limits`.
    pub fn resolve(self, limits: HostLimits) -> Result<u32> {
        let host_max = (limits.max_vertices_per_draw / VERTICES_PER_SPRITE as u32)
            .min(limits.max_indices_per_draw / INDICES_PER_SPRITE as u32);
        let max = host_max.min(MAX_INDEXABLE_SPRITES);

        match self {
            PortionCapacity::Fixed(requested) => {
                if requested == 0 || requested > MAX_INDEXABLE_SPRITES || max == 0 {
                    return Err(SpriteBatchError::InvalidCapacity { requested, max });
                }
                if requested > max {
                    tracing::warn!(
                        requested,
                        clamped = max,
                        "Sprite capacity exceeds host draw limits, clamping"
                    );
                }
                Ok(requested.min(max))
            }
            PortionCapacity::FromLimits => {
                if max == 0 {
                    return Err(SpriteBatchError::InvalidCapacity { requested: 0, max });
                }
                Ok(max)
            }
        }
    }
}

/// Shader program the batch asks the host for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDescriptor {
    pub name: String,
    /// Whitespace separated feature defines.
    pub defines: String,
}

impl Default for ShaderDescriptor {
    fn default() -> Self {
        Self {
            name: "Basic".to_string(),
            defines: "DIFFMAP VERTEXCOLOR".to_string(),
        }
    }
}

/// Descriptor for configuring sprite batch creation.
#[derive(Debug, Clone, Default)]
pub struct SpriteBatchDescriptor {
    /// Optional label for debugging, used for the host buffers
    pub label: Option<&'static str>,
    pub capacity: PortionCapacity,
    pub shader: ShaderDescriptor,
}

impl SpriteBatchDescriptor {
    /// Create a new descriptor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug label.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Set the portion capacity.
    pub fn capacity(mut self, capacity: PortionCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Use a different shader program.
    pub fn shader(mut self, name: impl Into<String>, defines: impl Into<String>) -> Self {
        self.shader = ShaderDescriptor {
            name: name.into(),
            defines: defines.into(),
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(vertices: u32, indices: u32) -> HostLimits {
        HostLimits {
            max_vertices_per_draw: vertices,
            max_indices_per_draw: indices,
        }
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(
            PortionCapacity::default().resolve(HostLimits::default()),
            Ok(2000)
        );
        let desc = SpriteBatchDescriptor::new();
        assert_eq!(desc.shader.name, "Basic");
        assert_eq!(desc.shader.defines, "DIFFMAP VERTEXCOLOR");
    }

    #[test]
    fn test_from_limits() {
        assert_eq!(
            PortionCapacity::FromLimits.resolve(HostLimits::default()),
            Ok(MAX_INDEXABLE_SPRITES)
        );
        // 4000 / 4 = 1000 vertices-bound, 3000 / 6 = 500 indices-bound.
        assert_eq!(PortionCapacity::FromLimits.resolve(limits(4000, 3000)), Ok(500));
        assert_eq!(PortionCapacity::FromLimits.resolve(limits(400, 60_000)), Ok(100));
        assert!(PortionCapacity::FromLimits.resolve(limits(3, 6)).is_err());
    }

    #[test]
    fn test_fixed_is_clamped_to_host() {
        assert_eq!(PortionCapacity::Fixed(2000).resolve(limits(4000, 6000)), Ok(1000));
        assert_eq!(PortionCapacity::Fixed(10).resolve(limits(4000, 6000)), Ok(10));
    }

    #[test]
    fn test_fixed_rejects_unindexable() {
        assert_eq!(
            PortionCapacity::Fixed(0).resolve(HostLimits::default()),
            Err(SpriteBatchError::InvalidCapacity {
                requested: 0,
                max: MAX_INDEXABLE_SPRITES
            })
        );
        assert!(
            PortionCapacity::Fixed(MAX_INDEXABLE_SPRITES + 1)
                .resolve(HostLimits::default())
                .is_err()
        );
        assert_eq!(
            PortionCapacity::Fixed(MAX_INDEXABLE_SPRITES).resolve(HostLimits::default()),
            Ok(MAX_INDEXABLE_SPRITES)
        );
    }

    #[test]
    fn test_builder() {
        let desc = SpriteBatchDescriptor::new()
            .label("hud")
            .capacity(PortionCapacity::Fixed(64))
            .shader("Unlit", "DIFFMAP");

        assert_eq!(desc.label, Some("hud"));
        assert_eq!(desc.capacity, PortionCapacity::Fixed(64));
        assert_eq!(desc.shader.name, "Unlit");
    }
}
