use thiserror::Error;

/// Errors reported by [`SpriteBatch`](crate::SpriteBatch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteBatchError {
    /// `draw` or `end` was called outside a `begin`/`end` pair.
    #[error("sprite batch used without a matching begin()")]
    NotBegun,

    /// `begin` was called while a batch was already collecting.
    #[error("begin() called while the sprite batch is already active")]
    AlreadyBegun,

    /// The host has no program for the requested shader permutation.
    #[error("graphics host has no shader '{name}' with defines '{defines}'")]
    ShaderNotFound { name: String, defines: String },

    /// The portion capacity cannot be used with 16-bit indices or the host limits.
    #[error("invalid sprite capacity {requested} (must be between 1 and {max})")]
    InvalidCapacity { requested: u32, max: u32 },
}

pub type Result<T, E = SpriteBatchError> = std::result::Result<T, E>;
