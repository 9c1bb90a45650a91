//! Blend state requested by the batch before its draws.

/// How sprite fragments combine with what is already in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Straight alpha over the destination. Set by every non-empty flush.
    #[default]
    Alpha,

    /// Any other blend state a host caller wants to pipeline with.
    Custom(wgpu::BlendState),
}

impl BlendMode {
    pub fn blend_state(self) -> wgpu::BlendState {
        match self {
            BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
            BlendMode::Custom(state) => state,
        }
    }

    /// Color target for a sprite pipeline writing into `format`.
    pub fn color_target(self, format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
        wgpu::ColorTargetState {
            format,
            blend: Some(self.blend_state()),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}

impl From<wgpu::BlendState> for BlendMode {
    fn from(state: wgpu::BlendState) -> Self {
        BlendMode::Custom(state)
    }
}
