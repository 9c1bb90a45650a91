use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "debug,wgpu_core=info,wgpu_hal=info,naga=info";

/// Installs a `fmt` subscriber with [`DEFAULT_FILTER`], or `RUST_LOG` when present.
///
/// Calling this more than once is harmless; only the first call installs a subscriber.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Installs a `fmt` subscriber using `default_filter` unless `RUST_LOG` overrides it.
pub fn init_with_filter(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::trace!("Global tracing subscriber already installed");
    }
}
