use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global tracing subscriber for binder diagnostics.
///
/// What the binder emits, by level:
///
/// - `warn`: property values skipped because ignore-invalid-fields is on.
/// - `debug`: the start and failure of each bind, the source and raw key
///   every property resolved from, fallback lookups, validation failures and
///   targets skipped for having no configuration options.
/// - `trace`: bind state transitions and members dropped for lacking a
///   writable location.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Fails if a
/// global subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
