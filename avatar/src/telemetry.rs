use color_eyre::eyre::WrapErr;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;
use tracing_tree::HierarchicalLayer;

/// Install the global tracing subscriber. `RUST_LOG` wins over
/// `default_directive` when set.
pub fn setup_tracing(default_directive: &str) -> color_eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .wrap_err_with(|| format!("Invalid tracing directive {default_directive:?}"))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
        .try_init()
        .wrap_err("Failed to install tracing subscriber")?;

    Ok(())
}
