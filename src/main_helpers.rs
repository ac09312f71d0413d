use anyhow::{Result, anyhow};
use applaunch_config::DebugConfig;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Filter used until the `[debug]` section is known.
const DEFAULT_DIRECTIVES: &str = "warn";

pub(crate) type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Install the stderr subscriber before configuration is loaded.
///
/// `RUST_LOG` takes precedence and is final. Otherwise warnings are shown
/// and the returned handle lets [`initialize_tracing_from_config`] swap in
/// the configured filter.
pub(crate) fn initialize_tracing() -> Result<Option<FilterHandle>> {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    let initial = if from_env {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(DEFAULT_DIRECTIVES)
    };
    let (filter, handle) = reload::Layer::new(initial);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::FULL);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))?;

    Ok((!from_env).then_some(handle))
}

/// Filter for the `[debug]` section; `None` keeps the default.
pub(crate) fn config_filter(debug_cfg: &DebugConfig) -> Result<Option<EnvFilter>> {
    if !debug_cfg.enable_tracing {
        return Ok(None);
    }
    let directives = debug_cfg.filter_directives();
    EnvFilter::try_new(&directives)
        .map(Some)
        .map_err(|err| anyhow!("invalid trace filter {directives:?}: {err}"))
}

pub(crate) fn initialize_tracing_from_config(
    handle: &FilterHandle,
    debug_cfg: &DebugConfig,
) -> Result<()> {
    let Some(filter) = config_filter(debug_cfg)? else {
        return Ok(());
    };
    handle
        .reload(filter)
        .map_err(|err| anyhow!("failed to apply trace filter: {err}"))?;

    tracing::info!(
        "Debug tracing enabled: filter={}, level={}",
        debug_cfg.filter_directives(),
        debug_cfg.trace_level
    );
    Ok(())
}
