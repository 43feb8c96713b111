use crate::config::LogConfig;

/// Installs the global `tracing` subscriber.
pub fn init(cfg: &LogConfig) -> anyhow::Result<()> {
    let level: tracing::Level = cfg
        .level
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown log level {:?}", cfg.level))?;

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level);

    let installed = if cfg.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
