//! Tracing subscriber setup.

use agora_config::ObservabilityConfig;
use tracing::debug;
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Directives used when `RUST_LOG` is unset: the configured level for
/// everything, HTTP internals kept quieter.
pub fn default_directives(config: &ObservabilityConfig) -> String {
    format!("{level},tower_http=info,hyper=warn", level = config.log_level)
}

/// Swaps the active filter after a configuration reload.
#[derive(Clone)]
pub struct LogFilterHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    pinned_by_env: bool,
}

impl LogFilterHandle {
    /// Applies the configured level. A no-op while `RUST_LOG` is set.
    pub fn apply(&self, config: &ObservabilityConfig) -> anyhow::Result<()> {
        if self.pinned_by_env {
            debug!("RUST_LOG is set, keeping the current log filter");
            return Ok(());
        }
        self.handle
            .reload(EnvFilter::try_new(default_directives(config))?)?;
        Ok(())
    }

    /// The active filter directives, if the subscriber is still alive.
    pub fn current(&self) -> Option<String> {
        self.handle.with_current(ToString::to_string).ok()
    }
}

fn reloadable(
    filter: EnvFilter,
    pinned_by_env: bool,
) -> (reload::Layer<EnvFilter, Registry>, LogFilterHandle) {
    let (layer, handle) = reload::Layer::new(filter);
    (
        layer,
        LogFilterHandle {
            handle,
            pinned_by_env,
        },
    )
}

/// Installs the global subscriber. `RUST_LOG` wins over `log_level`.
///
/// `log_format = "json"` emits one JSON object per event, anything else
/// the human-readable format. The format is fixed for the process; only
/// the filter can change afterwards, through the returned handle.
pub fn init_tracing(config: &ObservabilityConfig) -> anyhow::Result<LogFilterHandle> {
    let (filter, pinned_by_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::try_new(default_directives(config))?, false),
    };
    let (filter, handle) = reloadable(filter, pinned_by_env);

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observability(level: &str) -> ObservabilityConfig {
        ObservabilityConfig {
            log_level: level.to_string(),
            log_format: "pretty".to_string(),
        }
    }

    fn has_directive(handle: &LogFilterHandle, directive: &str) -> bool {
        handle
            .current()
            .unwrap()
            .split(',')
            .any(|d| d == directive)
    }

    #[test]
    fn test_default_directives_use_level() {
        assert!(default_directives(&observability("debug")).starts_with("debug,"));
    }

    #[test]
    fn test_apply_swaps_level() {
        let (layer, handle) = reloadable(EnvFilter::new("info"), false);
        let _subscriber = tracing_subscriber::registry().with(layer);
        assert!(has_directive(&handle, "info"));

        handle.apply(&observability("debug")).unwrap();
        assert!(has_directive(&handle, "debug"));
        assert!(has_directive(&handle, "hyper=warn"));
    }

    #[test]
    fn test_apply_keeps_env_filter() {
        let (layer, handle) = reloadable(EnvFilter::new("warn"), true);
        let _subscriber = tracing_subscriber::registry().with(layer);

        handle.apply(&observability("trace")).unwrap();
        assert!(has_directive(&handle, "warn"));
        assert!(!has_directive(&handle, "trace"));
    }
}
