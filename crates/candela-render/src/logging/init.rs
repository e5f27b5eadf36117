use std::sync::Once;

/// Options for [`init_logging`].
///
/// With no explicit filter, `RUST_LOG` applies; failing that, everything at
/// `info` and above is shown, which keeps wgpu validation warnings visible.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Filter in `env_logger` syntax, e.g. `"candela_render=debug"`.
    /// Takes precedence over `RUST_LOG` when set.
    pub env_filter: Option<String>,
}

static LOGGER: Once = Once::new();

/// Installs the global logger. Calling it again is a no-op, so library
/// consumers and tests may both call it without coordinating.
pub fn init_logging(config: LoggingConfig) {
    LOGGER.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        let mut builder = env_logger::Builder::from_env(env);
        if let Some(filter) = &config.env_filter {
            builder.parse_filters(filter);
        }
        builder.init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        // A second call with a different config must not panic or re-init.
        init_logging(LoggingConfig {
            env_filter: Some("candela_render=debug".into()),
        });
    }
}
