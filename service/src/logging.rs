use crate::config::Config;
use log::LevelFilter;
use simplelog::{CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode};

/// Crates of this workspace. Their records are shown at the configured level.
const SDK_MODULES: &[&str] = &[
    "api_platform_sdk",
    "sweep_tokens",
    "domain",
    "platform_auth",
    "entity_api",
    "migration",
    "service",
];

/// Ceiling for everything else (HTTP stack, sqlx, sea-orm) unless tracing.
const DEPENDENCY_LEVEL: LevelFilter = LevelFilter::Warn;

pub struct Logger {}

impl Logger {
    /// Initializes the global logger from the configured level.
    ///
    /// SDK records are printed at `log_level_filter`. Dependencies are capped at
    /// `Warn` so request and SQL chatter stays out of normal output; at `Trace`
    /// a single unfiltered logger prints everything.
    pub fn init_logger(config: &Config) {
        CombinedLogger::init(Self::loggers(config.log_level_filter))
            .unwrap_or_else(|e| eprintln!("Logger already initialized: {e}"));
    }

    fn loggers(level: LevelFilter) -> Vec<Box<dyn SharedLogger>> {
        if level == LevelFilter::Trace {
            return vec![Self::term_logger(level, ConfigBuilder::new())];
        }

        let mut sdk = ConfigBuilder::new();
        let mut dependencies = ConfigBuilder::new();
        for module in SDK_MODULES {
            sdk.add_filter_allow_str(module);
            dependencies.add_filter_ignore_str(module);
        }

        vec![
            Self::term_logger(level, sdk),
            Self::term_logger(level.min(DEPENDENCY_LEVEL), dependencies),
        ]
    }

    fn term_logger(level: LevelFilter, mut builder: ConfigBuilder) -> Box<dyn SharedLogger> {
        builder.set_time_format_rfc3339();
        TermLogger::new(
            level,
            builder.build(),
            TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }
}
