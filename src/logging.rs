//! Logger setup for binaries embedding the panel core.
//!
//! The library itself only talks to the `log` facade.

use log::LevelFilter;

/// Default level for a `-v` count: warnings, then info, debug and trace.
#[must_use]
pub fn level_for(verbosity: u8) -> LevelFilter {
	match verbosity {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Info,
		2 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	}
}

/// Install `env_logger` on stderr. `RUST_LOG` overrides the verbosity.
///
/// Calling this more than once keeps the first logger.
pub fn initialize(verbosity: u8) {
	let default = level_for(verbosity).as_str().to_ascii_lowercase();
	let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
		.format_timestamp_millis()
		.try_init();
	if result.is_err() {
		log::debug!("logger already initialized");
	}
}
