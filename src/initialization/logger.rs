//! Logger initialization.

use log::LevelFilter;

/// Initializes the logger with the specified minimum level.
///
/// Configures `env_logger` reading `RUST_LOG` from the environment first,
/// then overrides with the provided `level`. This lets developers use
/// `RUST_LOG=debug` for quick debugging while still supporting explicit
/// control from the embedding application.
///
/// Returns an error if a logger was already installed.
pub fn init_logger_with(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Info);
    builder.filter_module("campus_store", level);
    builder.try_init()
}
