//! Logging setup.
//!
//! Thin wrapper over `env_logger` so binaries get one consistent,
//! idempotent initialization path.

mod init;

pub use init::{LoggingConfig, init_logging};
