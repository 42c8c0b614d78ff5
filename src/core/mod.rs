pub mod logger;

pub use logger::{init_logger, LogConfig, LogFormat, LogLevel, LogOutput};
