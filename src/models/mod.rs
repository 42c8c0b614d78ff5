pub mod config;
pub mod prompt_log;
pub mod site;

pub use config::{AppConfig, CaptureConfig, StorageConfig};
pub use prompt_log::{LogEntry, PendingRequest, TokenUsage};
pub use site::SiteId;
