pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{AppError, AppResult};
pub use models::{AppConfig, LogEntry, PendingRequest, SiteId, TokenUsage};
pub use services::capture::{
    HostEvent, NetworkObserver, RequestCompleted, RequestFailed, RequestInitiated, RequestMonitor,
    SharedMonitor,
};
pub use services::prompt_log::{LogSink, PromptLogDb};
