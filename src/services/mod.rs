pub mod capture;
pub mod prompt_log;

pub use capture::{NetworkObserver, RequestMonitor, SharedMonitor};
pub use prompt_log::{LogSink, PromptLogDb};
