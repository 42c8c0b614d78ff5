//! 请求捕获核心
//!
//! - classifier: 按 URL 识别站点
//! - prompt_extractor: 从请求体提取 prompt / model
//! - usage_extractor: 从响应头提取输出 Token
//! - correlation: 发起与完成之间的请求关联
//! - builder: 生成最终日志
//! - monitor: 宿主回调入口

pub mod builder;
pub mod classifier;
pub mod correlation;
pub mod events;
pub mod monitor;
pub mod prompt_extractor;
pub mod usage_extractor;

pub use builder::{success_score, LogRecordBuilder};
pub use classifier::{classify, monitored_domains};
pub use correlation::CorrelationStore;
pub use events::{
    HostEvent, RawBody, RequestBody, RequestCompleted, RequestFailed, RequestInitiated,
    ResponseHeader,
};
pub use monitor::{NetworkObserver, ReplayReport, RequestMonitor, SharedMonitor};
pub use prompt_extractor::{extract_prompt, ExtractedPrompt, RequestPayload};
pub use usage_extractor::extract_usage;
