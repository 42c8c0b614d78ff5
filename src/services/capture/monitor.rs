//! 请求监控器
//!
//! 宿主网络层按请求生命周期调用三个钩子：
//! 发起时提取 prompt 并暂存，完成时合并用量写入日志，失败时丢弃。

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::builder::LogRecordBuilder;
use super::classifier::classify;
use super::correlation::CorrelationStore;
use super::events::{HostEvent, RequestCompleted, RequestFailed, RequestInitiated};
use super::prompt_extractor::extract_prompt;
use super::usage_extractor::extract_usage;
use crate::error::AppResult;
use crate::models::{CaptureConfig, LogEntry};
use crate::services::prompt_log::LogSink;

/// 宿主网络层回调接口
pub trait NetworkObserver {
    fn on_request_initiated(&mut self, event: &RequestInitiated);

    /// 返回写入的日志；没有对应的待完成请求时返回 None
    fn on_request_completed(&mut self, event: &RequestCompleted) -> AppResult<Option<LogEntry>>;

    fn on_request_failed(&mut self, event: &RequestFailed);
}

/// 回放统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub events: usize,
    pub logged: usize,
    /// 写入失败的条数（不中断回放）
    pub failed_writes: usize,
}

pub struct RequestMonitor<S: LogSink> {
    store: CorrelationStore,
    sink: S,
    config: CaptureConfig,
}

impl<S: LogSink> RequestMonitor<S> {
    pub fn new(sink: S, config: CaptureConfig) -> Self {
        Self {
            store: CorrelationStore::new(),
            sink,
            config,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn pending_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_pending(&self, request_id: &str) -> bool {
        self.store.contains(request_id)
    }

    /// 按顺序回放事件，单条写入失败只记录警告
    pub fn replay<I>(&mut self, events: I) -> ReplayReport
    where
        I: IntoIterator<Item = HostEvent>,
    {
        let mut report = ReplayReport::default();
        for event in events {
            report.events += 1;
            tracing::trace!(request_id = event.request_id(), "回放事件");
            match event {
                HostEvent::Initiated(e) => self.on_request_initiated(&e),
                HostEvent::Failed(e) => self.on_request_failed(&e),
                HostEvent::Completed(e) => match self.on_request_completed(&e) {
                    Ok(Some(_)) => report.logged += 1,
                    Ok(None) => {}
                    Err(err) => {
                        report.failed_writes += 1;
                        tracing::warn!(request_id = %e.request_id, error = %err, "日志写入失败");
                    }
                },
            }
        }
        report
    }

    /// 会话结束：丢弃所有未完成请求
    pub fn shutdown(&mut self) -> usize {
        let dropped = self.store.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "会话结束，丢弃未完成请求");
        }
        dropped
    }

    fn sweep_stale(&mut self, now_ms: i64) {
        if let Some(max_age) = self.config.max_pending_age_ms {
            let evicted = self.store.evict_older_than(now_ms, max_age);
            if evicted > 0 {
                tracing::warn!(evicted, max_age_ms = max_age, "清理超时未完成的请求");
            }
        }
    }
}

impl<S: LogSink> NetworkObserver for RequestMonitor<S> {
    fn on_request_initiated(&mut self, event: &RequestInitiated) {
        self.sweep_stale(event.timestamp);

        if !event.is_post() {
            return;
        }
        if self.config.require_xhr && !event.is_xhr() {
            tracing::debug!(request_id = %event.request_id, "非 XHR 请求，忽略");
            return;
        }

        let site = classify(&event.url);
        if !site.is_known() {
            return;
        }

        let extracted = match event
            .body
            .as_ref()
            .and_then(|body| body.payload())
            .and_then(|payload| extract_prompt(&payload))
        {
            Some(extracted) => extracted,
            None => {
                tracing::debug!(request_id = %event.request_id, site = %site, "请求体无法解析，忽略");
                return;
            }
        };

        let pending = LogRecordBuilder::pending(
            &event.request_id,
            event.timestamp,
            site,
            extracted,
            self.config.max_prompt_len,
        );
        tracing::debug!(
            request_id = %event.request_id,
            site = %site,
            model = %pending.model,
            tokens_in = pending.tokens_in_estimate,
            "暂存请求"
        );
        self.store.put(event.request_id.clone(), pending);
    }

    fn on_request_completed(&mut self, event: &RequestCompleted) -> AppResult<Option<LogEntry>> {
        let pending = match self.store.take(&event.request_id) {
            Some(pending) => pending,
            None => {
                tracing::debug!(request_id = %event.request_id, "没有对应的待完成请求");
                return Ok(None);
            }
        };

        let usage = extract_usage(&event.response_headers);
        let completed_at = event
            .timestamp
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        let entry = LogRecordBuilder::build_at(pending, usage, completed_at);

        self.sink.append(&entry)?;
        tracing::info!(
            request_id = %event.request_id,
            site = %entry.site,
            prompt_hash = %entry.prompt_hash,
            tokens_in = entry.tokens_in_estimate,
            tokens_out = entry.tokens_out,
            "记录 Prompt 日志"
        );
        Ok(Some(entry))
    }

    fn on_request_failed(&mut self, event: &RequestFailed) {
        if self.store.discard(&event.request_id) {
            tracing::debug!(
                request_id = %event.request_id,
                error = event.error.as_deref().unwrap_or(""),
                "请求失败，丢弃"
            );
        }
    }
}

/// 线程安全包装，供多线程回调的宿主使用
pub struct SharedMonitor<S: LogSink> {
    inner: Mutex<RequestMonitor<S>>,
}

impl<S: LogSink> SharedMonitor<S> {
    pub fn new(monitor: RequestMonitor<S>) -> Self {
        Self {
            inner: Mutex::new(monitor),
        }
    }

    pub fn on_request_initiated(&self, event: &RequestInitiated) {
        self.lock().on_request_initiated(event)
    }

    pub fn on_request_completed(&self, event: &RequestCompleted) -> AppResult<Option<LogEntry>> {
        self.lock().on_request_completed(event)
    }

    pub fn on_request_failed(&self, event: &RequestFailed) {
        self.lock().on_request_failed(event)
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending_count()
    }

    pub fn shutdown(&self) -> usize {
        self.lock().shutdown()
    }

    pub fn into_inner(self) -> RequestMonitor<S> {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // 处理过程中不会留下半更新的状态，锁中毒后继续使用
    fn lock(&self) -> MutexGuard<'_, RequestMonitor<S>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
