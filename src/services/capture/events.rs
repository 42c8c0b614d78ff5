//! 宿主网络层事件
//!
//! 浏览器请求生命周期的三个钩子：发起、完成、失败。
//! 支持序列化为每行一个 JSON 对象，便于回放抓取结果。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::prompt_extractor::RequestPayload;

/// 只处理该类型的请求
pub const XHR_RESOURCE_TYPE: &str = "xmlhttprequest";

/// 原始请求体：文本或字节数组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawBody {
    Text(String),
    Bytes(Vec<u8>),
}

impl RawBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RawBody::Text(text) => text.as_bytes(),
            RawBody::Bytes(bytes) => bytes,
        }
    }
}

/// 请求体（与浏览器 webRequest 的 requestBody 结构对应）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<BTreeMap<String, Vec<String>>>,
}

impl RequestBody {
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            raw: Some(RawBody::Bytes(bytes.into())),
            form_data: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            raw: Some(RawBody::Text(text.into())),
            form_data: None,
        }
    }

    pub fn form(fields: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            raw: None,
            form_data: Some(fields),
        }
    }

    /// 转换为解析用的载荷：非空原始字节优先，其次表单字段
    pub fn payload(&self) -> Option<RequestPayload> {
        if let Some(raw) = self.raw.as_ref().filter(|raw| !raw.as_bytes().is_empty()) {
            return Some(RequestPayload::Raw(raw.as_bytes().to_vec()));
        }
        self.form_data.clone().map(RequestPayload::Form)
    }
}

/// 响应头
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub name: String,
    pub value: String,
}

impl ResponseHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 请求发起
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInitiated {
    pub request_id: String,
    pub method: String,
    pub url: String,
    /// 毫秒时间戳
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
}

impl RequestInitiated {
    pub fn post(
        request_id: impl Into<String>,
        url: impl Into<String>,
        timestamp: i64,
        body: RequestBody,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            method: "POST".to_string(),
            url: url.into(),
            timestamp,
            resource_type: Some(XHR_RESOURCE_TYPE.to_string()),
            body: Some(body),
        }
    }

    pub fn is_post(&self) -> bool {
        self.method.eq_ignore_ascii_case("POST")
    }

    /// 未标注类型时视为 XHR
    pub fn is_xhr(&self) -> bool {
        self.resource_type
            .as_deref()
            .map_or(true, |t| t.eq_ignore_ascii_case(XHR_RESOURCE_TYPE))
    }
}

/// 请求完成（已收到响应头）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCompleted {
    pub request_id: String,
    /// 毫秒时间戳，未提供时使用当前时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub response_headers: Vec<ResponseHeader>,
}

/// 请求失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFailed {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 宿主事件（回放文件中的一行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Initiated(RequestInitiated),
    Completed(RequestCompleted),
    Failed(RequestFailed),
}

impl HostEvent {
    pub fn request_id(&self) -> &str {
        match self {
            HostEvent::Initiated(e) => &e.request_id,
            HostEvent::Completed(e) => &e.request_id,
            HostEvent::Failed(e) => &e.request_id,
        }
    }
}
