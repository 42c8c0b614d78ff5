//! 请求体解析：提取 prompt、模型名称与输入 Token 估算
//!
//! 各家接口的请求格式互不相同，这里按优先级依次探测字段。
//! 只有在请求体无法解码或不是合法 JSON 时才返回 None，
//! 合法 JSON 但没有可识别字段时返回空 prompt。

use std::collections::BTreeMap;

use serde_json::{json, Value};

/// 表单提交时按优先级查找的字段
const FORM_PROMPT_FIELDS: &[&str] = &["prompt", "q", "message"];

/// 模型字段（按优先级）
const MODEL_FIELDS: &[&str] = &["model", "engine", "model_name"];

/// 未识别到模型时的默认值
pub const UNKNOWN_MODEL: &str = "unknown";

/// 每个 Token 约等于的字符数
const CHARS_PER_TOKEN: usize = 4;

type FieldExtractor = fn(&Value) -> Option<String>;

/// prompt 字段探测表：第一个返回 Some 的条目生效
const PROMPT_PROBES: &[(&str, FieldExtractor)] = &[
    ("prompt", non_empty_str),
    ("messages", join_messages),
    ("input", non_empty_str),
    ("q", non_empty_str),
    ("query", non_empty_str),
    ("text", non_empty_str),
];

/// 宿主网络层提供的请求体
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    /// 原始字节（JSON 接口的常见情况）
    Raw(Vec<u8>),
    /// 表单字段（每个字段可能有多个值）
    Form(BTreeMap<String, Vec<String>>),
}

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPrompt {
    pub prompt: String,
    pub model: String,
    pub tokens_in_estimate: u64,
}

/// 从请求体中提取 prompt 信息
pub fn extract_prompt(payload: &RequestPayload) -> Option<ExtractedPrompt> {
    let json = decode_payload(payload)?;

    let prompt = probe(&json, PROMPT_PROBES).unwrap_or_default();
    let model = MODEL_FIELDS
        .iter()
        .find_map(|field| json.get(field).and_then(non_empty_str))
        .unwrap_or_else(|| UNKNOWN_MODEL.to_string());
    let tokens_in_estimate = estimate_tokens(&prompt);

    Some(ExtractedPrompt {
        prompt,
        model,
        tokens_in_estimate,
    })
}

/// 粗略估算 Token 数：ceil(字符数 / 4)
pub fn estimate_tokens(prompt: &str) -> u64 {
    prompt.chars().count().div_ceil(CHARS_PER_TOKEN) as u64
}

/// 按字符数截断（不会切断多字节字符）
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

fn decode_payload(payload: &RequestPayload) -> Option<Value> {
    let body = match payload {
        RequestPayload::Raw(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(e) => {
                tracing::debug!(error = %e, "请求体不是合法的 UTF-8，跳过");
                return None;
            }
        },
        RequestPayload::Form(fields) => {
            let values = FORM_PROMPT_FIELDS
                .iter()
                .find_map(|name| fields.get(*name))?;
            match values.first() {
                Some(value) => json!({ "prompt": value }).to_string(),
                None => json!({}).to_string(),
            }
        }
    };

    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(&body) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::debug!(error = %e, body_len = body.len(), "请求体不是合法 JSON，跳过");
            None
        }
    }
}

fn probe(json: &Value, probes: &[(&str, FieldExtractor)]) -> Option<String> {
    probes
        .iter()
        .find_map(|(field, extract)| json.get(*field).and_then(|v| extract(v)))
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// 拼接 messages 数组：每条优先取 content，其次 text，两者都没有则跳过
fn join_messages(value: &Value) -> Option<String> {
    let messages = value.as_array()?;
    let parts: Vec<String> = messages.iter().filter_map(message_text).collect();
    Some(parts.join("\n"))
}

fn message_text(message: &Value) -> Option<String> {
    message
        .get("content")
        .and_then(content_text)
        .or_else(|| message.get("text").and_then(non_empty_str))
}

/// content 可能是字符串，也可能是 [{type, text}, ...] 形式的分段数组
fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .filter(|t| !t.is_empty())
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.join("\n"))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(body: &str) -> RequestPayload {
        RequestPayload::Raw(body.as_bytes().to_vec())
    }

    fn form(fields: &[(&str, &str)]) -> RequestPayload {
        let mut map = BTreeMap::new();
        for (name, value) in fields {
            map.entry(name.to_string())
                .or_insert_with(Vec::new)
                .push(value.to_string());
        }
        RequestPayload::Form(map)
    }

    #[test]
    fn test_top_level_prompt_and_model() {
        let result = extract_prompt(&raw(r#"{"prompt":"Hello world","model":"gpt-x"}"#)).unwrap();
        assert_eq!(result.prompt, "Hello world");
        assert_eq!(result.model, "gpt-x");
        assert_eq!(result.tokens_in_estimate, 3);
    }

    #[test]
    fn test_invalid_utf8_is_absent() {
        assert!(extract_prompt(&RequestPayload::Raw(vec![0xff, 0xfe, 0x7b])).is_none());
        assert!(extract_prompt(&RequestPayload::Raw(vec![b'{', 0xc3, b'}'])).is_none());
    }

    #[test]
    fn test_invalid_json_is_absent() {
        assert!(extract_prompt(&raw("prompt=hello")).is_none());
        assert!(extract_prompt(&raw("")).is_none());
    }

    #[test]
    fn test_valid_json_without_fields_yields_empty_prompt() {
        let result = extract_prompt(&raw(r#"{"foo":1}"#)).unwrap();
        assert_eq!(result.prompt, "");
        assert_eq!(result.model, "unknown");
        assert_eq!(result.tokens_in_estimate, 0);
    }

    #[test]
    fn test_messages_joined_in_order() {
        let body = r#"{
            "model": "claude-3",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "text": "first"},
                {"role": "tool"},
                {"role": "user", "content": "second", "text": "ignored"}
            ]
        }"#;
        let result = extract_prompt(&raw(body)).unwrap();
        assert_eq!(result.prompt, "be brief\nfirst\nsecond");
        assert_eq!(result.model, "claude-3");
    }

    #[test]
    fn test_messages_content_parts() {
        let body = r#"{"messages":[{"content":[{"type":"text","text":"look"},{"type":"image_url"},{"type":"text","text":"here"}]}]}"#;
        let result = extract_prompt(&raw(body)).unwrap();
        assert_eq!(result.prompt, "look\nhere");
    }

    #[test]
    fn test_empty_messages_array_stops_probing() {
        let result = extract_prompt(&raw(r#"{"messages":[],"input":"later"}"#)).unwrap();
        assert_eq!(result.prompt, "");
    }

    #[test]
    fn test_non_array_messages_falls_through() {
        let result = extract_prompt(&raw(r#"{"messages":"oops","input":"later"}"#)).unwrap();
        assert_eq!(result.prompt, "later");
    }

    #[test]
    fn test_prompt_field_priority() {
        let result = extract_prompt(&raw(r#"{"text":"t","query":"qq","q":"q","input":"i"}"#)).unwrap();
        assert_eq!(result.prompt, "i");

        let result = extract_prompt(&raw(r#"{"text":"t","query":"qq"}"#)).unwrap();
        assert_eq!(result.prompt, "qq");

        // 空字符串视为缺失
        let result = extract_prompt(&raw(r#"{"prompt":"","text":"t"}"#)).unwrap();
        assert_eq!(result.prompt, "t");
    }

    #[test]
    fn test_model_field_priority() {
        let result = extract_prompt(&raw(r#"{"model_name":"c","engine":"b"}"#)).unwrap();
        assert_eq!(result.model, "b");

        let result = extract_prompt(&raw(r#"{"model_name":"c"}"#)).unwrap();
        assert_eq!(result.model, "c");
    }

    #[test]
    fn test_form_fields_priority() {
        let result = extract_prompt(&form(&[("message", "m"), ("q", "search me")])).unwrap();
        assert_eq!(result.prompt, "search me");
        assert_eq!(result.model, "unknown");

        let result = extract_prompt(&form(&[("prompt", "p"), ("q", "x")])).unwrap();
        assert_eq!(result.prompt, "p");
    }

    #[test]
    fn test_form_without_known_fields_is_absent() {
        assert!(extract_prompt(&form(&[("csrf", "abc")])).is_none());
    }

    #[test]
    fn test_form_value_with_quotes_is_escaped() {
        let result = extract_prompt(&form(&[("prompt", r#"say "hi""#)])).unwrap();
        assert_eq!(result.prompt, r#"say "hi""#);
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("你好世界你"), 2);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("你好世界", 3), "你好世");
        assert_eq!(truncate_chars("", 0), "");
    }
}
