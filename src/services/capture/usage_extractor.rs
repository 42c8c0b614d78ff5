//! 响应头解析：提取服务端报告的输出 Token 数
//!
//! 遍历全部响应头，按名称（不区分大小写）匹配各家约定，
//! 后出现的匹配覆盖先出现的。格式不对的头直接忽略，永不失败。

use serde_json::Value;

use super::events::ResponseHeader;
use crate::models::TokenUsage;

/// 响应头取值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UsageRule {
    /// 值为 JSON 对象，读取其中的整数字段
    JsonField(&'static str),
    /// 值为整数字符串
    Integer,
}

/// 各家约定的用量响应头（按优先级排列）
const USAGE_HEADERS: &[(&[&str], UsageRule)] = &[
    // OpenAI / ChatGPT
    (
        &["openai-usage", "x-openai-usage"],
        UsageRule::JsonField("completion_tokens"),
    ),
    // Anthropic / Claude
    (
        &["anthropic-token-usage", "x-anthropic-usage"],
        UsageRule::JsonField("output_tokens"),
    ),
    // OpenRouter
    (&["x-usage-tokens"], UsageRule::Integer),
    // xAI / Grok
    (&["x-token-count"], UsageRule::Integer),
];

/// 通用回退：名称中包含该子串的头按整数解析
const GENERIC_TOKEN_MARKER: &str = "token";

/// 可接受的最大 Token 数（需能无损写入 SQLite INTEGER）
const MAX_TOKENS: u64 = i64::MAX as u64;

/// 从响应头中提取用量，没有可用信息时 tokens_out 为 0
pub fn extract_usage(headers: &[ResponseHeader]) -> TokenUsage {
    let mut tokens_out = 0u64;

    for header in headers {
        let name = header.name.to_ascii_lowercase();
        if let Some(value) = match_header(&name, &header.value) {
            tracing::trace!(header = %name, tokens_out = value, "命中用量响应头");
            tokens_out = value;
        }
    }

    TokenUsage::new(tokens_out)
}

/// 单个响应头的取值，None 表示该头不贡献任何值
fn match_header(lower_name: &str, value: &str) -> Option<u64> {
    let rule = USAGE_HEADERS
        .iter()
        .find(|(names, _)| names.iter().any(|name| *name == lower_name))
        .map(|(_, rule)| *rule);

    let tokens = match rule {
        Some(UsageRule::JsonField(field)) => json_field(value, field),
        Some(UsageRule::Integer) => parse_leading_int(value),
        None if lower_name.contains(GENERIC_TOKEN_MARKER) => parse_leading_int(value),
        None => None,
    }?;

    if tokens > MAX_TOKENS {
        tracing::debug!(header = %lower_name, "用量超出范围，忽略");
        return None;
    }
    Some(tokens)
}

fn json_field(value: &str, field: &str) -> Option<u64> {
    let usage: Value = match serde_json::from_str(value) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "用量响应头不是合法 JSON，忽略");
            return None;
        }
    };

    usage
        .get(field)
        .and_then(json_tokens)
        .filter(|tokens| *tokens > 0)
}

/// 整数，或没有小数部分的浮点数（10.0）
fn json_tokens(value: &Value) -> Option<u64> {
    if let Some(tokens) = value.as_u64() {
        return Some(tokens);
    }
    let float = value.as_f64()?;
    if float.fract() != 0.0 || float < 0.0 || float > MAX_TOKENS as f64 {
        return None;
    }
    Some(float as u64)
}

/// 宽松整数解析：跳过前导空白，读取可选符号与连续数字（"42 tokens" -> 42）
///
/// 负数与无数字前缀的值返回 None。
fn parse_leading_int(value: &str) -> Option<u64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return None;
    }

    let parsed: u64 = digits.parse().ok()?;
    if negative && parsed > 0 {
        return None;
    }
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Vec<ResponseHeader> {
        pairs
            .iter()
            .map(|(name, value)| ResponseHeader::new(*name, *value))
            .collect()
    }

    #[test]
    fn test_no_headers() {
        assert_eq!(extract_usage(&[]).tokens_out, 0);
    }

    #[test]
    fn test_usage_tokens_header_case_insensitive() {
        let usage = extract_usage(&headers(&[("X-Usage-Tokens", "42")]));
        assert_eq!(usage.tokens_out, 42);
    }

    #[test]
    fn test_openai_json_header() {
        let usage = extract_usage(&headers(&[(
            "openai-usage",
            r#"{"prompt_tokens": 3, "completion_tokens": 10}"#,
        )]));
        assert_eq!(usage.tokens_out, 10);

        let usage = extract_usage(&headers(&[("X-OpenAI-Usage", r#"{"completion_tokens": 7}"#)]));
        assert_eq!(usage.tokens_out, 7);
    }

    #[test]
    fn test_anthropic_json_header() {
        let usage = extract_usage(&headers(&[(
            "anthropic-token-usage",
            r#"{"input_tokens": 9, "output_tokens": 12}"#,
        )]));
        assert_eq!(usage.tokens_out, 12);

        let usage = extract_usage(&headers(&[("x-anthropic-usage", r#"{"output_tokens": 4}"#)]));
        assert_eq!(usage.tokens_out, 4);
    }

    #[test]
    fn test_last_match_wins() {
        let usage = extract_usage(&headers(&[
            ("x-token-count", "7"),
            ("openai-usage", r#"{"completion_tokens": 10}"#),
        ]));
        assert_eq!(usage.tokens_out, 10);

        let usage = extract_usage(&headers(&[
            ("openai-usage", r#"{"completion_tokens": 10}"#),
            ("x-token-count", "7"),
        ]));
        assert_eq!(usage.tokens_out, 7);
    }

    #[test]
    fn test_malformed_header_does_not_clobber_earlier_match() {
        let usage = extract_usage(&headers(&[
            ("x-usage-tokens", "42"),
            ("openai-usage", "not json"),
            ("x-token-count", "n/a"),
            ("anthropic-token-usage", r#"{"output_tokens": "many"}"#),
        ]));
        assert_eq!(usage.tokens_out, 42);
    }

    #[test]
    fn test_zero_in_json_header_is_ignored() {
        let usage = extract_usage(&headers(&[
            ("x-usage-tokens", "5"),
            ("openai-usage", r#"{"completion_tokens": 0}"#),
        ]));
        assert_eq!(usage.tokens_out, 5);
    }

    #[test]
    fn test_generic_token_fallback() {
        let usage = extract_usage(&headers(&[("X-Output-Tokens", "99")]));
        assert_eq!(usage.tokens_out, 99);

        let usage = extract_usage(&headers(&[("x-csrf-token", "abc123")]));
        assert_eq!(usage.tokens_out, 0);
    }

    #[test]
    fn test_unrelated_headers_ignored() {
        let usage = extract_usage(&headers(&[
            ("content-type", "application/json"),
            ("content-length", "1234"),
        ]));
        assert_eq!(usage.tokens_out, 0);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  42 tokens"), Some(42));
        assert_eq!(parse_leading_int("+8"), Some(8));
        assert_eq!(parse_leading_int("-3"), None);
        assert_eq!(parse_leading_int("-0"), Some(0));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), None);
    }

    #[test]
    fn test_integral_float_in_json_header() {
        let usage = extract_usage(&headers(&[("openai-usage", r#"{"completion_tokens": 10.0}"#)]));
        assert_eq!(usage.tokens_out, 10);

        let usage = extract_usage(&headers(&[
            ("x-usage-tokens", "3"),
            ("openai-usage", r#"{"completion_tokens": 10.5}"#),
            ("anthropic-token-usage", r#"{"output_tokens": -4.0}"#),
        ]));
        assert_eq!(usage.tokens_out, 3);
    }

    #[test]
    fn test_out_of_range_values_are_skipped() {
        let usage = extract_usage(&headers(&[
            ("x-token-count", "12"),
            ("x-usage-tokens", "9223372036854775808"),
            ("openai-usage", r#"{"completion_tokens": 18446744073709551615}"#),
            ("anthropic-token-usage", r#"{"output_tokens": 1e30}"#),
        ]));
        assert_eq!(usage.tokens_out, 12);

        let usage = extract_usage(&headers(&[("x-usage-tokens", "9223372036854775807")]));
        assert_eq!(usage.tokens_out, i64::MAX as u64);
    }
}
