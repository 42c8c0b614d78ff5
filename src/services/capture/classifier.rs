//! 站点识别
//!
//! 按域名子串宽松匹配，兼容地区/CDN 子域名，不做严格的主机名解析。

use crate::models::SiteId;

/// 按优先级排列的 (域名子串, 站点) 表
const SITE_PATTERNS: &[(&str, SiteId)] = &[
    ("anthropic.com", SiteId::Claude),
    ("claude.ai", SiteId::Claude),
    ("openai.com", SiteId::ChatGpt),
    ("chatgpt.com", SiteId::ChatGpt),
    ("openrouter.ai", SiteId::OpenRouter),
    ("x.ai", SiteId::Grok),
    ("grok.com", SiteId::Grok),
    ("poe.com", SiteId::Poe),
];

/// 识别 URL 所属站点，未命中返回 `SiteId::Unknown`
pub fn classify(url: &str) -> SiteId {
    SITE_PATTERNS
        .iter()
        .find(|(pattern, _)| url.contains(pattern))
        .map(|(_, site)| *site)
        .unwrap_or(SiteId::Unknown)
}

/// 受监控的域名列表
pub fn monitored_domains() -> impl Iterator<Item = &'static str> {
    SITE_PATTERNS.iter().map(|(pattern, _)| *pattern)
}
