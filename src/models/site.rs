use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 已知的 LLM 网页服务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SiteId {
    #[serde(rename = "claude.ai")]
    Claude,
    #[serde(rename = "chatgpt.com")]
    ChatGpt,
    #[serde(rename = "openrouter.ai")]
    OpenRouter,
    #[serde(rename = "grok.com")]
    Grok,
    #[serde(rename = "poe.com")]
    Poe,
    #[serde(rename = "unknown")]
    Unknown,
}

impl SiteId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteId::Claude => "claude.ai",
            SiteId::ChatGpt => "chatgpt.com",
            SiteId::OpenRouter => "openrouter.ai",
            SiteId::Grok => "grok.com",
            SiteId::Poe => "poe.com",
            SiteId::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SiteId::Unknown)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SiteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude.ai" => Ok(SiteId::Claude),
            "chatgpt.com" => Ok(SiteId::ChatGpt),
            "openrouter.ai" => Ok(SiteId::OpenRouter),
            "grok.com" => Ok(SiteId::Grok),
            "poe.com" => Ok(SiteId::Poe),
            "unknown" => Ok(SiteId::Unknown),
            other => Err(format!("未知站点: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_str_roundtrip() {
        for site in [
            SiteId::Claude,
            SiteId::ChatGpt,
            SiteId::OpenRouter,
            SiteId::Grok,
            SiteId::Poe,
            SiteId::Unknown,
        ] {
            assert_eq!(site.as_str().parse::<SiteId>().unwrap(), site);
        }
        assert!("example.com".parse::<SiteId>().is_err());
    }

    #[test]
    fn test_site_serializes_as_domain() {
        let json = serde_json::to_string(&SiteId::ChatGpt).unwrap();
        assert_eq!(json, r#""chatgpt.com""#);
        let site: SiteId = serde_json::from_str(r#""poe.com""#).unwrap();
        assert_eq!(site, SiteId::Poe);
    }
}
