//! UTM 参数解析与链接校验

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// 标准 UTM 参数，缺失项为 `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParameters {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub content: Option<String>,
    pub term: Option<String>,
}

impl UtmParameters {
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.medium.is_none()
            && self.campaign.is_none()
            && self.content.is_none()
            && self.term.is_none()
    }

    /// 以 `{prefix}source` 等键写入事件字段，缺失项写入 null
    pub fn merge_into(&self, fields: &mut Map<String, Value>, prefix: &str) {
        let entries = [
            ("source", &self.source),
            ("medium", &self.medium),
            ("campaign", &self.campaign),
            ("content", &self.content),
            ("term", &self.term),
        ];
        for (key, value) in entries {
            let value = value.clone().map_or(Value::Null, Value::String);
            fields.insert(format!("{}{}", prefix, key), value);
        }
    }
}

/// 解析 URL 中的 UTM 参数
///
/// URL 无法解析时返回 `None`；同名参数取第一个。
pub fn parse_utm_parameters(url: &str) -> Option<UtmParameters> {
    let parsed = Url::parse(url).ok()?;
    let mut params = UtmParameters::default();

    for (key, value) in parsed.query_pairs() {
        let slot = match key.as_ref() {
            "utm_source" => &mut params.source,
            "utm_medium" => &mut params.medium,
            "utm_campaign" => &mut params.campaign,
            "utm_content" => &mut params.content,
            "utm_term" => &mut params.term,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    Some(params)
}

/// 使用默认域名校验
pub fn is_valid_utm_link(url: &str) -> bool {
    is_valid_utm_link_for(url, &crate::config::UtmLinkConfig::default().expected_domain)
}

/// host 属于 `domain`（相同或其子域），且四个必需参数都存在（空值也算存在）
pub fn is_valid_utm_link_for(url: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let host_matches = parsed.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        let domain = domain.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    });
    if !host_matches {
        return false;
    }

    const REQUIRED: [&str; 4] = ["utm_source", "utm_medium", "utm_campaign", "utm_content"];
    REQUIRED
        .iter()
        .all(|required| parsed.query_pairs().any(|(key, _)| key == *required))
}
