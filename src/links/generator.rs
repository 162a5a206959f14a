//! UTM 链接生成
//!
//! 所有对外 "Apply Now" / 落地页链接都从这里生成，保证 campaign 标签在每个
//! 调用点结构一致，便于下游按 campaign 聚合。

use url::form_urlencoded;

use super::parser::{self, UtmParameters};
use crate::config::UtmLinkConfig;

/// 链接生成请求
///
/// `page` 只用于调用方标识来源页面，不会编码进 URL。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkRequest<'a> {
    pub country: Option<&'a str>,
    pub page: &'a str,
    pub content_type: &'a str,
    pub program: Option<&'a str>,
    /// 缺省为 `apply-now`
    pub action: Option<&'a str>,
}

impl<'a> LinkRequest<'a> {
    pub fn new(page: &'a str, content_type: &'a str) -> Self {
        Self {
            page,
            content_type,
            ..Default::default()
        }
    }

    pub fn country(mut self, country: &'a str) -> Self {
        self.country = Some(country);
        self
    }

    pub fn program(mut self, program: &'a str) -> Self {
        self.program = Some(program);
        self
    }

    pub fn action(mut self, action: &'a str) -> Self {
        self.action = Some(action);
        self
    }
}

/// 国家分区：只有孟加拉国走独立落地页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Bangladesh,
    International,
}

impl Region {
    /// 大小写不敏感地匹配 "bangladesh"，其余（包括缺省）都是 International
    pub fn from_country(country: Option<&str>) -> Self {
        match country {
            Some(c) if c.to_lowercase() == "bangladesh" => Region::Bangladesh,
            _ => Region::International,
        }
    }
}

/// UTM 链接生成器
#[derive(Debug, Clone, Default)]
pub struct LinkGenerator {
    config: UtmLinkConfig,
}

impl LinkGenerator {
    pub fn new(config: UtmLinkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UtmLinkConfig {
        &self.config
    }

    pub fn base_url(&self, country: Option<&str>) -> &str {
        match Region::from_country(country) {
            Region::Bangladesh => &self.config.bangladesh_base_url,
            Region::International => &self.config.international_base_url,
        }
    }

    pub fn campaign(&self, country: Option<&str>) -> String {
        let suffix = match Region::from_country(country) {
            Region::Bangladesh => &self.config.bangladesh_suffix,
            Region::International => &self.config.international_suffix,
        };
        format!(
            "{}{}_{}",
            self.config.campaign_prefix, suffix, self.config.campaign_year
        )
    }

    /// `content_type`、`program`、`action` 以 `_` 顺序拼接，空段被跳过
    pub fn content(&self, request: &LinkRequest<'_>) -> String {
        let action = request
            .action
            .unwrap_or(self.config.default_action.as_str());

        [Some(request.content_type), request.program, Some(action)]
            .into_iter()
            .flatten()
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }

    /// 生成带四个 UTM 参数的完整链接
    pub fn generate(&self, request: &LinkRequest<'_>) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("utm_source", &self.config.utm_source)
            .append_pair("utm_medium", &self.config.utm_medium)
            .append_pair("utm_campaign", &self.campaign(request.country))
            .append_pair("utm_content", &self.content(request))
            .finish();

        format!("{}?{}", self.base_url(request.country), query)
    }

    /// 生成链接时实际使用的参数（`term` 始终为空）
    pub fn parameters(&self, request: &LinkRequest<'_>) -> UtmParameters {
        UtmParameters {
            source: Some(self.config.utm_source.clone()),
            medium: Some(self.config.utm_medium.clone()),
            campaign: Some(self.campaign(request.country)),
            content: Some(self.content(request)),
            term: None,
        }
    }

    pub fn is_valid_link(&self, url: &str) -> bool {
        parser::is_valid_utm_link_for(url, &self.config.expected_domain)
    }
}

/// 使用默认配置生成链接
pub fn generate_utm_link(request: &LinkRequest<'_>) -> String {
    LinkGenerator::default().generate(request)
}

/// 使用默认配置选择落地页
pub fn get_base_url(country: Option<&str>) -> String {
    LinkGenerator::default().base_url(country).to_string()
}
