use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::errors::{Result, TrackerError};

/// 默认配置文件名（不含扩展名，config crate 会尝试 .toml 等格式）
pub const DEFAULT_CONFIG_NAME: &str = "utmlinker";

/// 环境变量前缀，示例：UTM__COLLECTOR__ENDPOINT
pub const ENV_PREFIX: &str = "UTM";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - links: 营销链接的固定端点与 campaign 命名规则
/// - tracking: 事件记录与自动追踪参数
/// - collector: 事件转发的目标
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StaticConfig {
    #[serde(default)]
    pub links: UtmLinkConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置，失败时回退到默认值
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    pub fn load(path: Option<&str>) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("[ERROR] {}", e);
                Self::default()
            }
        }
    }

    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 指定 `path` 时文件必须存在；否则尝试当前目录下的 `utmlinker.toml`（可选）。
    pub fn try_load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let file = match path {
            Some(p) => File::from(Path::new(p)).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config = settings.try_deserialize::<StaticConfig>()?;
        if let Some(p) = path {
            eprintln!("[INFO] Configuration loaded from: {}", p);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 营销链接配置
///
/// 默认值即线上使用的固定端点与命名规则，修改这些值会改变所有生成链接的
/// campaign 标签，下游聚合依赖它们保持一致。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UtmLinkConfig {
    /// 孟加拉国落地页
    pub bangladesh_base_url: String,
    /// 其他国家（及未指定国家）使用的落地页
    pub international_base_url: String,
    pub utm_source: String,
    pub utm_medium: String,
    /// campaign = `{prefix}{BD|Intl}_{year}`
    pub campaign_prefix: String,
    pub bangladesh_suffix: String,
    pub international_suffix: String,
    pub campaign_year: u16,
    /// 校验链接时要求的域名
    pub expected_domain: String,
    pub default_action: String,
}

impl Default for UtmLinkConfig {
    fn default() -> Self {
        Self {
            bangladesh_base_url: "https://global.sharda.ac.in/bangladesh/".to_string(),
            international_base_url: "https://global.sharda.ac.in/".to_string(),
            utm_source: "studyatsharda_youtube".to_string(),
            utm_medium: "NextGenLearning".to_string(),
            campaign_prefix: "SU_Admissions".to_string(),
            bangladesh_suffix: "BD".to_string(),
            international_suffix: "Intl".to_string(),
            campaign_year: 2026,
            expected_domain: "global.sharda.ac.in".to_string(),
            default_action: "apply-now".to_string(),
        }
    }
}

/// 事件记录配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackingConfig {
    /// WhatsApp 消息预览的最大字符数（硬截断）
    pub message_preview_length: usize,
    /// 滚动深度阈值（百分比）
    pub scroll_thresholds: Vec<u8>,
    /// 页面停留时长的记录间隔（秒）
    pub time_interval_seconds: u64,
    /// 是否把每条事件镜像到 debug 日志
    pub debug_mirror: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            message_preview_length: 100,
            scroll_thresholds: vec![25, 50, 75, 100],
            time_interval_seconds: 30,
            debug_mirror: false,
        }
    }
}

/// 事件转发目标
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CollectorKind {
    /// 每条事件一行 JSON 输出到 stdout
    #[default]
    Stdout,
    /// POST 到外部采集端点
    Http,
    /// 丢弃
    None,
}

/// 采集器配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CollectorConfig {
    pub kind: CollectorKind,
    /// `kind = "http"` 时使用
    pub endpoint: Option<String>,
    /// 通道容量，满时新事件被丢弃
    pub channel_capacity: usize,
    /// 单次交给 sink 的最大事件数
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            kind: CollectorKind::Stdout,
            endpoint: None,
            channel_capacity: 1024,
            batch_size: 32,
            timeout_secs: 2,
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.kind == CollectorKind::Http && self.endpoint.as_deref().is_none_or(str::is_empty) {
            return Err(TrackerError::config(
                "collector.endpoint is required when collector.kind = \"http\"",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(TrackerError::config("collector.channel_capacity must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(TrackerError::config("collector.batch_size must be > 0"));
        }
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_kind_from_str() {
        assert_eq!("http".parse::<CollectorKind>().unwrap(), CollectorKind::Http);
        assert_eq!("STDOUT".parse::<CollectorKind>().unwrap(), CollectorKind::Stdout);
        assert!("kafka".parse::<CollectorKind>().is_err());
    }

    #[test]
    fn test_http_collector_requires_endpoint() {
        let mut config = CollectorConfig {
            kind: CollectorKind::Http,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.endpoint = Some("https://collect.example.com/events".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_config_roundtrip() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed, StaticConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [tracking]
            time_interval_seconds = 10
            "#,
        )
        .unwrap();
        assert_eq!(parsed.tracking.time_interval_seconds, 10);
        assert_eq!(parsed.tracking.message_preview_length, 100);
        assert_eq!(parsed.links, UtmLinkConfig::default());
    }
}
