//! 转化事件数据结构

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// 调用方提供的事件字段，最后合并，同名键覆盖基础字段
pub type EventContext = Map<String, Value>;

/// 事件类型，同时作为转发给采集器的事件名
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    CtaClick,
    WhatsappClick,
    CalculatorUsage,
    PageView,
    ScrollDepth,
    TimeOnPage,
}

/// 扁平的转化事件记录
///
/// 构造后不再修改，只在一次调用内生成、转发并返回。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionEvent(Map<String, Value>);

impl ConversionEvent {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn event_type(&self) -> Option<&str> {
        self.get_str("event_type")
    }

    pub fn session_id(&self) -> Option<&str> {
        self.get_str("session_id")
    }

    pub fn user_id(&self) -> Option<&str> {
        self.get_str("user_id")
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get_str("timestamp")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for ConversionEvent {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// CTA 点击
#[derive(Debug, Clone, Copy, Default)]
pub struct CtaClick<'a> {
    pub cta_type: &'a str,
    pub cta_location: &'a str,
    pub target_url: &'a str,
    pub program: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

/// WhatsApp 按钮点击
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatsAppClick<'a> {
    pub phone_number: &'a str,
    /// 预填消息，只记录前若干字符
    pub message: &'a str,
    /// 按钮所在位置
    pub context: &'a str,
    pub program: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

/// 奖学金计算器
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorUsage<'a> {
    pub program: &'a str,
    pub gpa: f64,
    pub country: &'a str,
    pub base_fee: f64,
    pub scholarship_percentage: f64,
    pub final_amount: f64,
    /// 缺省为 `calculate`
    pub action: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PageView<'a> {
    pub content_type: Option<&'a str>,
    pub program: Option<&'a str>,
    pub category: Option<&'a str>,
}

/// `Option<&str>` 转为 JSON，缺失时为 null
pub(crate) fn opt_str(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}
