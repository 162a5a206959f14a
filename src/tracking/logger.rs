//! 转化事件记录器
//!
//! 所有交互事件都归一成同一张扁平记录：
//! 1. 页面上下文（无页面时为空字符串）
//! 2. 当前页面 URL 中的 `utm_*`
//! 3. 目标链接中的 `target_utm_*`（两组互不影响）
//! 4. `session_id` / `user_id`
//! 5. 调用方字段（最后合并，同名覆盖）
//!
//! 记录随后单向转发给采集器，可选镜像到 debug 日志，并原样返回。

use std::sync::Arc;

use chrono::SecondsFormat;
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use super::cleanup::TrackingCleanup;
use super::env::TrackingEnvironment;
use super::event::{
    CalculatorUsage, ConversionEvent, CtaClick, EventContext, EventType, PageView, WhatsAppClick,
    opt_str,
};
use super::session;
use crate::config::TrackingConfig;
use crate::links::parse_utm_parameters;

const DEFAULT_CALCULATOR_ACTION: &str = "calculate";

#[derive(Clone)]
pub struct EventLogger {
    env: Arc<dyn TrackingEnvironment>,
    config: TrackingConfig,
}

impl EventLogger {
    pub fn new(env: Arc<dyn TrackingEnvironment>) -> Self {
        Self::with_config(env, TrackingConfig::default())
    }

    pub fn with_config(env: Arc<dyn TrackingEnvironment>, config: TrackingConfig) -> Self {
        Self { env, config }
    }

    pub fn environment(&self) -> &Arc<dyn TrackingEnvironment> {
        &self.env
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// 构造、转发并返回一条转化事件
    pub fn log_conversion_event(
        &self,
        event_type: EventType,
        context: EventContext,
        target_url: Option<&str>,
    ) -> ConversionEvent {
        let env = self.env.as_ref();
        let location = env.location().unwrap_or_default();
        let document = env.document().unwrap_or_default();

        let mut fields = Map::new();
        fields.insert("event_type".into(), Value::from(event_type.as_ref()));
        fields.insert(
            "timestamp".into(),
            Value::from(env.now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        fields.insert(
            "session_id".into(),
            session::resolve_session_id(env).map_or(Value::Null, Value::String),
        );
        fields.insert(
            "user_id".into(),
            session::lookup_user_id(env).map_or(Value::Null, Value::String),
        );

        if let Some(utm) = parse_utm_parameters(&location.href) {
            utm.merge_into(&mut fields, "utm_");
        }
        if let Some(target_utm) = target_url.and_then(parse_utm_parameters) {
            target_utm.merge_into(&mut fields, "target_utm_");
        }

        fields.insert("page_url".into(), Value::String(location.href));
        fields.insert("page_path".into(), Value::String(location.pathname));
        fields.insert("page_title".into(), Value::String(document.title));
        fields.insert("referrer".into(), Value::String(document.referrer));

        fields.extend(context);

        let event = ConversionEvent::from(fields);

        match env.collector() {
            Some(collector) => collector.send(event_type.as_ref(), &event),
            None => trace!("EventLogger: no collector, {} not forwarded", event_type),
        }

        if self.config.debug_mirror || env.is_development() {
            debug!(event_type = %event_type, payload = %event.to_json(), "Conversion event");
        }

        event
    }

    pub fn log_cta_click(&self, click: CtaClick<'_>) -> ConversionEvent {
        let context = into_context(json!({
            "cta_type": click.cta_type,
            "cta_location": click.cta_location,
            "target_url": click.target_url,
            "program": opt_str(click.program),
            "content_type": opt_str(click.content_type),
        }));
        self.log_conversion_event(EventType::CtaClick, context, Some(click.target_url))
    }

    /// 消息只记录前 `message_preview_length` 个字符
    pub fn log_whatsapp_click(&self, click: WhatsAppClick<'_>) -> ConversionEvent {
        let preview: String = click
            .message
            .chars()
            .take(self.config.message_preview_length)
            .collect();

        let context = into_context(json!({
            "cta_type": "whatsapp",
            "cta_location": click.context,
            "phone_number": click.phone_number,
            "message_preview": preview,
            "program": opt_str(click.program),
            "content_type": opt_str(click.content_type),
        }));
        self.log_conversion_event(EventType::WhatsappClick, context, None)
    }

    pub fn log_calculator_usage(&self, usage: CalculatorUsage<'_>) -> ConversionEvent {
        let context = into_context(json!({
            "calculator_action": usage.action.unwrap_or(DEFAULT_CALCULATOR_ACTION),
            "program": usage.program,
            "gpa": usage.gpa,
            "country": usage.country,
            "base_fee": usage.base_fee,
            "scholarship_percentage": usage.scholarship_percentage,
            "final_amount": usage.final_amount,
        }));
        self.log_conversion_event(EventType::CalculatorUsage, context, None)
    }

    pub fn log_page_view(&self, view: PageView<'_>) -> ConversionEvent {
        let context = into_context(json!({
            "content_type": opt_str(view.content_type),
            "program": opt_str(view.program),
            "category": opt_str(view.category),
        }));
        self.log_conversion_event(EventType::PageView, context, None)
    }

    pub fn log_scroll_depth(&self, depth: u8, content_type: Option<&str>) -> ConversionEvent {
        let context = into_context(json!({
            "scroll_depth": depth,
            "content_type": opt_str(content_type),
        }));
        self.log_conversion_event(EventType::ScrollDepth, context, None)
    }

    pub fn log_time_on_page(&self, seconds: u64, content_type: Option<&str>) -> ConversionEvent {
        let context = into_context(json!({
            "time_seconds": seconds,
            "content_type": opt_str(content_type),
        }));
        self.log_conversion_event(EventType::TimeOnPage, context, None)
    }

    pub fn init_scroll_depth_tracking(&self, content_type: Option<&str>) -> TrackingCleanup {
        super::scroll::init_scroll_depth_tracking(self, content_type)
    }

    pub fn init_time_on_page_tracking(
        &self,
        content_type: Option<&str>,
        interval_seconds: Option<u64>,
    ) -> TrackingCleanup {
        super::time::init_time_on_page_tracking(self, content_type, interval_seconds)
    }

    pub fn init_page_tracking(&self, view: PageView<'_>) -> TrackingCleanup {
        super::page::init_page_tracking(self, view)
    }
}

fn into_context(value: Value) -> EventContext {
    match value {
        Value::Object(map) => map,
        _ => EventContext::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::collector::MemoryCollector;
    use crate::tracking::env::{HeadlessEnvironment, MemoryStore, PageEnvironment};

    fn page_logger(href: &str) -> (EventLogger, Arc<MemoryCollector>) {
        let collector = Arc::new(MemoryCollector::new());
        let env = PageEnvironment::new()
            .with_location(href)
            .with_document("Sharda University", "https://www.google.com/")
            .with_session_store(Arc::new(MemoryStore::new()))
            .with_collector(collector.clone());
        (EventLogger::new(Arc::new(env)), collector)
    }

    #[test]
    fn test_headless_degrades_to_empty_strings() {
        let logger = EventLogger::new(Arc::new(HeadlessEnvironment));
        let event = logger.log_page_view(PageView::default());

        assert_eq!(event.get_str("page_url"), Some(""));
        assert_eq!(event.get_str("page_path"), Some(""));
        assert_eq!(event.get_str("page_title"), Some(""));
        assert_eq!(event.get_str("referrer"), Some(""));
        assert!(event.get("session_id").unwrap().is_null());
        assert!(event.get("user_id").unwrap().is_null());
        assert!(!event.contains_key("utm_source"));
    }

    #[test]
    fn test_current_and_target_utm_are_independent() {
        let (logger, _) = page_logger("https://site.example/mba?utm_source=fb&utm_term=x");
        let event = logger.log_cta_click(CtaClick {
            cta_type: "apply",
            cta_location: "hero",
            target_url: "https://global.sharda.ac.in/?utm_source=yt&utm_content=hero",
            ..Default::default()
        });

        assert_eq!(event.get_str("utm_source"), Some("fb"));
        assert_eq!(event.get_str("utm_term"), Some("x"));
        assert!(event.get("utm_content").unwrap().is_null());
        assert_eq!(event.get_str("target_utm_source"), Some("yt"));
        assert_eq!(event.get_str("target_utm_content"), Some("hero"));
        assert_eq!(event.get_str("page_path"), Some("/mba"));
    }

    #[test]
    fn test_context_overrides_base_fields() {
        let (logger, _) = page_logger("https://site.example/");
        let mut context = EventContext::new();
        context.insert("page_title".into(), Value::from("Overridden"));
        context.insert("custom".into(), Value::from(1));

        let event = logger.log_conversion_event(EventType::PageView, context, None);
        assert_eq!(event.get_str("page_title"), Some("Overridden"));
        assert_eq!(event.get("custom"), Some(&Value::from(1)));
    }

    #[test]
    fn test_forwarded_with_event_name() {
        let (logger, collector) = page_logger("https://site.example/");
        let event = logger.log_scroll_depth(50, Some("blog"));

        let events = collector.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "scroll_depth");
        assert_eq!(events[0].params, event);
    }

    #[test]
    fn test_calculator_default_action() {
        let (logger, _) = page_logger("https://site.example/");
        let event = logger.log_calculator_usage(CalculatorUsage {
            program: "mba",
            gpa: 3.6,
            country: "Nepal",
            base_fee: 4000.0,
            scholarship_percentage: 25.0,
            final_amount: 3000.0,
            action: None,
        });

        assert_eq!(event.get_str("calculator_action"), Some("calculate"));
        assert_eq!(event.get("final_amount"), Some(&json!(3000.0)));
    }

    #[test]
    fn test_timestamp_is_iso8601() {
        let (logger, _) = page_logger("https://site.example/");
        let event = logger.log_page_view(PageView::default());
        let timestamp = event.timestamp().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
    }
}
