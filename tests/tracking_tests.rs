//! 事件追踪测试
//!
//! 使用 SimulatedPage 驱动滚动、定时器和卸载事件。

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use utmlinker::config::TrackingConfig;
use utmlinker::links::{LinkRequest, generate_utm_link};
use utmlinker::tracking::session::{SESSION_ID_KEY, USER_ID_KEY};
use utmlinker::tracking::{
    CalculatorUsage, CtaClick, EventLogger, EventType, HeadlessEnvironment, KeyValueStore,
    MemoryCollector, MemoryStore, PageEnvironment, PageEvent, PageView, SimulatedPage,
    WhatsAppClick,
};

const PAGE_URL: &str = "https://global.sharda.ac.in/programs/btech?utm_source=yt&utm_medium=video&utm_campaign=spring&utm_content=hero";

struct Fixture {
    page: Arc<SimulatedPage>,
    collector: Arc<MemoryCollector>,
    logger: EventLogger,
}

fn fixture() -> Fixture {
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let page = Arc::new(SimulatedPage::starting_at(100.0, 1000.0, start));
    let collector = Arc::new(MemoryCollector::new());
    let env = PageEnvironment::new()
        .with_location(PAGE_URL)
        .with_document("B.Tech Programs", "https://www.youtube.com/")
        .with_session_store(Arc::new(MemoryStore::new()))
        .with_user_store(Arc::new(MemoryStore::new()))
        .with_collector(collector.clone())
        .with_host(page.clone())
        .with_clock(page.clone());
    let logger = EventLogger::new(Arc::new(env));
    Fixture {
        page,
        collector,
        logger,
    }
}

fn values(collector: &MemoryCollector, name: &str, key: &str) -> Vec<Value> {
    collector
        .events()
        .into_iter()
        .filter(|e| e.name == name)
        .filter_map(|e| e.params.get(key).cloned())
        .collect()
}

// =============================================================================
// 事件记录
// =============================================================================

#[test]
fn test_headless_event_has_empty_context() {
    let logger = EventLogger::new(Arc::new(HeadlessEnvironment));
    let event = logger.log_page_view(PageView::default());

    assert_eq!(event.event_type(), Some("page_view"));
    assert_eq!(event.get("session_id"), Some(&Value::Null));
    assert_eq!(event.get("user_id"), Some(&Value::Null));
    assert_eq!(event.get_str("page_url"), Some(""));
    assert_eq!(event.get_str("page_path"), Some(""));
    assert_eq!(event.get_str("page_title"), Some(""));
    assert_eq!(event.get_str("referrer"), Some(""));
    assert!(!event.contains_key("utm_source"));
}

#[test]
fn test_page_context_and_current_utm() {
    let f = fixture();
    let event = f.logger.log_page_view(PageView {
        content_type: Some("program"),
        program: Some("btech-cse"),
        category: None,
    });

    assert_eq!(event.get_str("page_url"), Some(PAGE_URL));
    assert_eq!(event.get_str("page_path"), Some("/programs/btech"));
    assert_eq!(event.get_str("page_title"), Some("B.Tech Programs"));
    assert_eq!(event.get_str("referrer"), Some("https://www.youtube.com/"));
    assert_eq!(event.get_str("utm_source"), Some("yt"));
    assert_eq!(event.get_str("utm_content"), Some("hero"));
    assert_eq!(event.get("category"), Some(&Value::Null));
    assert_eq!(event.timestamp(), Some("2026-03-01T12:00:00.000Z"));
}

#[test]
fn test_session_id_stable_within_session() {
    let f = fixture();
    let first = f.logger.log_page_view(PageView::default());
    let second = f.logger.log_scroll_depth(25, None);
    let third = f.logger.log_time_on_page(30, None);

    let id = first.session_id().unwrap().to_string();
    assert!(id.starts_with("session_"));
    assert_eq!(second.session_id(), Some(id.as_str()));
    assert_eq!(third.session_id(), Some(id.as_str()));
}

#[test]
fn test_existing_ids_are_reused() {
    let session = Arc::new(MemoryStore::new().with_entry(SESSION_ID_KEY, "session_1_abc"));
    let users = Arc::new(MemoryStore::new().with_entry(USER_ID_KEY, "u-42"));
    let env = PageEnvironment::new()
        .with_session_store(session.clone())
        .with_user_store(users.clone());
    let logger = EventLogger::new(Arc::new(env));

    let event = logger.log_page_view(PageView::default());
    assert_eq!(event.session_id(), Some("session_1_abc"));
    assert_eq!(event.user_id(), Some("u-42"));
    assert_eq!(session.get(SESSION_ID_KEY).as_deref(), Some("session_1_abc"));
    assert_eq!(users.len(), 1);
}

#[test]
fn test_cta_click_keeps_utm_sets_apart() {
    let f = fixture();
    let target = generate_utm_link(
        &LinkRequest::new("apply", "landing")
            .country("Bangladesh")
            .action("apply-now"),
    );

    let event = f.logger.log_cta_click(CtaClick {
        cta_type: "apply",
        cta_location: "hero",
        target_url: &target,
        program: Some("btech-cse"),
        content_type: None,
    });

    assert_eq!(event.get_str("utm_source"), Some("yt"));
    assert_eq!(event.get_str("utm_campaign"), Some("spring"));
    assert_eq!(
        event.get_str("target_utm_source"),
        Some("studyatsharda_youtube")
    );
    assert_eq!(
        event.get_str("target_utm_campaign"),
        Some("SU_AdmissionsBD_2026")
    );
    assert_eq!(event.get_str("target_url"), Some(target.as_str()));
    assert_eq!(event.get("content_type"), Some(&Value::Null));
    assert_eq!(f.collector.names(), vec!["cta_click"]);
}

#[test]
fn test_whatsapp_message_truncated() {
    let f = fixture();
    let message = "x".repeat(150);
    let event = f.logger.log_whatsapp_click(WhatsAppClick {
        phone_number: "+8801700000000",
        message: &message,
        context: "footer",
        program: None,
        content_type: Some("landing"),
    });

    let preview = event.get_str("message_preview").unwrap();
    assert_eq!(preview.chars().count(), 100);
    assert_eq!(event.get_str("cta_type"), Some("whatsapp"));
    assert_eq!(event.get_str("cta_location"), Some("footer"));
    assert!(!event.contains_key("message"));
}

#[test]
fn test_whatsapp_short_message_kept_whole() {
    let f = fixture();
    let event = f.logger.log_whatsapp_click(WhatsAppClick {
        phone_number: "+8801700000000",
        message: "আমি ভর্তি হতে চাই",
        context: "hero",
        ..Default::default()
    });
    assert_eq!(event.get_str("message_preview"), Some("আমি ভর্তি হতে চাই"));
}

#[test]
fn test_calculator_usage_fields() {
    let f = fixture();
    let event = f.logger.log_calculator_usage(CalculatorUsage {
        program: "mba",
        gpa: 3.6,
        country: "Bangladesh",
        base_fee: 4000.0,
        scholarship_percentage: 50.0,
        final_amount: 2000.0,
        action: None,
    });

    assert_eq!(event.event_type(), Some("calculator_usage"));
    assert_eq!(event.get_str("calculator_action"), Some("calculate"));
    assert_eq!(event.get("gpa"), Some(&json!(3.6)));
    assert_eq!(event.get("final_amount"), Some(&json!(2000.0)));
}

#[test]
fn test_caller_context_overrides_defaults() {
    let f = fixture();
    let mut context = serde_json::Map::new();
    context.insert("page_title".into(), json!("Overridden"));
    context.insert("utm_source".into(), json!("manual"));

    let event = f
        .logger
        .log_conversion_event(EventType::CtaClick, context, None);
    assert_eq!(event.get_str("page_title"), Some("Overridden"));
    assert_eq!(event.get_str("utm_source"), Some("manual"));
    assert_eq!(event.get_str("utm_medium"), Some("video"));
}

#[test]
fn test_custom_preview_length() {
    let env = PageEnvironment::new();
    let config = TrackingConfig {
        message_preview_length: 5,
        ..Default::default()
    };
    let logger = EventLogger::with_config(Arc::new(env), config);
    let event = logger.log_whatsapp_click(WhatsAppClick {
        phone_number: "1",
        message: "hello world",
        context: "hero",
        ..Default::default()
    });
    assert_eq!(event.get_str("message_preview"), Some("hello"));
}

// =============================================================================
// 滚动深度
// =============================================================================

#[test]
fn test_scroll_thresholds_fire_once() {
    let f = fixture();
    let cleanup = f.logger.init_scroll_depth_tracking(Some("blog"));

    for percent in [30.0, 20.0, 60.0, 10.0, 80.0, 30.0, 100.0, 50.0, 100.0] {
        f.page.scroll_to_percent(percent);
        f.page.run_frames();
    }

    let depths = values(&f.collector, "scroll_depth", "scroll_depth");
    assert_eq!(depths, vec![json!(25), json!(50), json!(75), json!(100)]);
    let content_types = values(&f.collector, "scroll_depth", "content_type");
    assert!(content_types.iter().all(|v| v == "blog"));

    cleanup.cleanup();
}

#[test]
fn test_scroll_jump_fires_all_passed_thresholds() {
    let f = fixture();
    let cleanup = f.logger.init_scroll_depth_tracking(None);

    f.page.scroll_to_percent(100.0);
    f.page.run_frames();

    let depths = values(&f.collector, "scroll_depth", "scroll_depth");
    assert_eq!(depths, vec![json!(25), json!(50), json!(75), json!(100)]);
    cleanup.cleanup();
}

#[test]
fn test_scroll_is_throttled_to_one_frame() {
    let f = fixture();
    let cleanup = f.logger.init_scroll_depth_tracking(None);

    f.page.scroll_to_percent(20.0);
    f.page.scroll_to_percent(40.0);
    f.page.scroll_to_percent(60.0);
    assert_eq!(f.page.pending_frames(), 1);

    // 帧里读取的是最新位置
    assert_eq!(f.page.run_frames(), 1);
    let depths = values(&f.collector, "scroll_depth", "scroll_depth");
    assert_eq!(depths, vec![json!(25), json!(50)]);

    f.page.scroll_to_percent(80.0);
    assert_eq!(f.page.pending_frames(), 1);
    f.page.run_frames();
    assert_eq!(values(&f.collector, "scroll_depth", "scroll_depth").len(), 3);

    cleanup.cleanup();
}

#[test]
fn test_scroll_cleanup_removes_listener() {
    let f = fixture();
    let cleanup = f.logger.init_scroll_depth_tracking(None);
    assert_eq!(f.page.listener_count(PageEvent::Scroll), 1);

    cleanup.cleanup();
    assert_eq!(f.page.listener_count(PageEvent::Scroll), 0);

    f.page.scroll_to_percent(100.0);
    assert_eq!(f.page.pending_frames(), 0);
    assert!(f.collector.is_empty());
}

#[test]
fn test_empty_document_never_fires() {
    let page = Arc::new(SimulatedPage::new(0.0, 0.0));
    let collector = Arc::new(MemoryCollector::new());
    let env = PageEnvironment::new()
        .with_collector(collector.clone())
        .with_host(page.clone());
    let logger = EventLogger::new(Arc::new(env));
    let cleanup = logger.init_scroll_depth_tracking(None);

    page.scroll_to(0.0);
    page.run_frames();
    assert!(collector.is_empty());
    cleanup.cleanup();
}

// =============================================================================
// 停留时长
// =============================================================================

#[test]
fn test_time_on_page_logs_each_interval() {
    let f = fixture();
    let cleanup = f.logger.init_time_on_page_tracking(Some("program"), None);

    f.page.advance(Duration::from_secs(29));
    assert!(f.collector.is_empty());

    f.page.advance(Duration::from_secs(1));
    f.page.advance(Duration::from_secs(60));

    let seconds = values(&f.collector, "time_on_page", "time_seconds");
    assert_eq!(seconds, vec![json!(30), json!(60), json!(90)]);
    cleanup.cleanup();
}

#[test]
fn test_time_on_page_custom_interval() {
    let f = fixture();
    let cleanup = f.logger.init_time_on_page_tracking(None, Some(10));

    f.page.advance(Duration::from_secs(35));
    let seconds = values(&f.collector, "time_on_page", "time_seconds");
    assert_eq!(seconds, vec![json!(10), json!(20), json!(30)]);
    cleanup.cleanup();
}

#[test]
fn test_time_on_page_logs_on_unload() {
    let f = fixture();
    let cleanup = f.logger.init_time_on_page_tracking(None, None);

    f.page.advance(Duration::from_secs(12));
    f.page.unload();

    let seconds = values(&f.collector, "time_on_page", "time_seconds");
    assert_eq!(seconds, vec![json!(12)]);
    cleanup.cleanup();
}

#[test]
fn test_time_cleanup_logs_final_and_detaches() {
    let f = fixture();
    let cleanup = f.logger.init_time_on_page_tracking(None, None);
    assert_eq!(f.page.active_timers(), 1);
    assert_eq!(f.page.listener_count(PageEvent::BeforeUnload), 1);

    f.page.advance(Duration::from_secs(45));
    cleanup.cleanup();

    let seconds = values(&f.collector, "time_on_page", "time_seconds");
    assert_eq!(seconds, vec![json!(30), json!(45)]);
    assert_eq!(f.page.active_timers(), 0);
    assert_eq!(f.page.listener_count(PageEvent::BeforeUnload), 0);

    f.page.advance(Duration::from_secs(120));
    f.page.unload();
    assert_eq!(values(&f.collector, "time_on_page", "time_seconds").len(), 2);
}

#[test]
fn test_no_host_tracking_is_noop() {
    let collector = Arc::new(MemoryCollector::new());
    let env = PageEnvironment::new().with_collector(collector.clone());
    let logger = EventLogger::new(Arc::new(env));

    let scroll = logger.init_scroll_depth_tracking(None);
    let time = logger.init_time_on_page_tracking(None, None);
    assert!(scroll.is_noop());
    assert!(time.is_noop());
    scroll.cleanup();
    time.cleanup();
    assert!(collector.is_empty());
}

// =============================================================================
// 页面追踪
// =============================================================================

#[test]
fn test_page_tracking_combines_trackers() {
    let f = fixture();
    let cleanup = f.logger.init_page_tracking(PageView {
        content_type: Some("comparison"),
        program: None,
        category: Some("engineering"),
    });

    assert_eq!(f.collector.names(), vec!["page_view"]);
    assert_eq!(f.page.listener_count(PageEvent::Scroll), 1);
    assert_eq!(f.page.listener_count(PageEvent::BeforeUnload), 1);
    assert_eq!(f.page.active_timers(), 1);

    f.page.scroll_to_percent(55.0);
    f.page.run_frames();
    f.page.advance(Duration::from_secs(30));

    cleanup.cleanup();
    assert_eq!(f.page.listener_count(PageEvent::Scroll), 0);
    assert_eq!(f.page.listener_count(PageEvent::BeforeUnload), 0);
    assert_eq!(f.page.active_timers(), 0);

    assert_eq!(
        f.collector.names(),
        vec![
            "page_view",
            "scroll_depth",
            "scroll_depth",
            "time_on_page",
            "time_on_page"
        ]
    );
    let content_types = values(&f.collector, "time_on_page", "content_type");
    assert!(content_types.iter().all(|v| v == "comparison"));
}
