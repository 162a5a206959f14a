//! 转化事件追踪
//!
//! - `logger`: 事件归一与转发
//! - `env` / `host`: 注入的页面环境
//! - `collector` / `sink`: 单向转发到外部采集器
//! - `scroll` / `time` / `page`: 自动追踪

pub mod cleanup;
pub mod collector;
pub mod env;
pub mod event;
pub mod host;
pub mod logger;
pub mod page;
pub mod scroll;
pub mod session;
pub mod simulated;
pub mod sink;
pub mod time;

pub use cleanup::TrackingCleanup;
pub use collector::{
    ChannelCollector, CollectedEvent, Collector, CollectorHandle, CollectorWorker,
    MemoryCollector, NoopCollector, build_collector,
};
pub use env::{
    Clock, DocumentInfo, HeadlessEnvironment, KeyValueStore, MemoryStore, PageEnvironment,
    PageLocation, SystemClock, TrackingEnvironment,
};
pub use event::{
    CalculatorUsage, ConversionEvent, CtaClick, EventContext, EventType, PageView, WhatsAppClick,
};
pub use host::{PageEvent, PageHost, ScrollMetrics};
pub use logger::EventLogger;
pub use page::init_page_tracking;
pub use scroll::init_scroll_depth_tracking;
pub use simulated::SimulatedPage;
pub use sink::{EventSink, MemorySink, StdoutSink};
pub use time::init_time_on_page_tracking;

#[cfg(feature = "http-sink")]
pub use sink::HttpSink;
