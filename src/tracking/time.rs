//! 页面停留时长追踪

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::trace;

use super::cleanup::TrackingCleanup;
use super::host::{Handler, PageEvent};
use super::logger::EventLogger;

struct TimeOnPageTracker {
    logger: EventLogger,
    content_type: Option<String>,
    started_at: DateTime<Utc>,
    interval_seconds: u64,
    /// 上次记录时的停留秒数
    last_logged: AtomicU64,
}

impl TimeOnPageTracker {
    fn elapsed_seconds(&self) -> u64 {
        let elapsed = self.logger.environment().now() - self.started_at;
        u64::try_from(elapsed.num_seconds()).unwrap_or(0)
    }

    fn on_tick(&self) {
        let elapsed = self.elapsed_seconds();
        let last = self.last_logged.load(Ordering::Acquire);
        if elapsed.saturating_sub(last) >= self.interval_seconds {
            self.logger
                .log_time_on_page(elapsed, self.content_type.as_deref());
            self.last_logged.store(elapsed, Ordering::Release);
        }
    }

    fn log_now(&self) {
        let elapsed = self.elapsed_seconds();
        self.logger
            .log_time_on_page(elapsed, self.content_type.as_deref());
        self.last_logged.store(elapsed, Ordering::Release);
    }
}

/// 按固定间隔记录停留时长，页面卸载时再记录一次
///
/// `interval_seconds` 缺省取 `tracking.time_interval_seconds`（30 秒）。
/// 清理句柄会清除定时器、移除卸载监听，并做最后一次记录。
pub fn init_time_on_page_tracking(
    logger: &EventLogger,
    content_type: Option<&str>,
    interval_seconds: Option<u64>,
) -> TrackingCleanup {
    let env = Arc::clone(logger.environment());
    let Some(host) = env.host() else {
        trace!("TimeOnPageTracker: no page host, tracking disabled");
        return TrackingCleanup::noop();
    };

    let interval_seconds = interval_seconds
        .unwrap_or(logger.config().time_interval_seconds)
        .max(1);
    let tracker = Arc::new(TimeOnPageTracker {
        logger: logger.clone(),
        content_type: content_type.map(str::to_string),
        started_at: env.now(),
        interval_seconds,
        last_logged: AtomicU64::new(0),
    });

    let tick: Handler = {
        let tracker = Arc::clone(&tracker);
        Arc::new(move || tracker.on_tick())
    };
    let unload: Handler = {
        let tracker = Arc::clone(&tracker);
        Arc::new(move || tracker.log_now())
    };

    let timer = host.set_interval(Duration::from_secs(interval_seconds), tick);
    let listener = host.add_listener(PageEvent::BeforeUnload, unload);

    TrackingCleanup::new(move || {
        if let Some(host) = env.host() {
            host.clear_interval(timer);
            host.remove_listener(listener);
        }
        tracker.log_now();
    })
}
