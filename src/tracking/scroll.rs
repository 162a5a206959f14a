//! 滚动深度追踪
//!
//! 每个阈值只在滚动百分比首次达到时记录一次。scroll 事件被节流：已有待执行
//! 的帧时忽略新的 scroll 事件，实际计算放在下一帧。

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use super::cleanup::TrackingCleanup;
use super::host::{Handler, PageEvent, ScrollMetrics};
use super::logger::EventLogger;

pub(crate) struct ScrollDepthTracker {
    logger: EventLogger,
    content_type: Option<String>,
    thresholds: Vec<u8>,
    /// 已触发的阈值，只增不减
    fired: Mutex<BTreeSet<u8>>,
    /// 是否已有待执行的帧，防止同一帧内重复调度
    frame_pending: AtomicBool,
}

impl ScrollDepthTracker {
    pub(crate) fn new(logger: EventLogger, content_type: Option<String>) -> Self {
        let thresholds = logger.config().scroll_thresholds.clone();
        Self {
            logger,
            content_type,
            thresholds,
            fired: Mutex::new(BTreeSet::new()),
            frame_pending: AtomicBool::new(false),
        }
    }

    fn on_scroll(self: &Arc<Self>) {
        // 只有成功把 frame_pending 从 false 设为 true 的调用才调度
        if self
            .frame_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            trace!("ScrollDepthTracker: frame already pending, skipping");
            return;
        }

        let Some(host) = self.logger.environment().host() else {
            self.frame_pending.store(false, Ordering::Release);
            return;
        };

        let tracker = Arc::clone(self);
        host.request_animation_frame(Box::new(move || tracker.on_frame()));
    }

    fn on_frame(&self) {
        if let Some(host) = self.logger.environment().host() {
            self.record(host.scroll_metrics());
        }
        self.frame_pending.store(false, Ordering::Release);
    }

    /// 记录新达到的阈值，返回本次触发的阈值
    pub(crate) fn record(&self, metrics: ScrollMetrics) -> Vec<u8> {
        let Some(percentage) = metrics.percentage() else {
            return Vec::new();
        };

        let reached: Vec<u8> = {
            let mut fired = self.fired.lock();
            self.thresholds
                .iter()
                .copied()
                .filter(|t| percentage >= f64::from(*t) && fired.insert(*t))
                .collect()
        };

        for depth in &reached {
            self.logger
                .log_scroll_depth(*depth, self.content_type.as_deref());
        }
        reached
    }

    pub(crate) fn fired(&self) -> Vec<u8> {
        self.fired.lock().iter().copied().collect()
    }
}

/// 挂载节流的滚动监听，返回的清理句柄会移除监听
///
/// 环境没有页面宿主时什么也不做。
pub fn init_scroll_depth_tracking(
    logger: &EventLogger,
    content_type: Option<&str>,
) -> TrackingCleanup {
    let env = Arc::clone(logger.environment());
    let Some(host) = env.host() else {
        trace!("ScrollDepthTracker: no page host, tracking disabled");
        return TrackingCleanup::noop();
    };

    let tracker = Arc::new(ScrollDepthTracker::new(
        logger.clone(),
        content_type.map(str::to_string),
    ));
    let handler: Handler = {
        let tracker = Arc::clone(&tracker);
        Arc::new(move || tracker.on_scroll())
    };
    let listener = host.add_listener(PageEvent::Scroll, handler);

    TrackingCleanup::new(move || {
        if let Some(host) = env.host() {
            host.remove_listener(listener);
        }
        trace!(
            "ScrollDepthTracker: detached, fired thresholds {:?}",
            tracker.fired()
        );
    })
}
