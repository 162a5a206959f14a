//! 页面宿主抽象：事件监听、动画帧与重复定时器

use std::sync::Arc;
use std::time::Duration;

/// 可监听的页面事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageEvent {
    Scroll,
    BeforeUnload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// 滚动位置快照（像素）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    /// `(scroll_top + viewport_height) / document_height * 100`
    ///
    /// 文档高度为 0 时返回 `None`。
    pub fn percentage(&self) -> Option<f64> {
        if self.document_height <= 0.0 {
            return None;
        }
        Some((self.scroll_top + self.viewport_height) / self.document_height * 100.0)
    }
}

/// 可重复触发的回调
pub type Handler = Arc<dyn Fn() + Send + Sync>;

/// 下一帧执行一次的回调
pub type FrameCallback = Box<dyn FnOnce() + Send>;

/// 页面宿主
///
/// 移除不存在的监听器、清除已清除的定时器都必须是空操作。
pub trait PageHost: Send + Sync {
    fn scroll_metrics(&self) -> ScrollMetrics;

    fn add_listener(&self, event: PageEvent, handler: Handler) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);

    fn request_animation_frame(&self, callback: FrameCallback);

    fn set_interval(&self, period: Duration, handler: Handler) -> TimerId;

    fn clear_interval(&self, id: TimerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        let metrics = ScrollMetrics {
            scroll_top: 0.0,
            viewport_height: 500.0,
            document_height: 2000.0,
        };
        assert_eq!(metrics.percentage(), Some(25.0));

        let bottom = ScrollMetrics {
            scroll_top: 1500.0,
            ..metrics
        };
        assert_eq!(bottom.percentage(), Some(100.0));
    }

    #[test]
    fn test_percentage_empty_document() {
        assert_eq!(ScrollMetrics::default().percentage(), None);
    }
}
