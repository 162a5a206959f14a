use super::cleanup::TrackingCleanup;
use super::event::PageView;
use super::logger::EventLogger;
use super::scroll::init_scroll_depth_tracking;
use super::time::init_time_on_page_tracking;

/// 立即记录页面浏览，并启动滚动深度和停留时长追踪
pub fn init_page_tracking(logger: &EventLogger, view: PageView<'_>) -> TrackingCleanup {
    logger.log_page_view(view);

    let scroll = init_scroll_depth_tracking(logger, view.content_type);
    let time = init_time_on_page_tracking(logger, view.content_type, None);
    scroll.merge(time)
}
