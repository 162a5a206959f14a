//! 可手动驱动的页面宿主
//!
//! 保存所有监听器、待执行的动画帧和定时器，由调用方通过 `scroll_to`、
//! `run_frames`、`advance`、`unload` 推进。同时提供虚拟时钟，供停留时长
//! 追踪使用。回调执行时不持有内部锁，回调中可以再次调用宿主。

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tracing::trace;

use super::env::Clock;
use super::host::{
    FrameCallback, Handler, ListenerId, PageEvent, PageHost, ScrollMetrics, TimerId,
};

struct Timer {
    id: TimerId,
    period: Duration,
    next_due: Duration,
    handler: Handler,
}

struct PageState {
    metrics: ScrollMetrics,
    listeners: Vec<(ListenerId, PageEvent, Handler)>,
    frames: VecDeque<FrameCallback>,
    timers: Vec<Timer>,
    next_id: u64,
    started_at: DateTime<Utc>,
    elapsed: Duration,
}

impl PageState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct SimulatedPage {
    state: Mutex<PageState>,
}

impl SimulatedPage {
    /// `viewport_height` / `document_height` 单位为像素
    pub fn new(viewport_height: f64, document_height: f64) -> Self {
        Self::starting_at(viewport_height, document_height, Utc::now())
    }

    pub fn starting_at(
        viewport_height: f64,
        document_height: f64,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            state: Mutex::new(PageState {
                metrics: ScrollMetrics {
                    scroll_top: 0.0,
                    viewport_height,
                    document_height,
                },
                listeners: Vec::new(),
                frames: VecDeque::new(),
                timers: Vec::new(),
                next_id: 0,
                started_at,
                elapsed: Duration::ZERO,
            }),
        }
    }

    /// 设置滚动位置并派发 scroll 事件
    pub fn scroll_to(&self, scroll_top: f64) {
        self.state.lock().metrics.scroll_top = scroll_top;
        self.dispatch(PageEvent::Scroll);
    }

    /// 滚动到使 `(scroll_top + viewport) / document` 等于 `percent` 的位置
    pub fn scroll_to_percent(&self, percent: f64) {
        let metrics = self.state.lock().metrics;
        let target = metrics.document_height * percent / 100.0 - metrics.viewport_height;
        self.scroll_to(target.max(0.0));
    }

    pub fn dispatch(&self, event: PageEvent) {
        let handlers: Vec<Handler> = self
            .state
            .lock()
            .listeners
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, h)| Handler::clone(h))
            .collect();

        trace!(
            "SimulatedPage: dispatching {:?} to {} listener(s)",
            event,
            handlers.len()
        );
        for handler in handlers {
            handler();
        }
    }

    /// 执行当前排队的动画帧，返回执行数量
    ///
    /// 执行过程中新请求的帧留到下一次调用。
    pub fn run_frames(&self) -> usize {
        let frames: Vec<FrameCallback> = self.state.lock().frames.drain(..).collect();
        let count = frames.len();
        for frame in frames {
            frame();
        }
        count
    }

    /// 推进虚拟时间，按到期顺序触发定时器
    pub fn advance(&self, by: Duration) {
        let target = self.state.lock().elapsed + by;

        loop {
            let due = {
                let mut state = self.state.lock();
                let next = state
                    .timers
                    .iter_mut()
                    .filter(|t| !t.period.is_zero() && t.next_due <= target)
                    .min_by_key(|t| t.next_due)
                    .map(|t| {
                        let at = t.next_due;
                        t.next_due += t.period;
                        (at, Handler::clone(&t.handler))
                    });

                match next {
                    Some((at, handler)) => {
                        state.elapsed = at;
                        Some(handler)
                    }
                    None => {
                        state.elapsed = target;
                        None
                    }
                }
            };

            match due {
                Some(handler) => handler(),
                None => break,
            }
        }
    }

    /// 派发 beforeunload
    pub fn unload(&self) {
        self.dispatch(PageEvent::BeforeUnload);
    }

    pub fn listener_count(&self, event: PageEvent) -> usize {
        self.state
            .lock()
            .listeners
            .iter()
            .filter(|(_, e, _)| *e == event)
            .count()
    }

    pub fn active_timers(&self) -> usize {
        self.state.lock().timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.lock().frames.len()
    }

    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }
}

impl Clock for SimulatedPage {
    fn now(&self) -> DateTime<Utc> {
        let state = self.state.lock();
        let elapsed = TimeDelta::from_std(state.elapsed).unwrap_or_default();
        state.started_at + elapsed
    }
}

impl PageHost for SimulatedPage {
    fn scroll_metrics(&self) -> ScrollMetrics {
        self.state.lock().metrics
    }

    fn add_listener(&self, event: PageEvent, handler: Handler) -> ListenerId {
        let mut state = self.state.lock();
        let id = ListenerId(state.allocate_id());
        state.listeners.push((id, event, handler));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.state.lock().listeners.retain(|(lid, _, _)| *lid != id);
    }

    fn request_animation_frame(&self, callback: FrameCallback) {
        self.state.lock().frames.push_back(callback);
    }

    fn set_interval(&self, period: Duration, handler: Handler) -> TimerId {
        let mut state = self.state.lock();
        let id = TimerId(state.allocate_id());
        let next_due = state.elapsed + period;
        state.timers.push(Timer {
            id,
            period,
            next_due,
            handler,
        });
        id
    }

    fn clear_interval(&self, id: TimerId) {
        self.state.lock().timers.retain(|t| t.id != id);
    }
}
