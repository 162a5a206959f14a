use std::fmt;

type CleanupAction = Box<dyn FnOnce() + Send>;

/// 自动追踪的清理句柄
///
/// `cleanup` 消耗自身，因此每个动作至多执行一次。丢弃句柄不会执行清理。
#[must_use = "dropping a TrackingCleanup leaves listeners and timers attached"]
#[derive(Default)]
pub struct TrackingCleanup {
    actions: Vec<CleanupAction>,
}

impl TrackingCleanup {
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            actions: vec![Box::new(action)],
        }
    }

    /// 合并两个句柄，按合并顺序执行
    pub fn merge(mut self, other: TrackingCleanup) -> Self {
        self.actions.extend(other.actions);
        self
    }

    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn cleanup(self) {
        for action in self.actions {
            action();
        }
    }
}

impl fmt::Debug for TrackingCleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingCleanup")
            .field("actions", &self.actions.len())
            .finish()
    }
}
