//! 注入的运行环境
//!
//! 事件记录器不直接读取全局状态（页面地址、会话存储、采集器），而是通过
//! [`TrackingEnvironment`] 获取。每项能力都是 `Option`，缺失时降级为空值
//! 或空操作，不会报错。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use url::Url;

use super::collector::Collector;
use super::host::PageHost;

/// 当前页面地址
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLocation {
    /// 完整 URL
    pub href: String,
    pub pathname: String,
}

impl PageLocation {
    /// 由完整 URL 推导 pathname，无法解析时 pathname 为空
    pub fn from_url(href: &str) -> Self {
        let pathname = Url::parse(href)
            .map(|u| u.path().to_string())
            .unwrap_or_default();
        Self {
            href: href.to_string(),
            pathname,
        }
    }
}

/// 文档元数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub referrer: String,
}

/// 键值存储（会话存储 / 持久存储）
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// 内存键值存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.data.insert(key.to_string(), value.to_string());
    }
}

/// 时钟
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 事件记录器依赖的运行环境
pub trait TrackingEnvironment: Send + Sync {
    fn location(&self) -> Option<PageLocation>;

    fn document(&self) -> Option<DocumentInfo>;

    /// 会话级存储（保存 session_id）
    fn session_store(&self) -> Option<&dyn KeyValueStore>;

    /// 持久存储（只读取 user_id）
    fn user_store(&self) -> Option<&dyn KeyValueStore>;

    fn collector(&self) -> Option<&dyn Collector>;

    /// 滚动、定时器、卸载事件的宿主
    fn host(&self) -> Option<&dyn PageHost> {
        None
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn is_development(&self) -> bool {
        false
    }
}

/// 没有任何页面能力的环境（服务端渲染、测试）
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessEnvironment;

impl TrackingEnvironment for HeadlessEnvironment {
    fn location(&self) -> Option<PageLocation> {
        None
    }

    fn document(&self) -> Option<DocumentInfo> {
        None
    }

    fn session_store(&self) -> Option<&dyn KeyValueStore> {
        None
    }

    fn user_store(&self) -> Option<&dyn KeyValueStore> {
        None
    }

    fn collector(&self) -> Option<&dyn Collector> {
        None
    }
}

/// 可组装的页面环境
#[derive(Default)]
pub struct PageEnvironment {
    location: Option<PageLocation>,
    document: Option<DocumentInfo>,
    session_store: Option<Arc<dyn KeyValueStore>>,
    user_store: Option<Arc<dyn KeyValueStore>>,
    collector: Option<Arc<dyn Collector>>,
    host: Option<Arc<dyn PageHost>>,
    clock: Option<Arc<dyn Clock>>,
    development: bool,
}

impl PageEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, href: &str) -> Self {
        self.location = Some(PageLocation::from_url(href));
        self
    }

    pub fn with_document(mut self, title: &str, referrer: &str) -> Self {
        self.document = Some(DocumentInfo {
            title: title.to_string(),
            referrer: referrer.to_string(),
        });
        self
    }

    pub fn with_session_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn with_user_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.user_store = Some(store);
        self
    }

    pub fn with_collector(mut self, collector: Arc<dyn Collector>) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn with_host(mut self, host: Arc<dyn PageHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn development(mut self, enabled: bool) -> Self {
        self.development = enabled;
        self
    }
}

impl TrackingEnvironment for PageEnvironment {
    fn location(&self) -> Option<PageLocation> {
        self.location.clone()
    }

    fn document(&self) -> Option<DocumentInfo> {
        self.document.clone()
    }

    fn session_store(&self) -> Option<&dyn KeyValueStore> {
        self.session_store.as_deref()
    }

    fn user_store(&self) -> Option<&dyn KeyValueStore> {
        self.user_store.as_deref()
    }

    fn collector(&self) -> Option<&dyn Collector> {
        self.collector.as_deref()
    }

    fn host(&self) -> Option<&dyn PageHost> {
        self.host.as_deref()
    }

    fn now(&self) -> DateTime<Utc> {
        match &self.clock {
            Some(clock) => clock.now(),
            None => Utc::now(),
        }
    }

    fn is_development(&self) -> bool {
        self.development
    }
}
