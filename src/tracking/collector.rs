//! 事件采集器
//!
//! 记录器只做单向发送，从不检查结果：
//! - `ChannelCollector` 把事件写入有界通道，满或关闭时丢弃
//! - `CollectorWorker` 在独立线程里批量取出事件交给 [`EventSink`]
//! - sink 失败只记录日志，不会回到记录器

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::event::ConversionEvent;
use super::sink::EventSink;
use crate::config::{CollectorConfig, CollectorKind};
use crate::errors::{Result, TrackerError};

/// 外部分析采集器，`send` 是 fire-and-forget
pub trait Collector: Send + Sync {
    fn send(&self, event_name: &str, params: &ConversionEvent);
}

/// 一条待转发的事件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedEvent {
    pub name: String,
    pub params: ConversionEvent,
}

/// 丢弃所有事件
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCollector;

impl Collector for NoopCollector {
    fn send(&self, event_name: &str, _params: &ConversionEvent) {
        trace!("NoopCollector: dropped {}", event_name);
    }
}

/// 在内存中保存收到的事件
#[derive(Debug, Default)]
pub struct MemoryCollector {
    events: Mutex<Vec<CollectedEvent>>,
}

impl MemoryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CollectedEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Collector for MemoryCollector {
    fn send(&self, event_name: &str, params: &ConversionEvent) {
        self.events.lock().push(CollectedEvent {
            name: event_name.to_string(),
            params: params.clone(),
        });
    }
}

/// 基于有界通道的采集器
#[derive(Debug, Clone)]
pub struct ChannelCollector {
    sender: Sender<CollectedEvent>,
}

impl ChannelCollector {
    pub fn bounded(capacity: usize) -> (Self, Receiver<CollectedEvent>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl Collector for ChannelCollector {
    fn send(&self, event_name: &str, params: &ConversionEvent) {
        let event = CollectedEvent {
            name: event_name.to_string(),
            params: params.clone(),
        };
        match self.sender.try_send(event) {
            Ok(()) => trace!("ChannelCollector: queued {}", event_name),
            Err(TrySendError::Full(e)) => {
                trace!("ChannelCollector: channel full, dropped {}", e.name)
            }
            Err(TrySendError::Disconnected(e)) => {
                trace!("ChannelCollector: worker gone, dropped {}", e.name)
            }
        }
    }
}

/// 后台转发线程
///
/// 所有 `ChannelCollector` 被丢弃后通道关闭，线程处理完剩余事件后退出。
pub struct CollectorWorker {
    handle: JoinHandle<()>,
}

impl CollectorWorker {
    pub fn spawn(
        receiver: Receiver<CollectedEvent>,
        sink: Arc<dyn EventSink>,
        batch_size: usize,
    ) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let handle = thread::Builder::new()
            .name("utm-collector".to_string())
            .spawn(move || Self::run(receiver, sink, batch_size))
            .map_err(|e| TrackerError::collector(format!("failed to spawn worker: {}", e)))?;
        Ok(Self { handle })
    }

    /// 等待线程退出（调用前需丢弃所有发送端）
    pub fn join(self) {
        if self.handle.join().is_err() {
            warn!("CollectorWorker: worker thread panicked");
        }
    }

    fn run(receiver: Receiver<CollectedEvent>, sink: Arc<dyn EventSink>, batch_size: usize) {
        debug!("CollectorWorker: started with sink {}", sink.name());

        while let Ok(first) = receiver.recv() {
            let mut batch = Vec::with_capacity(batch_size);
            batch.push(first);
            while batch.len() < batch_size {
                match receiver.try_recv() {
                    Ok(event) => batch.push(event),
                    Err(_) => break,
                }
            }

            let count = batch.len();
            match sink.deliver(&batch) {
                Ok(()) => trace!("CollectorWorker: delivered {} event(s)", count),
                Err(e) => warn!(
                    "CollectorWorker: sink {} failed: {}, {} event(s) dropped",
                    sink.name(),
                    e,
                    count
                ),
            }
        }

        debug!("CollectorWorker: channel closed, exiting");
    }
}

/// 按配置组装的采集器及其后台线程
pub struct CollectorHandle {
    collector: Arc<dyn Collector>,
    worker: Option<CollectorWorker>,
}

impl CollectorHandle {
    pub fn collector(&self) -> Arc<dyn Collector> {
        Arc::clone(&self.collector)
    }

    /// 关闭通道并等待剩余事件转发完毕
    ///
    /// 通过 `collector()` 取出的副本必须先被丢弃，否则会一直等待。
    pub fn shutdown(self) {
        drop(self.collector);
        if let Some(worker) = self.worker {
            worker.join();
        }
    }
}

/// 根据配置创建采集器
pub fn build_collector(config: &CollectorConfig) -> Result<CollectorHandle> {
    config.validate()?;

    let sink: Arc<dyn EventSink> = match config.kind {
        CollectorKind::None => {
            return Ok(CollectorHandle {
                collector: Arc::new(NoopCollector),
                worker: None,
            });
        }
        CollectorKind::Stdout => Arc::new(super::sink::StdoutSink),
        #[cfg(feature = "http-sink")]
        CollectorKind::Http => {
            let endpoint = config.endpoint.clone().unwrap_or_default();
            Arc::new(super::sink::HttpSink::new(
                endpoint,
                std::time::Duration::from_secs(config.timeout_secs),
            ))
        }
        #[cfg(not(feature = "http-sink"))]
        CollectorKind::Http => {
            return Err(TrackerError::config(
                "collector.kind = \"http\" requires the http-sink feature",
            ));
        }
    };

    let (collector, receiver) = ChannelCollector::bounded(config.channel_capacity);
    let worker = CollectorWorker::spawn(receiver, sink, config.batch_size)?;
    debug!(
        "Collector: {} sink ready (capacity {}, batch {})",
        config.kind.as_ref(),
        config.channel_capacity,
        config.batch_size
    );

    Ok(CollectorHandle {
        collector: Arc::new(collector),
        worker: Some(worker),
    })
}
