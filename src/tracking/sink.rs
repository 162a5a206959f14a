use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::collector::CollectedEvent;

/// 事件最终的投递目标
pub trait EventSink: Send + Sync {
    fn deliver(&self, batch: &[CollectedEvent]) -> anyhow::Result<()>;

    fn name(&self) -> &'static str;
}

/// 每条事件一行 JSON
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn deliver(&self, batch: &[CollectedEvent]) -> anyhow::Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for event in batch {
            serde_json::to_writer(&mut out, event)?;
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// POST 到外部采集端点
///
/// 请求体：`{"events": [{"name": ..., "params": {...}}, ...]}`
#[cfg(feature = "http-sink")]
pub struct HttpSink {
    endpoint: String,
    agent: ureq::Agent,
}

#[cfg(feature = "http-sink")]
impl HttpSink {
    pub fn new(endpoint: String, timeout: std::time::Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { endpoint, agent }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(feature = "http-sink")]
impl EventSink for HttpSink {
    fn deliver(&self, batch: &[CollectedEvent]) -> anyhow::Result<()> {
        use anyhow::Context;

        let body = serde_json::json!({ "events": batch });
        self.agent
            .post(&self.endpoint)
            .send_json(&body)
            .with_context(|| format!("POST {} failed", self.endpoint))?;
        tracing::trace!("HttpSink: posted {} event(s) to {}", batch.len(), self.endpoint);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// 在内存中保存投递的事件
#[derive(Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<CollectedEvent>>,
    batches: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<CollectedEvent> {
        self.delivered.lock().clone()
    }

    /// 调用 `deliver` 的次数
    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::Relaxed)
    }
}

impl EventSink for MemorySink {
    fn deliver(&self, batch: &[CollectedEvent]) -> anyhow::Result<()> {
        self.delivered.lock().extend_from_slice(batch);
        self.batches.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
