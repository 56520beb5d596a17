//! 测试用的假实现：脚本化的连接器、生成服务与手动时钟

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::{AutomationError, GenerationError};
use crate::infrastructure::{Connection, Connector};
use crate::models::{PostContent, PostKind};
use crate::orchestrator::Clock;
use crate::services::content_generator::{ContentGenerator, GenerationRequest};

#[derive(Default)]
struct FakeState {
    submit_results: Mutex<VecDeque<Result<(), AutomationError>>>,
    fallback: Mutex<Option<fn() -> AutomationError>>,
    connect_failures: Mutex<VecDeque<AutomationError>>,
    connects: AtomicUsize,
    submit_calls: AtomicUsize,
    submitted: Mutex<Vec<PostContent>>,
    diagnostics: AtomicUsize,
    closes: AtomicUsize,
    shutdowns: AtomicUsize,
    in_flight: AtomicBool,
    overlap: AtomicBool,
}

/// 按脚本返回提交结果的连接器
///
/// 脚本用完后提交都成功，除非设置了 `always_failing`。
#[derive(Default)]
pub struct FakeConnector {
    state: Arc<FakeState>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submit_results(self, results: Vec<Result<(), AutomationError>>) -> Self {
        self.state.submit_results.lock().unwrap().extend(results);
        self
    }

    pub fn always_failing(self, make: fn() -> AutomationError) -> Self {
        *self.state.fallback.lock().unwrap() = Some(make);
        self
    }

    /// 重建会话时依次返回的错误；初始连接总是成功
    pub fn with_connect_failures(self, failures: Vec<AutomationError>) -> Self {
        self.state.connect_failures.lock().unwrap().extend(failures);
        self
    }

    /// 连接器移交给会话后仍可用来检查调用情况
    pub fn probe(&self) -> FakeProbe {
        FakeProbe {
            state: self.state.clone(),
        }
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Connection = FakeConnection;

    async fn connect(&self) -> Result<FakeConnection, AutomationError> {
        if self.state.connects.load(Ordering::SeqCst) > 0 {
            if let Some(err) = self.state.connect_failures.lock().unwrap().pop_front() {
                return Err(err);
            }
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection {
            state: self.state.clone(),
        })
    }

    async fn shutdown(&mut self) {
        self.state.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeConnection {
    state: Arc<FakeState>,
}

#[async_trait]
impl Connection for FakeConnection {
    async fn submit(&mut self, post: &PostContent) -> Result<(), AutomationError> {
        if self.state.in_flight.swap(true, Ordering::SeqCst) {
            self.state.overlap.store(true, Ordering::SeqCst);
        }
        self.state.submit_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let scripted = self.state.submit_results.lock().unwrap().pop_front();
        let fallback = *self.state.fallback.lock().unwrap();
        let result = match (scripted, fallback) {
            (Some(result), _) => result,
            (None, Some(make)) => Err(make()),
            (None, None) => Ok(()),
        };
        if result.is_ok() {
            self.state.submitted.lock().unwrap().push(post.clone());
        }

        self.state.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn capture_diagnostics(&mut self, _dir: &Path, _label: &str) {
        self.state.diagnostics.fetch_add(1, Ordering::SeqCst);
    }

    async fn close(&mut self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeProbe {
    state: Arc<FakeState>,
}

impl FakeProbe {
    /// 成功建立的连接数
    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.state.submit_calls.load(Ordering::SeqCst)
    }

    /// 平台确认过的帖子
    pub fn submitted(&self) -> Vec<PostContent> {
        self.state.submitted.lock().unwrap().clone()
    }

    pub fn diagnostics(&self) -> usize {
        self.state.diagnostics.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.state.shutdowns.load(Ordering::SeqCst)
    }

    pub fn overlap_detected(&self) -> bool {
        self.state.overlap.load(Ordering::SeqCst)
    }
}

/// 按脚本返回生成结果的生成服务
///
/// 脚本用完后返回 `Post about <topic>`。
#[derive(Default)]
pub struct ScriptedGenerator {
    texts: Mutex<VecDeque<Result<String, GenerationError>>>,
    topic_batches: Mutex<VecDeque<Vec<String>>>,
    requested_kinds: Mutex<Vec<PostKind>>,
    discovery_calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, text: &str) -> Self {
        self.texts.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn with_generation_failure(self) -> Self {
        self.texts
            .lock()
            .unwrap()
            .push_back(Err(GenerationError::EmptyContent {
                model: "scripted".to_string(),
            }));
        self
    }

    pub fn with_topic_batch(self, batch: Vec<&str>) -> Self {
        self.topic_batches
            .lock()
            .unwrap()
            .push_back(batch.into_iter().map(str::to_string).collect());
        self
    }

    pub fn discovery_calls(&self) -> usize {
        self.discovery_calls.load(Ordering::SeqCst)
    }

    pub fn requested_kinds(&self) -> Vec<PostKind> {
        self.requested_kinds.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate_text(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<String, GenerationError> {
        self.requested_kinds.lock().unwrap().push(request.kind);
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Post about {}", request.topic)))
    }

    async fn discover_topics(&self, count: usize) -> Vec<String> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        let mut batch = self
            .topic_batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        batch.truncate(count);
        batch
    }
}

/// 手动时钟：`sleep` 立即返回并把时间向前推进
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let step = chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        let mut now = self.now.lock().unwrap();
        *now += step;
    }
}
