//! 调度器 - 编排层
//!
//! 按墙钟时间与当日进度驱动的状态机：
//!
//! ```text
//! Sleeping ──(到达活跃时段起点，重设目标)──▶ ActiveWindow
//! ActiveWindow ──(目标未满且在活跃时段内)──▶ BurstPosting
//! ActiveWindow ──(目标已满或已出活跃时段)──▶ Sleeping
//! BurstPosting ──(一轮连发结束)──▶ ActiveWindow
//! ```
//!
//! 单一控制流：同一时刻只有一个发布单元在处理。

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ConfigError;
use crate::infrastructure::Connector;
use crate::models::{KindSelector, PostGoal};
use crate::orchestrator::clock::Clock;
use crate::orchestrator::schedule_window::ScheduleWindow;
use crate::services::{AuditLog, PublishingSession, TopicStore};
use crate::utils::logging;
use crate::workflow::{PostCtx, PostFlow, UnitOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Sleeping,
    ActiveWindow,
    BurstPosting,
}

/// 调度参数
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub window: ScheduleWindow,
    pub goal_range: (u32, u32),
    pub burst_range: (u32, u32),
    /// 单元间停顿（秒）
    pub pause_range: (u64, u64),
    pub failure_cooldown: Duration,
    pub idle_backoff: Duration,
    pub min_topics: usize,
    pub discovery_batch: usize,
    pub kinds: KindSelector,
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let kinds = KindSelector::new(&config.kind_weights, config.promo_url.is_some())
            .ok_or_else(|| ConfigError::Invalid {
                name: "kind_weights".to_string(),
                reason: "所有帖子类型的权重都为 0".to_string(),
            })?;

        Ok(Self {
            window: ScheduleWindow::new(config.active_start_hour, config.active_end_hour),
            goal_range: (config.daily_goal_min, config.daily_goal_max),
            burst_range: (config.burst_min, config.burst_max),
            pause_range: config.pause_bounds(),
            failure_cooldown: Duration::from_secs(config.failure_cooldown_secs),
            idle_backoff: Duration::from_secs(config.idle_backoff_secs),
            min_topics: config.min_topics,
            discovery_batch: config.discovery_batch,
            kinds,
        })
    }
}

/// 调度器持有的业务能力
pub struct SchedulerServices<C: Connector> {
    pub topics: TopicStore,
    pub audit: AuditLog,
    pub session: PublishingSession<C>,
    pub flow: PostFlow,
}

/// 本次运行的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub bursts: u64,
    pub published: u64,
    pub generation_failures: u64,
    pub publish_failures: u64,
}

pub struct Scheduler<C: Connector> {
    settings: SchedulerSettings,
    services: SchedulerServices<C>,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    state: SchedulerState,
    goal: PostGoal,
    stats: RunStats,
}

impl<C: Connector> Scheduler<C> {
    /// 启动时就在活跃时段内则直接设定目标开始工作，否则先休眠
    pub fn new(
        settings: SchedulerSettings,
        services: SchedulerServices<C>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        let mut scheduler = Self {
            settings,
            services,
            clock,
            rng,
            state: SchedulerState::Sleeping,
            goal: PostGoal::default(),
            stats: RunStats::default(),
        };
        if scheduler.settings.window.is_active(scheduler.clock.now()) {
            scheduler.start_new_cycle();
            scheduler.state = SchedulerState::ActiveWindow;
        }
        scheduler
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn goal(&self) -> PostGoal {
        self.goal
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn services(&self) -> &SchedulerServices<C> {
        &self.services
    }

    /// 一直运行，直到外部取消
    pub async fn run(&mut self) {
        loop {
            self.step().await;
        }
    }

    /// 执行一次状态转换
    pub async fn step(&mut self) {
        self.state = match self.state {
            SchedulerState::Sleeping => {
                self.sleep_until_window().await;
                self.start_new_cycle();
                SchedulerState::ActiveWindow
            }
            SchedulerState::ActiveWindow => {
                if !self.settings.window.is_active(self.clock.now()) {
                    info!("🌙 活跃时段结束 (今日 {}/{})", self.goal.posted_count(), self.goal.daily_goal());
                    SchedulerState::Sleeping
                } else if self.goal.is_met() {
                    info!("🏁 今日目标已完成: {}", self.goal.daily_goal());
                    SchedulerState::Sleeping
                } else {
                    SchedulerState::BurstPosting
                }
            }
            SchedulerState::BurstPosting => {
                self.run_burst().await;
                SchedulerState::ActiveWindow
            }
        };
        debug!("调度状态 -> {:?}", self.state);
    }

    /// 关闭发布会话
    pub async fn shutdown(&mut self) {
        self.services.session.close().await;
        info!(
            "📊 本次运行: {} 轮连发 | 成功 {} | 生成失败 {} | 发布失败 {} | 会话重建 {}",
            self.stats.bursts,
            self.stats.published,
            self.stats.generation_failures,
            self.stats.publish_failures,
            self.services.session.recoveries()
        );
    }

    fn start_new_cycle(&mut self) {
        let (min, max) = self.settings.goal_range;
        let daily_goal = self.rng.gen_range(min..=max.max(min));
        self.goal.reset(daily_goal);
        logging::log_goal_set(daily_goal);
    }

    async fn sleep_until_window(&mut self) {
        let now = self.clock.now();
        let wake = self.settings.window.next_active_start(now);
        let duration = (wake - now).to_std().unwrap_or_default();
        logging::log_sleep_until(wake, duration);
        self.clock.sleep(duration).await;
    }

    /// 一轮连发
    ///
    /// 每条之前检查目标与活跃时段，目标一满立即停止；话题库为空时提前结束。
    pub async fn run_burst(&mut self) {
        if !self.ensure_topics().await {
            warn!(
                "⚠️ 话题库为空，{} 秒后重新评估",
                self.settings.idle_backoff.as_secs()
            );
            self.clock.sleep(self.settings.idle_backoff).await;
            return;
        }

        self.stats.bursts += 1;
        let burst = self.stats.bursts;
        let (min, max) = self.settings.burst_range;
        let size = self
            .rng
            .gen_range(min..=max.max(min))
            .max(1)
            .min(self.goal.remaining());
        logging::log_burst_start(burst, size, self.goal.posted_count(), self.goal.daily_goal());

        let mut attempted = 0;
        let mut published = 0;
        for unit in 1..=size {
            if self.goal.is_met() {
                break;
            }
            if !self.settings.window.is_active(self.clock.now()) {
                info!("活跃时段已结束，提前结束本轮连发");
                break;
            }
            let Some(topic) = self.services.topics.pick() else {
                warn!("⚠️ 话题已耗尽，提前结束本轮连发");
                break;
            };
            let kind = self.settings.kinds.pick(&mut self.rng);
            let ctx = PostCtx::new(burst, unit, size, kind);

            attempted += 1;
            let outcome = self
                .services
                .flow
                .run(&ctx, &topic, &mut self.services.session)
                .await;

            match outcome {
                UnitOutcome::Published(post) => {
                    self.goal.record_success();
                    self.services.audit.record(self.clock.now(), &post).await;
                    self.stats.published += 1;
                    published += 1;
                    info!(
                        "{} 今日进度 {}/{}",
                        ctx,
                        self.goal.posted_count(),
                        self.goal.daily_goal()
                    );
                }
                UnitOutcome::GenerationFailed => {
                    self.stats.generation_failures += 1;
                }
                UnitOutcome::PublishFailed { .. } => {
                    self.stats.publish_failures += 1;
                    info!(
                        "{} 冷却 {} 秒",
                        ctx,
                        self.settings.failure_cooldown.as_secs()
                    );
                    self.clock.sleep(self.settings.failure_cooldown).await;
                }
            }

            if !self.goal.is_met() {
                self.pause().await;
            }
        }

        logging::log_burst_complete(
            burst,
            published,
            attempted,
            self.goal.posted_count(),
            self.goal.daily_goal(),
        );
        info!(
            "📊 累计: 成功 {} | 生成失败 {} | 发布失败 {} | 会话重建 {}",
            self.stats.published,
            self.stats.generation_failures,
            self.stats.publish_failures,
            self.services.session.recoveries()
        );
    }

    /// 话题不足时补充；返回话题库是否可用
    async fn ensure_topics(&mut self) -> bool {
        let topics = &mut self.services.topics;
        if topics.len() < self.settings.min_topics {
            topics
                .discover(
                    self.services.flow.generator(),
                    self.settings.min_topics,
                    self.settings.discovery_batch,
                )
                .await;
        }
        !topics.is_empty()
    }

    async fn pause(&mut self) {
        let (min, max) = self.settings.pause_range;
        let secs = self.rng.gen_range(min..=max.max(min));
        debug!("⏸️ 停顿 {} 秒", secs);
        self.clock.sleep(Duration::from_secs(secs)).await;
    }
}
