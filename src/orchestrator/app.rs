//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：读取会话凭据、启动或连接浏览器、建立发布会话
//! 2. **话题库准备**：加载话题，不足时先补充一次
//! 3. **资源管理**：唯一持有浏览器的模块（经由发布会话）
//! 4. **优雅退出**：收到 Ctrl-C 后关闭会话与浏览器
//!
//! 启动阶段的任何失败都是致命的；进入调度循环后的失败都在单元内消化。

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::browser::{self, StorageState};
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::ChromeConnector;
use crate::orchestrator::clock::SystemClock;
use crate::orchestrator::scheduler::{Scheduler, SchedulerServices, SchedulerSettings};
use crate::services::{
    AuditLog, ContentGenerator, FileLineStore, LlmService, PublishingSession, TopicStore,
};
use crate::utils::logging::log_startup;
use crate::workflow::PostFlow;

/// 应用主结构
pub struct App {
    scheduler: Scheduler<ChromeConnector>,
}

impl App {
    /// 初始化应用
    ///
    /// # 参数
    /// - `config`: 已校验的配置
    ///
    /// # 返回
    /// 凭据、浏览器或首次连接任何一步失败都返回 `AppError`
    pub async fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let credentials = StorageState::load(&config.auth_file)?;
        let settings = SchedulerSettings::from_config(&config)?;
        let generator: Arc<dyn ContentGenerator> = Arc::new(LlmService::new(&config));

        // 话题库
        let mut topics = TopicStore::new(
            Box::new(FileLineStore::new(&config.prompts_file)),
            seeded_rng(config.rng_seed.map(|s| s.wrapping_add(1))),
        );
        topics.load().await;
        if topics.len() < config.min_topics {
            info!(
                "话题库只有 {} 个话题，先补充到 {} 个",
                topics.len(),
                config.min_topics
            );
            topics
                .discover(generator.as_ref(), config.min_topics, config.discovery_batch)
                .await;
        }

        // 浏览器与发布会话
        let browser = browser::open_browser(&config).await?;
        let connector = ChromeConnector::new(
            browser,
            config.browser_debug_port.is_none(),
            &credentials,
            config.user_agent.clone(),
            config.home_url.clone(),
        );
        let session = PublishingSession::open(
            connector,
            config.max_attempts,
            config.max_post_chars,
            Some(config.diagnostics_dir.clone()),
        )
        .await?;

        let services = SchedulerServices {
            topics,
            audit: AuditLog::new(Box::new(FileLineStore::new(&config.posted_log))),
            session,
            flow: PostFlow::new(&config, generator),
        };
        let scheduler = Scheduler::new(
            settings,
            services,
            Arc::new(SystemClock),
            seeded_rng(config.rng_seed),
        );

        Ok(Self { scheduler })
    }

    /// 运行调度循环直到收到 Ctrl-C
    pub async fn run(mut self) -> Result<()> {
        let interrupted = tokio::select! {
            _ = self.scheduler.run() => Ok(()),
            signal = tokio::signal::ctrl_c() => signal,
        };
        info!("🛑 收到中断信号，正在退出...");

        self.scheduler.shutdown().await;
        interrupted.context("监听中断信号失败")?;
        Ok(())
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
