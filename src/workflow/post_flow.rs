//! 发布单元流程 - 流程层
//!
//! 核心职责：定义"一条帖子"的完整处理流程
//!
//! 流程顺序：
//! 1. 按话题与帖子类型生成原文
//! 2. 规整并组装成帖子（不够用时退化为单条帖子）
//! 3. 通过发布会话提交

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::infrastructure::Connector;
use crate::models::{PostContent, Topic};
use crate::services::content_generator::{ContentGenerator, GenerationRequest};
use crate::services::publishing_session::{PublishOutcome, PublishingSession};
use crate::utils::text::preview;
use crate::workflow::compose::{compose, ComposeLimits};
use crate::workflow::post_ctx::PostCtx;

/// 单元处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// 平台已确认，附带实际提交的内容
    Published(PostContent),
    /// 没有得到可用的文本
    GenerationFailed,
    /// 提交失败；`permanent` 表示没有经过重试
    PublishFailed { permanent: bool },
}

/// 发布单元流程
///
/// - 不持有页面，只借用发布会话
/// - 不挑选话题与类型，由编排层决定
pub struct PostFlow {
    generator: Arc<dyn ContentGenerator>,
    limits: ComposeLimits,
    language: String,
    tone: String,
    promo_url: Option<String>,
    verbose_logging: bool,
}

impl PostFlow {
    pub fn new(config: &Config, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            generator,
            limits: ComposeLimits::from_config(config),
            language: config.language.clone(),
            tone: config.tone.clone(),
            promo_url: config.promo_url.clone(),
            verbose_logging: config.verbose_logging,
        }
    }

    pub fn generator(&self) -> &dyn ContentGenerator {
        self.generator.as_ref()
    }

    pub async fn run<C: Connector>(
        &self,
        ctx: &PostCtx,
        topic: &Topic,
        session: &mut PublishingSession<C>,
    ) -> UnitOutcome {
        info!("{} 📝 话题: {}", ctx, preview(topic.text(), 60));

        let request = GenerationRequest {
            topic: topic.text(),
            language: &self.language,
            tone: &self.tone,
            kind: ctx.kind,
        };
        let raw = match self.generator.generate_text(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{} ⚠️ 生成失败，跳过: {}", ctx, e);
                return UnitOutcome::GenerationFailed;
            }
        };
        if self.verbose_logging {
            debug!("{} LLM 原文:\n{}", ctx, raw);
        }

        let Some(post) = compose(ctx.kind, &raw, &self.limits, self.promo_url.as_deref()) else {
            warn!("{} ⚠️ 生成内容没有可用的行，跳过", ctx);
            return UnitOutcome::GenerationFailed;
        };
        if post.kind() != ctx.kind {
            info!("{} 内容不足以组成 {}，改为 {}", ctx, ctx.kind, post.kind());
        }

        info!("{} 📤 提交: {}", ctx, preview(&post.audit_line(), 80));
        match session.submit(&post).await {
            PublishOutcome::Published { attempts } => {
                info!("{} ✅ 发布成功 (尝试 {} 次)", ctx, attempts);
                UnitOutcome::Published(post.truncated(self.limits.max_post_chars))
            }
            PublishOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                error!(
                    "{} ❌ 发布失败，已尝试 {} 次: {}",
                    ctx, attempts, last_error
                );
                UnitOutcome::PublishFailed { permanent: false }
            }
            PublishOutcome::Rejected { error, .. } => {
                error!("{} ⛔ 发布被拒绝（需要人工检查账号状态）: {}", ctx, error);
                UnitOutcome::PublishFailed { permanent: true }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::AutomationError;
    use crate::models::PostKind;
    use crate::testing::{FakeConnector, ScriptedGenerator};

    fn flow(generator: Arc<ScriptedGenerator>) -> PostFlow {
        let config = Config {
            promo_url: Some("https://example.com/p".to_string()),
            ..Default::default()
        };
        PostFlow::new(&config, generator)
    }

    async fn session(connector: FakeConnector) -> PublishingSession<FakeConnector> {
        PublishingSession::open(connector, 2, 280, None::<PathBuf>)
            .await
            .unwrap()
    }

    fn topic() -> Topic {
        Topic::new("Rust async runtimes").unwrap()
    }

    #[tokio::test]
    async fn test_published_thread() {
        let generator = Arc::new(
            ScriptedGenerator::new().with_text("1/ Tokio is everywhere.\n2/ smol is tiny."),
        );
        let connector = FakeConnector::new();
        let probe = connector.probe();
        let mut session = session(connector).await;
        let ctx = PostCtx::new(1, 1, 3, PostKind::Thread);

        let outcome = flow(generator.clone()).run(&ctx, &topic(), &mut session).await;

        let expected = PostContent::Thread {
            parts: vec!["Tokio is everywhere.".to_string(), "smol is tiny.".to_string()],
        };
        assert_eq!(outcome, UnitOutcome::Published(expected.clone()));
        assert_eq!(probe.submitted(), vec![expected]);
        assert_eq!(generator.requested_kinds(), vec![PostKind::Thread]);
    }

    #[tokio::test]
    async fn test_generation_failure_skips_submission() {
        let generator = Arc::new(ScriptedGenerator::new().with_generation_failure());
        let connector = FakeConnector::new();
        let probe = connector.probe();
        let mut session = session(connector).await;
        let ctx = PostCtx::new(1, 1, 1, PostKind::Single);

        let outcome = flow(generator).run(&ctx, &topic(), &mut session).await;

        assert_eq!(outcome, UnitOutcome::GenerationFailed);
        assert_eq!(probe.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_unusable_text_is_generation_failure() {
        let generator = Arc::new(ScriptedGenerator::new().with_text("Sure! Here you go:\n\n"));
        let mut session = session(FakeConnector::new()).await;
        let ctx = PostCtx::new(1, 1, 1, PostKind::Single);

        let outcome = flow(generator).run(&ctx, &topic(), &mut session).await;
        assert_eq!(outcome, UnitOutcome::GenerationFailed);
    }

    #[tokio::test]
    async fn test_publish_failures_are_classified() {
        let generator = Arc::new(ScriptedGenerator::new());
        let connector = FakeConnector::new().with_submit_results(vec![
            Err(AutomationError::ActionDisabled),
            Err(AutomationError::Transient("crash".to_string())),
            Err(AutomationError::Transient("crash".to_string())),
        ]);
        let mut session = session(connector).await;
        let flow = flow(generator);
        let ctx = PostCtx::new(1, 1, 2, PostKind::Single);

        assert_eq!(
            flow.run(&ctx, &topic(), &mut session).await,
            UnitOutcome::PublishFailed { permanent: true }
        );
        assert_eq!(
            flow.run(&ctx, &topic(), &mut session).await,
            UnitOutcome::PublishFailed { permanent: false }
        );
    }

    #[tokio::test]
    async fn test_promotional_post_carries_url() {
        let generator = Arc::new(ScriptedGenerator::new().with_text("Try our new course."));
        let connector = FakeConnector::new();
        let probe = connector.probe();
        let mut session = session(connector).await;
        let ctx = PostCtx::new(1, 1, 1, PostKind::Promotional);

        flow(generator).run(&ctx, &topic(), &mut session).await;

        assert_eq!(
            probe.submitted()[0].bodies(),
            vec!["Try our new course. https://example.com/p"]
        );
    }
}
