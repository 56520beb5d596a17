//! 发布会话 - 业务能力层
//!
//! 独占唯一的页面连接，负责把一条帖子提交出去，并在临时性故障后重建会话重试。
//!
//! 状态：
//! - `Active`：持有可用连接
//! - `Recovering`：旧连接已丢弃，下一次尝试前用同一份凭据重新连接
//! - `Closed`：终态，不再接受任何操作

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::error::AutomationError;
use crate::infrastructure::{Connection, Connector};
use crate::models::PostContent;

/// 会话句柄
///
/// 重建会话时产生新的 `Active` 句柄，而不是修补旧连接。
pub enum SessionHandle<T> {
    Active(T),
    Recovering,
    Closed,
}

/// 对外可观察的会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Recovering,
    Closed,
}

impl<T> SessionHandle<T> {
    pub fn state(&self) -> SessionState {
        match self {
            SessionHandle::Active(_) => SessionState::Active,
            SessionHandle::Recovering => SessionState::Recovering,
            SessionHandle::Closed => SessionState::Closed,
        }
    }
}

/// 一次逻辑提交的结果
#[derive(Debug)]
pub enum PublishOutcome {
    /// 平台已确认
    Published { attempts: u32 },
    /// 临时性故障用完了全部尝试次数
    Exhausted {
        attempts: u32,
        last_error: AutomationError,
    },
    /// 永久失败（硬超时、发送按钮不可用、会话已关闭），没有重试
    Rejected {
        attempts: u32,
        error: AutomationError,
    },
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

/// 发布会话
pub struct PublishingSession<C: Connector> {
    connector: C,
    handle: SessionHandle<C::Connection>,
    max_attempts: u32,
    max_chars: usize,
    diagnostics_dir: Option<PathBuf>,
    recoveries: u64,
}

impl<C: Connector> PublishingSession<C> {
    /// 建立初始连接；失败属于启动失败
    pub async fn open(
        connector: C,
        max_attempts: u32,
        max_chars: usize,
        diagnostics_dir: Option<PathBuf>,
    ) -> Result<Self, AutomationError> {
        let connection = connector.connect().await?;
        info!("✓ 发布会话已建立");
        Ok(Self {
            connector,
            handle: SessionHandle::Active(connection),
            max_attempts: max_attempts.max(1),
            max_chars,
            diagnostics_dir,
            recoveries: 0,
        })
    }

    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    /// 成功重建会话的次数
    pub fn recoveries(&self) -> u64 {
        self.recoveries
    }

    /// 提交一条帖子
    ///
    /// 内容先截断到平台上限。临时性故障会重建会话并重试，
    /// 总尝试次数不超过 `max_attempts`；永久失败立即返回。
    ///
    /// # 参数
    /// - `post`: 要发布的帖子
    ///
    /// # 返回
    /// - `Published`: 平台确认发布
    /// - `Exhausted`: 临时性故障用完了尝试次数
    /// - `Rejected`: 永久失败或会话已关闭
    pub async fn submit(&mut self, post: &PostContent) -> PublishOutcome {
        if matches!(self.handle, SessionHandle::Closed) {
            return PublishOutcome::Rejected {
                attempts: 0,
                error: AutomationError::Closed,
            };
        }

        let post = post.truncated(self.max_chars);
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("提交尝试 {}/{}", attempts, self.max_attempts);

            let result = match self.ensure_active().await {
                Ok(connection) => connection.submit(&post).await,
                Err(e) => Err(e),
            };

            let err = match result {
                Ok(()) => return PublishOutcome::Published { attempts },
                Err(e) => e,
            };

            let label = format!("{}-attempt{}", post.kind(), attempts);
            if !err.is_transient() {
                error!("⛔ 永久性发布失败，不再重试: {}", err);
                self.capture_diagnostics(&label).await;
                return PublishOutcome::Rejected {
                    attempts,
                    error: err,
                };
            }

            warn!(
                "⚠️ 临时性故障 (尝试 {}/{}): {}",
                attempts, self.max_attempts, err
            );
            self.discard_connection(&label).await;

            if attempts >= self.max_attempts {
                error!("❌ 已用完 {} 次尝试，放弃本条帖子", self.max_attempts);
                return PublishOutcome::Exhausted {
                    attempts,
                    last_error: err,
                };
            }
        }
    }

    /// 关闭连接与底层浏览器；可以重复调用
    pub async fn close(&mut self) {
        let previous = std::mem::replace(&mut self.handle, SessionHandle::Closed);
        if let SessionHandle::Active(mut connection) = previous {
            connection.close().await;
        }
        self.connector.shutdown().await;
        debug!("发布会话已关闭");
    }

    /// 处于 Recovering 时先用同一份凭据重新连接
    async fn ensure_active(&mut self) -> Result<&mut C::Connection, AutomationError> {
        if matches!(self.handle, SessionHandle::Recovering) {
            info!("🔄 正在重建发布会话...");
            let connection = self.connector.connect().await?;
            self.recoveries += 1;
            self.handle = SessionHandle::Active(connection);
            info!("✓ 会话已重建 (累计 {} 次)", self.recoveries);
        }

        match &mut self.handle {
            SessionHandle::Active(connection) => Ok(connection),
            _ => Err(AutomationError::Closed),
        }
    }

    /// 留存现场后丢弃当前连接，进入 Recovering
    async fn discard_connection(&mut self, label: &str) {
        self.capture_diagnostics(label).await;
        let previous = std::mem::replace(&mut self.handle, SessionHandle::Recovering);
        if let SessionHandle::Active(mut connection) = previous {
            connection.close().await;
        }
    }

    async fn capture_diagnostics(&mut self, label: &str) {
        let Some(dir) = self.diagnostics_dir.clone() else {
            return;
        };
        if let SessionHandle::Active(connection) = &mut self.handle {
            connection.capture_diagnostics(&dir, label).await;
        }
    }
}
