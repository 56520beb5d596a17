//! 审计日志服务 - 业务能力层
//!
//! 只负责"记录已发布的帖子"能力，不关心流程

use chrono::NaiveDateTime;
use tracing::{debug, error};

use crate::models::PostContent;
use crate::services::line_store::LineStore;

/// 审计日志
///
/// 职责：
/// - 每条确认成功的帖子追加一行 `<时间> - <内容>`
/// - 只写不读，运行中从不回读
/// - 写入失败只记录错误，不影响发布流程
pub struct AuditLog {
    store: Box<dyn LineStore>,
    degraded: bool,
}

impl AuditLog {
    pub fn new(store: Box<dyn LineStore>) -> Self {
        Self {
            store,
            degraded: false,
        }
    }

    /// 追加一条发布记录
    ///
    /// # 参数
    /// - `at`: 发布时间（本地时间）
    /// - `post`: 已发布的帖子
    ///
    /// # 返回
    /// 是否成功落盘；失败只记录一次错误日志，不影响后续运行
    pub async fn record(&mut self, at: NaiveDateTime, post: &PostContent) -> bool {
        let line = format_entry(at, post);
        debug!("写入审计日志: {}", line);

        match self.store.append(&line).await {
            Ok(()) => true,
            Err(e) => {
                if !self.degraded {
                    error!("❌ 审计日志写入失败，本次运行不再保证记录完整: {}", e);
                }
                self.degraded = true;
                false
            }
        }
    }
}

fn format_entry(at: NaiveDateTime, post: &PostContent) -> String {
    format!("{} - {}", at.format("%Y-%m-%d %H:%M:%S"), post.audit_line())
}
