//! 时钟抽象：调度器只通过它读取当前时间和休眠

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;

#[async_trait]
pub trait Clock: Send + Sync {
    /// 本地墙钟时间
    fn now(&self) -> NaiveDateTime;

    async fn sleep(&self, duration: Duration);
}

/// 真实时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
