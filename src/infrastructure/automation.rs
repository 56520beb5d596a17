//! 浏览器自动化边界
//!
//! 发布会话只通过这两个 trait 操作页面，测试中可以替换为脚本化的假实现。

use std::path::Path;

use async_trait::async_trait;

use crate::error::AutomationError;
use crate::models::PostContent;

/// 根据保存的凭据建立新的页面连接
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// 建立一个全新的、已登录的连接
    async fn connect(&self) -> Result<Self::Connection, AutomationError>;

    /// 释放底层资源（浏览器进程等），可以重复调用
    async fn shutdown(&mut self) {}
}

/// 一个活动的页面连接
#[async_trait]
pub trait Connection: Send {
    /// 在发帖界面填写内容、点击发送并等待平台确认
    async fn submit(&mut self, post: &PostContent) -> Result<(), AutomationError>;

    /// 保存截图与 HTML，尽力而为
    async fn capture_diagnostics(&mut self, dir: &Path, label: &str);

    /// 关闭连接，可以重复调用
    async fn close(&mut self);
}
