//! # Paced Publisher
//!
//! 一个无人值守、按拟人化节奏持续发布社交帖子的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `ChromeConnector` / `ChromeConnection` - 注入凭据、驱动发帖界面、留存现场
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条帖子
//! - `LlmService` - 生成帖子原文、发现话题
//! - `TopicStore` - 去重的话题积压
//! - `PublishingSession` - 提交帖子，临时故障时重建会话
//! - `AuditLog` - 写发布记录
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条帖子"的完整处理流程
//! - `PostCtx` - 上下文封装（连发轮次 + 单元序号 + 类型）
//! - `PostFlow` - 流程编排（generate → compose → submit）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/scheduler` - 作息状态机，管理每日目标与连发
//! - `orchestrator/app` - 应用生命周期与资源
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod testing;

// 重新导出常用类型
pub use config::Config;
pub use error::{
    AppError, AppResult, AutomationError, ConfigError, GenerationError, PersistenceError,
};
pub use models::{PostContent, PostKind, Topic};
pub use orchestrator::{App, Scheduler, SchedulerState};
pub use services::{AuditLog, PublishingSession, TopicStore};
pub use workflow::{PostCtx, PostFlow, UnitOutcome};
