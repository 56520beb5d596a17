//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责作息调度与资源生命周期，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行、退出）
//! - 持有浏览器资源（经由发布会话）
//!
//! ### `scheduler` - 调度状态机
//! - 休眠 / 活跃时段 / 连发 三个状态
//! - 每日目标、连发数量、单元间停顿
//! - 输出运行统计
//!
//! ### `schedule_window` / `clock`
//! - 活跃时段计算与可替换的时钟
//!
//! ## 层次关系
//!
//! ```text
//! app (初始化 + Ctrl-C)
//!     ↓
//! scheduler (Sleeping / ActiveWindow / BurstPosting)
//!     ↓
//! workflow::PostFlow (处理单条帖子)
//!     ↓
//! services (能力层：topics / llm / session / audit)
//!     ↓
//! infrastructure (基础设施：Connector / Connection)
//! ```

pub mod app;
pub mod clock;
pub mod schedule_window;
pub mod scheduler;

pub use app::App;
pub use clock::{Clock, SystemClock};
pub use schedule_window::ScheduleWindow;
pub use scheduler::{RunStats, Scheduler, SchedulerServices, SchedulerSettings, SchedulerState};
