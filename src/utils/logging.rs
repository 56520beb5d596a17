//! 日志工具模块
//!
//! 提供启动、作息和连发阶段的日志输出辅助函数

use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::info;

use crate::config::Config;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    let (pause_min, pause_max) = config.pause_bounds();
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 拟人化持续发布模式");
    info!(
        "🕒 活跃时段: {:02}:00 - {:02}:00",
        config.active_start_hour, config.active_end_hour
    );
    info!(
        "🎯 每日目标区间: {}-{} | 连发区间: {}-{}",
        config.daily_goal_min, config.daily_goal_max, config.burst_min, config.burst_max
    );
    info!("⏸️ 单元间停顿: {}s-{}s", pause_min, pause_max);
    info!("{}", "=".repeat(60));
}

/// 记录新的每日目标
pub fn log_goal_set(daily_goal: u32) {
    info!("🎯 今日目标: {} 条帖子", daily_goal);
}

/// 记录进入休眠
pub fn log_sleep_until(target: NaiveDateTime, duration: Duration) {
    let secs = duration.as_secs();
    info!(
        "😴 休眠至 {} (~{}h{:02}m)",
        target.format("%Y-%m-%d %H:%M"),
        secs / 3600,
        (secs % 3600) / 60
    );
}

/// 记录连发开始
pub fn log_burst_start(burst_num: u64, size: u32, posted: u32, goal: u32) {
    info!("\n{}", "=".repeat(60));
    info!("📦 第 {} 轮连发: 计划 {} 条 (进度 {}/{})", burst_num, size, posted, goal);
    info!("{}", "=".repeat(60));
}

/// 记录连发完成
pub fn log_burst_complete(burst_num: u64, published: u32, attempted: u32, posted: u32, goal: u32) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 轮连发完成: 成功 {}/{} | 今日进度 {}/{}",
        burst_num, published, attempted, posted, goal
    );
    info!("{}", "─".repeat(60));
}
