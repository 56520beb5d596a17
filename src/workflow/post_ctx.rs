//! 发布单元上下文
//!
//! 封装"我正在处理第几轮连发的第几条"这一信息

use std::fmt::Display;

use crate::models::PostKind;

/// 发布单元上下文
#[derive(Debug, Clone, Copy)]
pub struct PostCtx {
    /// 连发轮次（仅用于日志显示）
    pub burst: u64,

    /// 本轮中的序号（从1开始）
    pub unit: u32,

    /// 本轮计划条数
    pub burst_size: u32,

    /// 选中的帖子类型
    pub kind: PostKind,
}

impl PostCtx {
    pub fn new(burst: u64, unit: u32, burst_size: u32, kind: PostKind) -> Self {
        Self {
            burst,
            unit,
            burst_size,
            kind,
        }
    }
}

impl Display for PostCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[连发 #{} 单元 {}/{} {}]",
            self.burst, self.unit, self.burst_size, self.kind
        )
    }
}
