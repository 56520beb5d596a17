//! 内容生成接口
//!
//! 生成服务是黑盒：给定话题与风格参数返回文本，或者失败。重试策略由调用方决定。

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::models::PostKind;

/// 一次生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub topic: &'a str,
    pub language: &'a str,
    pub tone: &'a str,
    pub kind: PostKind,
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// 单次请求生成帖子原文，不在内部重试
    async fn generate_text(&self, request: &GenerationRequest<'_>) -> Result<String, GenerationError>;

    /// 尽力返回至多 `count` 个候选话题；失败时返回空列表
    async fn discover_topics(&self, count: usize) -> Vec<String>;
}
