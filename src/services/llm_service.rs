//! LLM 服务 - 业务能力层
//!
//! 只负责"生成帖子原文 / 发现话题"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::models::PostKind;
use crate::services::content_generator::{ContentGenerator, GenerationRequest};

const SYSTEM_MESSAGE: &str = "You write short, punchy social media posts. \
                              Reply with the post content only: no preamble, no explanations, \
                              no hashtags, no surrounding quotes.";

/// LLM 服务
///
/// 职责：
/// - 按帖子类型构建提示词并调用 LLM
/// - 发现新话题
/// - 不挑选话题，不提交帖子
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_post_chars: usize,
    max_thread_parts: usize,
    max_poll_options: usize,
    poll_option_chars: usize,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            max_post_chars: config.max_post_chars,
            max_thread_parts: config.max_thread_parts,
            max_poll_options: config.max_poll_options,
            poll_option_chars: config.poll_option_chars,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `temperature`: 采样温度
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        temperature: f32,
    ) -> Result<String, GenerationError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let api_failed = |e: &dyn std::fmt::Display| GenerationError::ApiCallFailed {
            model: self.model_name.clone(),
            message: e.to_string(),
        };

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| api_failed(&e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| api_failed(&e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(temperature)
            .max_tokens(1024u32)
            .build()
            .map_err(|e| api_failed(&e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            api_failed(&e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyContent {
                model: self.model_name.clone(),
            });
        }

        Ok(content.trim().to_string())
    }

    /// 按帖子类型构建提示词
    fn build_post_prompt(&self, request: &GenerationRequest<'_>) -> String {
        let style = format!(
            "Write in language '{}' with a {} tone.",
            request.language, request.tone
        );
        match request.kind {
            PostKind::Single | PostKind::Promotional => format!(
                "Write one short, punchy post (under {} characters) about: '{}'. \
                 Do not include hashtags. Be direct and concise. {}",
                self.max_post_chars, request.topic, style
            ),
            PostKind::Thread => format!(
                "Write a thread of 2 to {} posts about: '{}'. \
                 Put each post on its own line, each under {} characters. \
                 Do not number the posts and do not include hashtags. {}",
                self.max_thread_parts, request.topic, self.max_post_chars, style
            ),
            PostKind::Poll => format!(
                "Write a poll about: '{}'. First line: the question (under {} characters). \
                 Then 2 to {} answer options, one per line, each under {} characters. \
                 No numbering, no extra text. {}",
                request.topic,
                self.max_post_chars,
                self.max_poll_options,
                self.poll_option_chars,
                style
            ),
            PostKind::Link => format!(
                "Write one short post (under {} characters, including the link) about: '{}' \
                 that ends with one real, relevant https:// link to a reputable source. \
                 Do not include hashtags. {}",
                self.max_post_chars, request.topic, style
            ),
        }
    }

    fn build_discovery_prompt(count: usize) -> String {
        format!(
            "You are an expert content strategist. Find {} new trending or interesting \
             discussion topics in technology, AI or programming, favouring recent news. \
             Only suggest topics that are not already widely covered. \
             Return each topic on its own line, without numbering. Always write in English.",
            count
        )
    }
}

#[async_trait]
impl ContentGenerator for LlmService {
    async fn generate_text(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<String, GenerationError> {
        let prompt = self.build_post_prompt(request);
        self.send_to_llm(&prompt, Some(SYSTEM_MESSAGE), 0.9).await
    }

    async fn discover_topics(&self, count: usize) -> Vec<String> {
        info!("🔎 开始发现新话题 (目标 {} 个)", count);
        let prompt = Self::build_discovery_prompt(count);
        match self.send_to_llm(&prompt, None, 1.0).await {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .take(count)
                .map(str::to_string)
                .collect(),
            Err(e) => {
                error!("话题发现失败: {}", e);
                Vec::new()
            }
        }
    }
}
