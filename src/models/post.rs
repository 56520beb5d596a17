use std::fmt::Display;
use std::str::FromStr;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Deserialize;

use crate::utils::text::{single_line, truncate_chars};

/// 帖子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostKind {
    /// 单条帖子
    Single,
    /// 多段串帖
    Thread,
    /// 投票
    Poll,
    /// 附带链接
    Link,
    /// 推广（附带固定的推广链接）
    Promotional,
}

impl PostKind {
    pub const ALL: [PostKind; 5] = [
        PostKind::Single,
        PostKind::Thread,
        PostKind::Poll,
        PostKind::Link,
        PostKind::Promotional,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PostKind::Single => "single",
            PostKind::Thread => "thread",
            PostKind::Poll => "poll",
            PostKind::Link => "link",
            PostKind::Promotional => "promo",
        }
    }
}

impl Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 帖子类型的权重表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KindWeights {
    pub single: u32,
    pub thread: u32,
    pub poll: u32,
    pub link: u32,
    pub promo: u32,
}

impl Default for KindWeights {
    fn default() -> Self {
        Self {
            single: 55,
            thread: 20,
            poll: 10,
            link: 10,
            promo: 5,
        }
    }
}

impl KindWeights {
    pub fn weight(&self, kind: PostKind) -> u32 {
        match kind {
            PostKind::Single => self.single,
            PostKind::Thread => self.thread,
            PostKind::Poll => self.poll,
            PostKind::Link => self.link,
            PostKind::Promotional => self.promo,
        }
    }

    pub fn total(&self) -> u32 {
        PostKind::ALL.iter().map(|k| self.weight(*k)).sum()
    }

    /// 没有推广链接时推广位权重视为 0
    pub fn effective(&self, promo_enabled: bool) -> Self {
        Self {
            promo: if promo_enabled { self.promo } else { 0 },
            ..*self
        }
    }
}

/// 解析 `single=55,thread=20,poll=10,link=10,promo=5`，未出现的类型权重为 0
impl FromStr for KindWeights {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut weights = KindWeights {
            single: 0,
            thread: 0,
            poll: 0,
            link: 0,
            promo: 0,
        };
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, value) = entry
                .split_once('=')
                .ok_or_else(|| format!("权重项缺少 '=': {}", entry))?;
            let value: u32 = value
                .trim()
                .parse()
                .map_err(|_| format!("权重不是整数: {}", entry))?;
            match name.trim().to_lowercase().as_str() {
                "single" => weights.single = value,
                "thread" => weights.thread = value,
                "poll" => weights.poll = value,
                "link" => weights.link = value,
                "promo" | "promotional" => weights.promo = value,
                other => return Err(format!("未知的帖子类型: {}", other)),
            }
        }
        Ok(weights)
    }
}

/// 按权重随机选择帖子类型
#[derive(Debug, Clone)]
pub struct KindSelector {
    kinds: Vec<PostKind>,
    index: WeightedIndex<u32>,
}

impl KindSelector {
    /// 所有权重都为 0 时返回 None
    pub fn new(weights: &KindWeights, promo_enabled: bool) -> Option<Self> {
        let weights = weights.effective(promo_enabled);
        let kinds: Vec<PostKind> = PostKind::ALL
            .into_iter()
            .filter(|k| weights.weight(*k) > 0)
            .collect();
        let index = WeightedIndex::new(kinds.iter().map(|k| weights.weight(*k))).ok()?;
        Some(Self { kinds, index })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> PostKind {
        self.kinds[self.index.sample(rng)]
    }
}

/// 组装好、可以提交的帖子内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostContent {
    Single { text: String },
    Thread { parts: Vec<String> },
    Poll { question: String, options: Vec<String> },
    Link { text: String, url: String },
    Promotional { text: String, url: String },
}

impl PostContent {
    pub fn kind(&self) -> PostKind {
        match self {
            PostContent::Single { .. } => PostKind::Single,
            PostContent::Thread { .. } => PostKind::Thread,
            PostContent::Poll { .. } => PostKind::Poll,
            PostContent::Link { .. } => PostKind::Link,
            PostContent::Promotional { .. } => PostKind::Promotional,
        }
    }

    /// 把每一段输入框内容截断到平台上限
    pub fn truncated(&self, max_chars: usize) -> PostContent {
        match self {
            PostContent::Single { text } => PostContent::Single {
                text: truncate_chars(text, max_chars),
            },
            PostContent::Thread { parts } => PostContent::Thread {
                parts: parts.iter().map(|p| truncate_chars(p, max_chars)).collect(),
            },
            PostContent::Poll { question, options } => PostContent::Poll {
                question: truncate_chars(question, max_chars),
                options: options.clone(),
            },
            PostContent::Link { text, url } => match fit_with_url(text, url, max_chars) {
                Some(text) => PostContent::Link {
                    text,
                    url: url.clone(),
                },
                None => PostContent::Single {
                    text: truncate_chars(url, max_chars),
                },
            },
            PostContent::Promotional { text, url } => match fit_with_url(text, url, max_chars) {
                Some(text) => PostContent::Promotional {
                    text,
                    url: url.clone(),
                },
                None => PostContent::Single {
                    text: truncate_chars(url, max_chars),
                },
            },
        }
    }

    /// 依次填入各个输入框的文本（串帖为多段，其余为一段）
    pub fn bodies(&self) -> Vec<String> {
        match self {
            PostContent::Single { text } => vec![text.clone()],
            PostContent::Thread { parts } => parts.clone(),
            PostContent::Poll { question, .. } => vec![question.clone()],
            PostContent::Link { text, url } | PostContent::Promotional { text, url } => {
                vec![join_url(text, url)]
            }
        }
    }

    /// 审计日志里的单行表示
    pub fn audit_line(&self) -> String {
        let line = match self {
            PostContent::Thread { parts } => parts.join(" | "),
            PostContent::Poll { question, options } => {
                format!("{} [{}]", question, options.join(" / "))
            }
            other => other.bodies().join(" "),
        };
        single_line(&line)
    }
}

fn join_url(text: &str, url: &str) -> String {
    if text.is_empty() {
        url.to_string()
    } else {
        format!("{} {}", text, url)
    }
}

/// 截断正文，使 "正文 + 空格 + 链接" 不超过上限；链接本身放不下时返回 None
fn fit_with_url(text: &str, url: &str, max_chars: usize) -> Option<String> {
    let url_len = url.chars().count();
    if url_len + 1 >= max_chars {
        return None;
    }
    Some(truncate_chars(text, max_chars - url_len - 1))
}
