//! 生成文本的规整
//!
//! 纯函数：把 LLM 原文变成可以提交的帖子内容。
//!
//! 可用行 = 非空、不是开场白（单独的 "Sure!"、"Here's a tweet…"、以冒号结尾的引导语），
//! 并去掉行首的编号（`1.`、`2)`、`1/`、`2/5`、`-`、`•`）、标签（`Tweet:`）与成对引号。
//! 以 "Here's why…"、"Sure, …" 开头的正文不算开场白。

use std::sync::OnceLock;

use regex::Regex;

use crate::config::Config;
use crate::models::{PostContent, PostKind};
use crate::utils::text::truncate_chars;

/// 组装帖子时的长度限制
#[derive(Debug, Clone, Copy)]
pub struct ComposeLimits {
    pub max_post_chars: usize,
    pub max_thread_parts: usize,
    pub max_poll_options: usize,
    pub poll_option_chars: usize,
}

impl ComposeLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_post_chars: config.max_post_chars,
            max_thread_parts: config.max_thread_parts,
            max_poll_options: config.max_poll_options,
            poll_option_chars: config.poll_option_chars,
        }
    }
}

impl Default for ComposeLimits {
    fn default() -> Self {
        Self {
            max_post_chars: 280,
            max_thread_parts: 4,
            max_poll_options: 4,
            poll_option_chars: 25,
        }
    }
}

fn preamble_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            // 单独一行的应答："Sure!"、"Okay, here you go."
            r"(?i)^(?:(?:sure|okay|ok|certainly|of course|absolutely|bien sûr|voici)[\s,!.]*)+",
            r"(?:here (?:you go|it is)[\s,!.]*)?$",
            // 介绍自己产出的内容："Here's a tweet about…"、"Sure! Here are three posts"
            r"|^(?:(?:sure|okay|ok|certainly|of course|absolutely)[\s,!.]+)?",
            r"here(?:['’]s| is| are)\s+(?:(?:a|an|the|your|some|my|one|two|three|four|five|\d+)\s+)?",
            r"(?:[\w-]+\s+){0,3}?(?:tweets?|posts?|threads?|polls?|questions?|topics?|ideas?|options?|drafts?|versions?)\b",
            r"|^here (?:you go|it is)\b",
            r"|^as an ai\b",
        ))
        .expect("preamble regex")
    })
}

fn enumeration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[-*•–]\s+|\(\d{1,2}\)\s*|\d{1,2}\s*[.):]\s+)")
            .expect("enumeration regex")
    })
}

/// 串帖编号 `1/`、`2/5`
fn thread_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})?\s+").expect("thread marker regex")
    })
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(tweet|post|question|option\s*\d*|topic)\s*\d*\s*[:\-]\s+")
            .expect("label regex")
    })
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s<>"'\)\]]+"#).expect("url regex"))
}

/// 规整一行；不可用时返回 None
pub fn clean_line(line: &str) -> Option<String> {
    let line = line.trim().trim_matches('*').trim();
    if line.is_empty() {
        return None;
    }
    let line = strip_enumeration(line);
    let line = label_re().replace(line.trim(), "");
    let line = strip_quotes(line.trim().trim_matches('*').trim());

    if line.is_empty() || is_preamble(line) {
        return None;
    }
    Some(line.to_string())
}

fn strip_enumeration(line: &str) -> &str {
    if let Some(m) = enumeration_re().find(line) {
        return &line[m.end()..];
    }
    let Some(caps) = thread_marker_re().captures(line) else {
        return line;
    };
    let rest = &line[caps[0].len()..];
    // `N/M` 要求 1 <= N <= M，且后面不是小写单词
    let is_marker = match caps.get(2) {
        None => true,
        Some(total) => {
            let index: u32 = caps[1].parse().unwrap_or(0);
            let total: u32 = total.as_str().parse().unwrap_or(0);
            (1..=total).contains(&index) && !rest.starts_with(char::is_lowercase)
        }
    };
    if is_marker {
        rest
    } else {
        line
    }
}

fn is_preamble(line: &str) -> bool {
    preamble_re().is_match(line) || line.ends_with(':')
}

fn strip_quotes(line: &str) -> &str {
    for (open, close) in [('"', '"'), ('“', '”'), ('\'', '\''), ('«', '»')] {
        if line.chars().count() >= 2 && line.starts_with(open) && line.ends_with(close) {
            let inner = &line[open.len_utf8()..line.len() - close.len_utf8()];
            return inner.trim();
        }
    }
    line
}

/// 所有可用行
pub fn usable_lines(raw: &str) -> Vec<String> {
    raw.lines().filter_map(clean_line).collect()
}

/// 第一条可用行
pub fn normalize_generated(raw: &str) -> Option<String> {
    raw.lines().find_map(clean_line)
}

/// 规整一个候选话题
pub fn clean_candidate(candidate: &str) -> Option<String> {
    clean_line(candidate)
}

/// 文本中的第一个 http(s) 链接
pub fn extract_url(raw: &str) -> Option<String> {
    url_re()
        .find(raw)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', '!', '?']).to_string())
}

/// 按帖子类型把原文组装成帖子
///
/// 串帖/投票/链接的原文不够用时退化为单条帖子；没有任何可用文本时返回 None。
pub fn compose(
    kind: PostKind,
    raw: &str,
    limits: &ComposeLimits,
    promo_url: Option<&str>,
) -> Option<PostContent> {
    let max = limits.max_post_chars;
    let single = |raw: &str| {
        normalize_generated(raw).map(|text| PostContent::Single {
            text: truncate_chars(&text, max),
        })
    };

    let post = match kind {
        PostKind::Single => single(raw)?,
        PostKind::Thread => {
            let parts: Vec<String> = usable_lines(raw)
                .into_iter()
                .take(limits.max_thread_parts)
                .map(|p| truncate_chars(&p, max))
                .collect();
            if parts.len() < 2 {
                single(raw)?
            } else {
                PostContent::Thread { parts }
            }
        }
        PostKind::Poll => {
            let mut lines = usable_lines(raw).into_iter();
            let question = lines.next()?;
            let options: Vec<String> = lines
                .take(limits.max_poll_options)
                .map(|o| truncate_chars(&o, limits.poll_option_chars))
                .collect();
            if options.len() < 2 {
                PostContent::Single {
                    text: truncate_chars(&question, max),
                }
            } else {
                PostContent::Poll {
                    question: truncate_chars(&question, max),
                    options,
                }
            }
        }
        PostKind::Link => match extract_url(raw) {
            Some(url) => {
                let without_urls = url_re().replace_all(raw, "");
                let text = without_urls
                    .lines()
                    .map(|line| line.trim_end_matches([' ', '.', ':', ',', ';', '-']))
                    .find_map(clean_line)
                    .unwrap_or_default();
                PostContent::Link { text, url }.truncated(max)
            }
            None => single(raw)?,
        },
        PostKind::Promotional => {
            let text = normalize_generated(raw)?;
            match promo_url {
                Some(url) => PostContent::Promotional {
                    text,
                    url: url.to_string(),
                }
                .truncated(max),
                None => PostContent::Single {
                    text: truncate_chars(&text, max),
                },
            }
        }
    };
    Some(post)
}
