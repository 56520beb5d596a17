use std::fmt::Display;

use crate::utils::text::single_line;

/// 话题：一个用于生成帖子的简短主题
///
/// 唯一性以大小写折叠后的文本为准。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    text: String,
}

impl Topic {
    /// 从原始文本创建话题；空文本返回 None
    ///
    /// 内部的换行与连续空白折叠成单个空格，话题文件里一行永远对应一个话题。
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let text = single_line(text.as_ref());
        if text.is_empty() {
            None
        } else {
            Some(Self { text })
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 去重用的键
    pub fn key(&self) -> String {
        fold_key(&self.text)
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// 大小写折叠
pub fn fold_key(text: &str) -> String {
    single_line(text).to_lowercase()
}
