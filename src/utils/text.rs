/// 按字符截断到恰好 `max_chars` 个字符；未超长时原样返回
///
/// 多次调用结果不变。
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// 截断长文本用于日志显示
pub fn preview(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        truncate_chars(text, max_len) + "..."
    } else {
        text.to_string()
    }
}

/// 把多行文本压成一行
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
