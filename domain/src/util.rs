//! Shared utility functions.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Pull a JSON value out of model output text.
///
/// Tries, in order:
/// 1. ` ```json ` (or bare ` ``` `) fenced blocks
/// 2. the whole text as JSON
/// 3. the outermost `{ ... }` span
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    let mut in_block = false;
    let mut block = String::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```json" || trimmed == "```") {
            in_block = true;
            block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(parsed) = serde_json::from_str(&block) {
                return Some(parsed);
            }
        } else if in_block {
            block.push_str(line);
            block.push('\n');
        }
    }

    if let Ok(parsed) = serde_json::from_str(text.trim()) {
        return Some(parsed);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn truncate_no_op_when_short() {
        assert_eq!(truncate_str("hi", 10), "hi");
    }

    #[test]
    fn truncate_multibyte_boundary() {
        // 'の' is 3 bytes (U+306E): bytes 0xe3 0x81 0xae
        let s = "あのね"; // 9 bytes: 3+3+3
        // Cutting at byte 4 would land inside 'の', should back up to 3
        assert_eq!(truncate_str(s, 4), "あ");
        assert_eq!(truncate_str(s, 6), "あの");
    }

    #[test]
    fn truncate_exact_boundary() {
        let s = "あのね";
        assert_eq!(truncate_str(s, 9), "あのね");
        assert_eq!(truncate_str(s, 3), "あ");
    }

    #[test]
    fn truncate_empty() {
        assert_eq!(truncate_str("", 10), "");
    }

    #[test]
    fn extract_json_from_fenced_block() {
        let text = "Here you go:\n```json\n{\"passed\": true}\n```\nDone.";
        assert_eq!(extract_json(text).unwrap()["passed"], true);
    }

    #[test]
    fn extract_json_raw_and_embedded() {
        assert_eq!(extract_json(" [1, 2] ").unwrap()[1], 2);
        let text = "Result: {\"reason\": \"ok\"} -- end";
        assert_eq!(extract_json(text).unwrap()["reason"], "ok");
    }

    #[test]
    fn extract_json_none_for_prose() {
        assert!(extract_json("The borrower qualifies.").is_none());
        assert!(extract_json("} backwards {").is_none());
    }
}
