//! Keeps model output readable in logs: one line, capped length.

use std::fmt::Write;

const MAX_PREVIEW: usize = 240;

/// Escape newlines/tabs/control characters and cut after `MAX_PREVIEW` chars.
pub fn preview(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::preview;

    #[test]
    fn flattens_and_truncates() {
        assert_eq!(preview("{\n\t\"a\": 1\n}"), "{\\n\\t\"a\": 1\\n}");

        let long = "x".repeat(1000);
        let short = preview(&long);
        assert_eq!(short.chars().count(), 241);
        assert!(short.ends_with('…'));
    }
}
