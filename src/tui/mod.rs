pub mod alert_overlay;
pub mod compose_overlay;
pub mod footer;
pub mod grid;
pub mod header;
pub mod log_overlay;
pub mod menu;
pub mod render;
pub mod spinner;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cuts `s` to `max_width` terminal columns, marking the cut with `…`.
pub fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for c in s.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + cw + 1 > max_width {
            if max_width > 0 {
                result.push('…');
            }
            break;
        }
        result.push(c);
        width += cw;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_unchanged() {
        assert_eq!(truncate("web", 10), "web");
    }

    #[test]
    fn truncate_exact_length_unchanged() {
        assert_eq!(truncate("abcde", 5), "abcde");
    }

    #[test]
    fn truncate_long_adds_ellipsis() {
        let result = truncate("a-very-long-project-name", 10);
        assert_eq!(result, "a-very-lo…");
        assert_eq!(UnicodeWidthStr::width(result.as_str()), 10);
    }

    #[test]
    fn truncate_zero_width() {
        assert_eq!(truncate("web", 0), "");
    }

    #[test]
    fn truncate_cjk_characters() {
        // Each CJK char is two columns wide.
        let result = truncate("日本語のプロジェクト", 7);
        assert!(UnicodeWidthStr::width(result.as_str()) <= 7);
        assert!(result.ends_with('…'));
    }
}
