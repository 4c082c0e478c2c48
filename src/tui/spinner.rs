const DOT_FRAMES: &[char] = &['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

pub fn frame(idx: usize) -> char {
    DOT_FRAMES[idx % DOT_FRAMES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SPINNER_FRAME_COUNT;

    #[test]
    fn braille_char_range() {
        for &ch in DOT_FRAMES {
            assert!(
                ('\u{2800}'..='\u{28FF}').contains(&ch),
                "char {ch:?} not in Braille range"
            );
        }
    }

    #[test]
    fn frame_count_matches_state() {
        assert_eq!(DOT_FRAMES.len(), SPINNER_FRAME_COUNT);
    }

    #[test]
    fn all_frames_distinct() {
        let mut seen = std::collections::HashSet::new();
        for i in 0..DOT_FRAMES.len() {
            assert!(seen.insert(frame(i)), "duplicate frame at index {i}");
        }
    }

    #[test]
    fn large_index_no_panic() {
        let _ = frame(usize::MAX);
    }
}
