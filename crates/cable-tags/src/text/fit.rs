//! Fitting strings into a fixed text box
//!
//! Two policies share one wrapping routine:
//! - adaptive: search the font size downward until the block fits
//! - fixed: keep the caller's size, only wrap and truncate
//!
//! Neither policy fails on long text. When nothing fits, the block is
//! truncated at the smallest allowed size and flagged as overflowed.

use super::TextMeasure;
use crate::options::SizeRange;

/// Tolerance for float comparisons against budgets (points)
const FIT_EPSILON: f32 = 1e-3;

/// Font size decrement per adaptive step (points)
const SIZE_STEP_PT: f32 = 1.0;

/// Horizontal and vertical budget for one text field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    pub max_width_pt: f32,
    pub max_height_pt: f32,
    pub max_lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitPolicy {
    Adaptive(SizeRange),
    Fixed(f32),
}

/// Wrapped, sized lines ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
    /// Lines were dropped to respect the line or height budget
    pub overflowed: bool,
}

impl TextBlock {
    pub fn height_pt(&self) -> f32 {
        self.lines.len() as f32 * self.line_height_pt
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Fit a single string
pub fn fit_text(
    text: &str,
    bounds: &TextBox,
    policy: FitPolicy,
    line_spacing: f32,
    measure: &dyn TextMeasure,
) -> TextBlock {
    fit_segments(&[text], bounds, policy, line_spacing, measure)
}

/// Fit pre-split segments; each segment starts on a new line and is wrapped on its own
pub fn fit_segments(
    segments: &[&str],
    bounds: &TextBox,
    policy: FitPolicy,
    line_spacing: f32,
    measure: &dyn TextMeasure,
) -> TextBlock {
    match policy {
        FitPolicy::Fixed(size) => {
            let lines = wrap_segments(segments, bounds.max_width_pt, size, measure);
            truncate_to_budget(lines, size, bounds, line_spacing)
        }
        FitPolicy::Adaptive(range) => {
            let mut size = range.max_pt;
            loop {
                let lines = wrap_segments(segments, bounds.max_width_pt, size, measure);
                if fits(&lines, size, bounds, line_spacing) {
                    return TextBlock {
                        lines,
                        font_size_pt: size,
                        line_height_pt: size * line_spacing,
                        overflowed: false,
                    };
                }
                if size <= range.min_pt {
                    return truncate_to_budget(lines, size, bounds, line_spacing);
                }
                size = (size - SIZE_STEP_PT).max(range.min_pt);
            }
        }
    }
}

fn fits(lines: &[String], size: f32, bounds: &TextBox, line_spacing: f32) -> bool {
    lines.len() <= bounds.max_lines
        && lines.len() as f32 * size * line_spacing <= bounds.max_height_pt + FIT_EPSILON
}

fn truncate_to_budget(
    mut lines: Vec<String>,
    size: f32,
    bounds: &TextBox,
    line_spacing: f32,
) -> TextBlock {
    let line_height = size * line_spacing;
    let by_height = ((bounds.max_height_pt + FIT_EPSILON) / line_height).floor() as usize;
    // Always keep one line so a field never disappears entirely
    let allowed = bounds.max_lines.min(by_height).max(1);

    let overflowed = lines.len() > allowed;
    lines.truncate(allowed);

    TextBlock {
        lines,
        font_size_pt: size,
        line_height_pt: line_height,
        overflowed,
    }
}

fn wrap_segments(
    segments: &[&str],
    max_width_pt: f32,
    size: f32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    segments
        .iter()
        .flat_map(|segment| wrap_text(segment, max_width_pt, size, measure))
        .collect()
}

/// Greedy word wrap; a word wider than the budget is split between characters
pub fn wrap_text(
    text: &str,
    max_width_pt: f32,
    size: f32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() {
            let candidate = format!("{} {}", current, word);
            if measure.text_width_pt(&candidate, size) <= max_width_pt + FIT_EPSILON {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        if measure.text_width_pt(word, size) <= max_width_pt + FIT_EPSILON {
            current = word.to_string();
        } else {
            let mut pieces = split_word(word, max_width_pt, size, measure);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Split at character level; every piece holds at least one character
fn split_word(word: &str, max_width_pt: f32, size: f32, measure: &dyn TextMeasure) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();

    for ch in word.chars() {
        piece.push(ch);
        if piece.chars().count() > 1
            && measure.text_width_pt(&piece, size) > max_width_pt + FIT_EPSILON
        {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }

    if !piece.is_empty() {
        pieces.push(piece);
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ApproxMeasure;

    /// Every char is exactly `size` points wide
    struct MonoMeasure;

    impl TextMeasure for MonoMeasure {
        fn text_width_pt(&self, text: &str, size: f32) -> f32 {
            text.chars().count() as f32 * size
        }
    }

    fn text_box(max_width_pt: f32, max_height_pt: f32, max_lines: usize) -> TextBox {
        TextBox {
            max_width_pt,
            max_height_pt,
            max_lines,
        }
    }

    #[test]
    fn test_wrap_at_word_boundaries() {
        let lines = wrap_text("aa bb cc", 50.0, 10.0, &MonoMeasure);
        assert_eq!(lines, vec!["aa bb", "cc"]);
    }

    #[test]
    fn test_long_word_hard_split() {
        let lines = wrap_text("abcdefgh", 30.0, 10.0, &MonoMeasure);
        assert_eq!(lines, vec!["abc", "def", "gh"]);
        for line in &lines {
            assert!(MonoMeasure.text_width_pt(line, 10.0) <= 30.0);
        }
    }

    #[test]
    fn test_long_word_after_short_word() {
        let lines = wrap_text("a bcdefg", 30.0, 10.0, &MonoMeasure);
        assert_eq!(lines, vec!["a", "bcd", "efg"]);
    }

    #[test]
    fn test_wrap_empty_and_blank() {
        assert!(wrap_text("", 30.0, 10.0, &MonoMeasure).is_empty());
        assert!(wrap_text("   ", 30.0, 10.0, &MonoMeasure).is_empty());
    }

    #[test]
    fn test_adaptive_starts_at_largest_size() {
        let block = fit_text(
            "SYS1",
            &text_box(100.0, 50.0, 2),
            FitPolicy::Adaptive(SizeRange::new(10.0, 18.0)),
            1.2,
            &MonoMeasure,
        );
        assert_eq!(block.font_size_pt, 18.0);
        assert_eq!(block.lines, vec!["SYS1"]);
        assert!(!block.overflowed);
    }

    #[test]
    fn test_adaptive_shrinks_until_single_line_fits() {
        // 8 chars need size <= 12.5 to fit 100pt on one line; 2 lines at 14+ exceed height 30
        let block = fit_text(
            "ABCDEFGH",
            &text_box(100.0, 30.0, 2),
            FitPolicy::Adaptive(SizeRange::new(8.0, 18.0)),
            1.2,
            &MonoMeasure,
        );
        assert_eq!(block.font_size_pt, 12.0);
        assert_eq!(block.lines, vec!["ABCDEFGH"]);
    }

    #[test]
    fn test_adaptive_never_below_minimum_and_truncates() {
        let text = "word ".repeat(40);
        let bounds = text_box(40.0, 100.0, 3);
        let block = fit_text(
            &text,
            &bounds,
            FitPolicy::Adaptive(SizeRange::new(10.0, 16.0)),
            1.2,
            &MonoMeasure,
        );
        assert_eq!(block.font_size_pt, 10.0);
        assert_eq!(block.lines.len(), 3);
        assert!(block.overflowed);
    }

    #[test]
    fn test_adaptive_respects_height_budget_at_minimum() {
        let text = "aa bb cc dd ee";
        // Height fits only one line of 12 * 1.2
        let block = fit_text(
            text,
            &text_box(20.0, 15.0, 3),
            FitPolicy::Adaptive(SizeRange::new(10.0, 12.0)),
            1.2,
            &MonoMeasure,
        );
        assert_eq!(block.font_size_pt, 10.0);
        assert_eq!(block.lines.len(), 1);
        assert!(block.height_pt() <= 15.0);
    }

    #[test]
    fn test_fixed_keeps_size_and_truncates_lines() {
        let block = fit_text(
            "one two three four",
            &text_box(50.0, 100.0, 2),
            FitPolicy::Fixed(10.0),
            1.2,
            &MonoMeasure,
        );
        assert_eq!(block.font_size_pt, 10.0);
        assert_eq!(block.lines, vec!["one", "two"]);
        assert!(block.overflowed);
    }

    #[test]
    fn test_fixed_keeps_one_line_when_height_is_tiny() {
        let block = fit_text(
            "L=120 м",
            &text_box(200.0, 5.0, 2),
            FitPolicy::Fixed(14.0),
            1.2,
            &ApproxMeasure,
        );
        assert_eq!(block.lines, vec!["L=120 м"]);
    }

    #[test]
    fn test_segments_start_new_lines() {
        let block = fit_segments(
            &["ParLan", "4x2x0,57"],
            &text_box(200.0, 100.0, 3),
            FitPolicy::Adaptive(SizeRange::new(10.0, 16.0)),
            1.2,
            &ApproxMeasure,
        );
        assert_eq!(block.lines, vec!["ParLan", "4x2x0,57"]);
        assert_eq!(block.font_size_pt, 16.0);
    }

    #[test]
    fn test_empty_segments_produce_no_lines() {
        let block = fit_segments(
            &["", ""],
            &text_box(100.0, 100.0, 3),
            FitPolicy::Adaptive(SizeRange::new(10.0, 16.0)),
            1.2,
            &ApproxMeasure,
        );
        assert!(block.is_empty());
        assert!(!block.overflowed);
    }

    #[test]
    fn test_fit_invariants_hold_for_varied_inputs() {
        let inputs = [
            "",
            "A",
            "ВРУ-1 ЩР-2",
            "ParLan 4x2x0,57",
            "KVVGng-LS 4x1,5 very long cable spec with many tokens",
            "Superlongsinglewordwithoutanyspaces",
        ];
        let bounds = text_box(80.0, 40.0, 2);
        let range = SizeRange::new(8.0, 18.0);

        for input in inputs {
            let block = fit_text(input, &bounds, FitPolicy::Adaptive(range), 1.2, &ApproxMeasure);
            assert!(block.lines.len() <= bounds.max_lines, "{input}");
            assert!(block.font_size_pt >= range.min_pt, "{input}");
            assert!(block.font_size_pt <= range.max_pt, "{input}");
        }
    }
}
