use crate::constants::{
    APPROX_CHAR_WIDTH_RATIO, APPROX_NARROW_GLYPH_FACTOR, APPROX_WIDE_GLYPH_FACTOR,
};

/// String width for a given font size, in points
pub trait TextMeasure {
    fn text_width_pt(&self, text: &str, font_size_pt: f32) -> f32;
}

/// Width model used when no font metrics are available.
///
/// Every glyph is `0.6 * size` wide, corrected for a handful of visibly
/// wide or narrow glyphs. Errors stay within a few percent for bold serif
/// faces on the short strings printed on tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn text_width_pt(&self, text: &str, font_size_pt: f32) -> f32 {
        text.chars()
            .map(|ch| approx_char_width_pt(ch, font_size_pt))
            .sum()
    }
}

pub fn approx_char_width_pt(ch: char, font_size_pt: f32) -> f32 {
    let base = font_size_pt * APPROX_CHAR_WIDTH_RATIO;
    if is_wide_glyph(ch) {
        base * APPROX_WIDE_GLYPH_FACTOR
    } else if is_narrow_glyph(ch) {
        base * APPROX_NARROW_GLYPH_FACTOR
    } else {
        base
    }
}

fn is_wide_glyph(ch: char) -> bool {
    matches!(
        ch,
        'M' | 'W' | 'm' | 'w' | '@' | '%' | 'М' | 'Ш' | 'Щ' | 'Ж' | 'Ю' | 'Ф' | 'Ы' | 'м' | 'ш'
            | 'щ' | 'ж' | 'ю' | 'ф' | 'ы'
    )
}

fn is_narrow_glyph(ch: char) -> bool {
    matches!(
        ch,
        'i' | 'l' | 'j' | 'I' | 'f' | 't' | 'r' | '!' | '.' | ',' | ':' | ';' | '\'' | '|' | ' '
    )
}
