//! Field-specific line split policies

/// Split a cable name into two lines.
///
/// Cable names are `<brand> <spec>` pairs: the first token goes on line
/// one, the rest on line two. A single token is cut at its middle
/// character, left half shorter for odd lengths.
pub fn split_cable_text(text: &str) -> [String; 2] {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return [String::new(), String::new()];
    }

    let mut tokens = trimmed.split_whitespace();
    let first = tokens.next().unwrap_or_default();
    let rest: Vec<&str> = tokens.collect();

    if rest.is_empty() {
        let mid = first.chars().count() / 2;
        let split_at = first
            .char_indices()
            .nth(mid)
            .map(|(idx, _)| idx)
            .unwrap_or(first.len());
        let (left, right) = first.split_at(split_at);
        [left.to_string(), right.to_string()]
    } else {
        [first.to_string(), rest.join(" ")]
    }
}

/// Split a track at the first separator, dropping it; `None` if absent
pub fn split_at_separator(text: &str, separator: char) -> Option<[String; 2]> {
    text.split_once(separator)
        .map(|(left, right)| [left.trim().to_string(), right.trim().to_string()])
}

/// Render the back sub field: `L=<value> <unit>` for numeric lengths, raw text otherwise
pub fn format_length(raw: &str, unit: &str) -> String {
    let raw = raw.trim();
    if is_numeric_length(raw) {
        format!("L={} {}", raw, unit)
    } else {
        raw.to_string()
    }
}

/// Digits with at most one decimal separator (`.` or `,`)
fn is_numeric_length(raw: &str) -> bool {
    let mut digits = 0;
    let mut separators = 0;
    for ch in raw.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' | ',' => separators += 1,
            _ => return false,
        }
    }
    digits > 0 && separators <= 1
}
