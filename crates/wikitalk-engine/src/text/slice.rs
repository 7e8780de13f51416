/// Largest char boundary of `s` that is `<= index`.
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Truncates `s` to at most `max` bytes with a "..." suffix if needed.
///
/// Used for human-readable log output.
pub fn preview(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut out = s[..floor_char_boundary(s, max)].to_string();
    out.push_str("...");
    out
}
