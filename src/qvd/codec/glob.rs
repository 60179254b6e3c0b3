//! Wildcard pattern translation.
//!
//! `*` matches any run of characters (including none) and `?` matches exactly
//! one character. With escaping enabled a backslash makes the following `*`,
//! `?` or `\` literal; a backslash before any other character, or at the end
//! of the pattern, is itself literal.

/// Translates a wildcard pattern into regex syntax anchored to the whole text.
pub fn to_regex(pattern: &str, escape: bool) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str(r"(?s)\A");

    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if escape => match chars.peek() {
                Some(&next @ ('*' | '?' | '\\')) => {
                    literal.push(next);
                    chars.next();
                }
                _ => literal.push('\\'),
            },
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push_str(r"\z");
    out
}
