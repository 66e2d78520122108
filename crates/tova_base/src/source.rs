//! Source text normalization.
//!
//! The rest of the compiler assumes `\n` line endings and byte offsets into
//! the normalized text, so normalization must happen exactly once, before
//! lexing.

/// Collapses `\r\n` and lone `\r` to `\n`.
///
/// Returns the input unchanged (no allocation beyond the `String`) when it
/// contains no carriage returns.
pub fn normalize_newlines(source: &str) -> String {
    if !source.contains('\r') {
        return source.to_string();
    }
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_unix_endings() {
        assert_eq!(normalize_newlines("a\nb\n"), "a\nb\n");
    }

    #[test]
    fn collapses_crlf() {
        assert_eq!(normalize_newlines("a\r\nb\r\n"), "a\nb\n");
    }

    #[test]
    fn collapses_bare_cr() {
        assert_eq!(normalize_newlines("a\rb"), "a\nb");
    }

    #[test]
    fn mixed_endings_become_lf() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }
}
