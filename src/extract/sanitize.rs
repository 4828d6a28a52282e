//! Text normalization applied to every adapter's output before it reaches
//! the index writer: CSV-hostile characters (commas, newlines, tabs) become
//! spaces, other control characters and NULs are dropped, whitespace runs
//! collapse to a single space.

/// Normalize extracted text into single-line, comma-free, control-free form.
pub fn sanitize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        match ch {
            ',' | '\n' | '\t' | ' ' => pending_space = true,
            c if c.is_control() => {}
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }
    out
}

/// Drop XML/HTML tags, keeping character data with spacing between
/// elements. Good enough for the packaged-office XML members, where the
/// interesting payload is the text nodes.
pub fn strip_tags(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 2);
    let mut in_tag = false;
    for ch in xml.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_commas_and_newlines() {
        assert_eq!(sanitize_text("hello,world\n\"quote\""), "hello world \"quote\"");
    }

    #[test]
    fn sanitize_collapses_runs_and_trims() {
        assert_eq!(sanitize_text("  a ,, b \r\n\tc  "), "a b c");
    }

    #[test]
    fn sanitize_drops_nuls() {
        assert_eq!(sanitize_text("a\0b"), "ab");
    }

    #[test]
    fn strip_tags_keeps_character_data() {
        assert_eq!(
            sanitize_text(&strip_tags("<w:p><w:t>secret plan</w:t></w:p>")),
            "secret plan"
        );
    }
}
