//! Escaping and tag-stripping helpers shared by the renderers and the
//! value filters.

use std::sync::OnceLock;

use regex::Regex;

pub fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

pub fn escape_text(value: &str) -> String {
    html_escape::encode_text(value).into_owned()
}

fn script_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<script\b[^>]*/?>")
            .unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap_or_else(|_| unreachable!("static pattern")))
}

/// Removes `<script>` elements together with their content. Other markup
/// survives untouched.
pub fn strip_scripts(value: &str) -> String {
    script_block_re().replace_all(value, "").into_owned()
}

/// Removes every tag, keeping the text between them. `<script>alert();</script>`
/// becomes `alert();` since only the markup is dropped.
pub fn strip_tags(value: &str) -> String {
    tag_re().replace_all(value, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_scripts_drops_block_with_content() {
        assert_eq!(
            strip_scripts("a<script>alert(1);</script>b<p>c</p>"),
            "ab<p>c</p>"
        );
    }

    #[test]
    fn strip_tags_keeps_inner_text() {
        assert_eq!(
            strip_tags("<script>alert();</script> <p>Some text.</p>"),
            "alert(); Some text."
        );
    }

    #[test]
    fn escape_attr_encodes_quotes() {
        assert_eq!(escape_attr("a\"b"), "a&quot;b");
    }
}
