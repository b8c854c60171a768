use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::Rule;
use crate::data::{value_is_empty, value_to_string};
use crate::error::FormResult;
use crate::schema::FieldNode;

/// Absolute URL with an explicit scheme. The `schemes` attribute narrows
/// the accepted scheme list (comma separated); the default accepts the
/// common web schemes.
pub struct UrlRule;

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*)://\S+$")
            .unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

const DEFAULT_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

impl Rule for UrlRule {
    fn test(
        &self,
        field: &FieldNode,
        value: &Value,
        _group: Option<&str>,
        _input: Option<&Value>,
    ) -> FormResult<bool> {
        if value_is_empty(value) {
            return Ok(true);
        }
        let text = value_to_string(value);
        let Some(captures) = url_re().captures(text.trim()) else {
            return Ok(false);
        };
        let scheme = captures[1].to_ascii_lowercase();
        let passed = match field.attr("schemes") {
            Some(allowed) => allowed
                .split(',')
                .map(str::trim)
                .any(|candidate| candidate.eq_ignore_ascii_case(&scheme)),
            None => DEFAULT_SCHEMES.contains(&scheme.as_str()),
        };
        Ok(passed)
    }
}
