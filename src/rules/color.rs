use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::Rule;
use crate::data::{value_is_empty, value_to_string};
use crate::error::FormResult;
use crate::schema::FieldNode;

/// Hex color notation: `#rgb` or `#rrggbb`.
pub struct ColorRule;

impl Rule for ColorRule {
    fn test(
        &self,
        _field: &FieldNode,
        value: &Value,
        _group: Option<&str>,
        _input: Option<&Value>,
    ) -> FormResult<bool> {
        if value_is_empty(value) {
            return Ok(true);
        }
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"^#[0-9a-fA-F]{3}(?:[0-9a-fA-F]{3})?$")
                .unwrap_or_else(|_| unreachable!("static pattern"))
        });
        Ok(re.is_match(&value_to_string(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_short_and_long_hex() {
        let field = FieldNode::new();
        assert!(ColorRule.test(&field, &json!("#fff"), None, None).expect("ok"));
        assert!(ColorRule.test(&field, &json!("#00AABB"), None, None).expect("ok"));
    }

    #[test]
    fn rejects_unhashed_or_malformed_values() {
        let field = FieldNode::new();
        for candidate in ["fff", "#ff", "#ggg", "#ffff"] {
            assert!(
                !ColorRule.test(&field, &json!(candidate), None, None).expect("ok"),
                "{candidate} should fail"
            );
        }
    }
}
