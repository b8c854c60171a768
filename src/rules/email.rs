use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::Rule;
use crate::data::{value_is_empty, value_to_string};
use crate::error::FormResult;
use crate::schema::FieldNode;

pub struct EmailRule;

impl Rule for EmailRule {
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
            Regex::new(r"^[\w.+-]+@[\w-]+(?:\.[\w-]+)+$")
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
    fn accepts_plain_addresses() {
        let field = FieldNode::new();
        let passed = EmailRule
            .test(&field, &json!("user@example.com"), None, None)
            .expect("no misuse");
        assert!(passed);
    }

    #[test]
    fn rejects_missing_domain_parts() {
        let field = FieldNode::new();
        for candidate in ["user", "user@", "user@example", "@example.com"] {
            let passed = EmailRule
                .test(&field, &json!(candidate), None, None)
                .expect("no misuse");
            assert!(!passed, "{candidate} should fail");
        }
    }
}
