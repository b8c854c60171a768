use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::Rule;
use crate::data::{value_is_empty, value_to_string};
use crate::error::FormResult;
use crate::schema::FieldNode;

pub struct BooleanRule;

impl Rule for BooleanRule {
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
            Regex::new(r"^(?i:[01]|true|false)$").unwrap_or_else(|_| unreachable!("static pattern"))
        });
        Ok(re.is_match(&value_to_string(value)))
    }
}
