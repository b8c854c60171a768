use serde_json::Value;

use super::Rule;
use crate::data::{value_is_empty, value_to_string};
use crate::error::FormResult;
use crate::schema::FieldNode;

/// The candidate (or each member of a multiple selection) must be one of
/// the field's declared `<option>` values.
pub struct OptionsRule;

impl Rule for OptionsRule {
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
        let allowed = |candidate: &Value| {
            let text = value_to_string(candidate);
            field.options.iter().any(|option| option.value == text)
        };
        match value {
            Value::Array(items) => Ok(items.iter().all(allowed)),
            single => Ok(allowed(single)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OptionNode;
    use serde_json::json;

    fn list_field() -> FieldNode {
        let mut field = FieldNode::new().with_attr("name", "show_title");
        for value in ["0", "1"] {
            field.options.push(OptionNode {
                value: value.to_string(),
                text: value.to_string(),
            });
        }
        field
    }

    #[test]
    fn accepts_declared_options_only() {
        let field = list_field();
        assert!(OptionsRule.test(&field, &json!("1"), None, None).expect("ok"));
        assert!(!OptionsRule.test(&field, &json!("2"), None, None).expect("ok"));
    }

    #[test]
    fn multiple_selection_checks_every_member() {
        let field = list_field();
        assert!(OptionsRule.test(&field, &json!(["0", "1"]), None, None).expect("ok"));
        assert!(!OptionsRule.test(&field, &json!(["1", "9"]), None, None).expect("ok"));
    }
}
