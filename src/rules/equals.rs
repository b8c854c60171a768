use serde_json::Value;

use super::Rule;
use crate::data::value_at;
use crate::error::{FormError, FormResult};
use crate::schema::FieldNode;

/// Cross-field comparison: the candidate must equal the value bound to the
/// field named by the `field` attribute, resolved within the same group.
pub struct EqualsRule;

impl Rule for EqualsRule {
    fn test(
        &self,
        field: &FieldNode,
        value: &Value,
        group: Option<&str>,
        input: Option<&Value>,
    ) -> FormResult<bool> {
        let other = field.attr("field").ok_or_else(|| {
            FormError::Rule("equals rule requires a field attribute".to_string())
        })?;
        let input = input.ok_or_else(|| {
            FormError::Rule("equals rule requires the full input for comparison".to_string())
        })?;

        let path = match group.filter(|g| !g.is_empty()) {
            Some(group) => format!("{group}.{other}"),
            None => other.to_string(),
        };
        Ok(value_at(input, &path) == Some(value))
    }
}
