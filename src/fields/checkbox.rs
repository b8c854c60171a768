use super::FieldType;
use crate::definition::FieldDefinition;
use crate::html::escape_attr;

/// Single checkbox. The submitted value comes from the `value` attribute
/// (default `1`); the box is checked when the bound value matches it.
pub struct CheckboxField;

impl FieldType for CheckboxField {
    fn input(&self, definition: &FieldDefinition) -> String {
        let submit_value = definition.node.attr("value").unwrap_or("1");
        let mut fragment = format!(
            "<input type=\"checkbox\" name=\"{}\" id=\"{}\" value=\"{}\"",
            escape_attr(&definition.name),
            escape_attr(&definition.id),
            escape_attr(submit_value),
        );
        let bound = definition.value_string();
        if !bound.is_empty() && bound == submit_value {
            fragment.push_str(" checked=\"checked\"");
        }
        fragment.push_str("/>");
        fragment
    }
}
