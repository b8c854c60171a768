use super::{FieldType, push_passthrough};
use crate::definition::FieldDefinition;
use crate::html::escape_attr;

/// Single-line text input; also the fallback for unresolved type names.
pub struct TextField;

impl FieldType for TextField {
    fn input(&self, definition: &FieldDefinition) -> String {
        let mut fragment = format!(
            "<input type=\"text\" name=\"{}\" id=\"{}\" value=\"{}\"",
            escape_attr(&definition.name),
            escape_attr(&definition.id),
            escape_attr(&definition.value_string()),
        );
        push_passthrough(&mut fragment, definition, "class");
        push_passthrough(&mut fragment, definition, "size");
        push_passthrough(&mut fragment, definition, "maxlength");
        if definition.node.attr_bool("readonly") {
            fragment.push_str(" readonly=\"readonly\"");
        }
        if definition.node.attr_bool("disabled") {
            fragment.push_str(" disabled=\"disabled\"");
        }
        fragment.push_str("/>");
        fragment
    }
}
