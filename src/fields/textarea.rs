use super::{FieldType, push_passthrough};
use crate::definition::FieldDefinition;
use crate::html::{escape_attr, escape_text};

pub struct TextareaField;

impl FieldType for TextareaField {
    fn input(&self, definition: &FieldDefinition) -> String {
        let mut fragment = format!(
            "<textarea name=\"{}\" id=\"{}\"",
            escape_attr(&definition.name),
            escape_attr(&definition.id),
        );
        push_passthrough(&mut fragment, definition, "rows");
        push_passthrough(&mut fragment, definition, "cols");
        push_passthrough(&mut fragment, definition, "class");
        fragment.push('>');
        fragment.push_str(&escape_text(&definition.value_string()));
        fragment.push_str("</textarea>");
        fragment
    }
}
