use super::FieldType;
use crate::definition::FieldDefinition;
use crate::html::escape_attr;

pub struct HiddenField;

impl FieldType for HiddenField {
    fn input(&self, definition: &FieldDefinition) -> String {
        format!(
            "<input type=\"hidden\" name=\"{}\" id=\"{}\" value=\"{}\"/>",
            escape_attr(&definition.name),
            escape_attr(&definition.id),
            escape_attr(&definition.value_string()),
        )
    }
}
