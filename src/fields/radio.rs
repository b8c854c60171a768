use super::{FieldType, is_selected};
use crate::definition::FieldDefinition;
use crate::html::{escape_attr, escape_text};

/// Radio group rendered as a `<fieldset>` of input/label pairs; each input
/// id is the field id with the option index appended.
pub struct RadioField;

impl FieldType for RadioField {
    fn input(&self, definition: &FieldDefinition) -> String {
        let id = escape_attr(&definition.id);
        let name = escape_attr(&definition.name);
        let mut fragment = format!("<fieldset id=\"{id}\" class=\"radio\">");
        for (index, option) in definition.node.options.iter().enumerate() {
            let option_id = format!("{id}{index}");
            fragment.push_str(&format!(
                "<input type=\"radio\" id=\"{option_id}\" name=\"{name}\" value=\"{}\"",
                escape_attr(&option.value)
            ));
            if is_selected(definition, &option.value) {
                fragment.push_str(" checked=\"checked\"");
            }
            fragment.push_str("/>");
            fragment.push_str(&format!(
                "<label for=\"{option_id}\">{}</label>",
                escape_text(&option.text)
            ));
        }
        fragment.push_str("</fieldset>");
        fragment
    }
}
