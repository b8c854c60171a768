use super::{FieldType, is_selected, push_passthrough};
use crate::definition::FieldDefinition;
use crate::html::{escape_attr, escape_text};

/// Drop-down select built from the field's `<option>` children.
pub struct ListField;

impl FieldType for ListField {
    fn input(&self, definition: &FieldDefinition) -> String {
        let mut fragment = format!(
            "<select name=\"{}\" id=\"{}\"",
            escape_attr(&definition.name),
            escape_attr(&definition.id),
        );
        push_passthrough(&mut fragment, definition, "class");
        if definition.node.is_multiple() {
            fragment.push_str(" multiple=\"multiple\"");
        }
        fragment.push('>');
        for option in &definition.node.options {
            fragment.push_str(&format!("<option value=\"{}\"", escape_attr(&option.value)));
            if is_selected(definition, &option.value) {
                fragment.push_str(" selected=\"selected\"");
            }
            fragment.push('>');
            fragment.push_str(&escape_text(&option.text));
            fragment.push_str("</option>");
        }
        fragment.push_str("</select>");
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::super::definition_for_test;
    use super::*;
    use serde_json::json;

    #[test]
    fn marks_the_bound_option_selected() {
        let definition = definition_for_test(
            &[("name", "show_title"), ("type", "list")],
            &[("0", "Hide"), ("1", "Show")],
            Some(json!("1")),
        );
        assert_eq!(
            ListField.input(&definition),
            "<select name=\"show_title\" id=\"show_title\">\
             <option value=\"0\">Hide</option>\
             <option value=\"1\" selected=\"selected\">Show</option>\
             </select>"
        );
    }

    #[test]
    fn multiple_selects_each_bound_member() {
        let definition = definition_for_test(
            &[("name", "tags"), ("type", "list"), ("multiple", "true")],
            &[("a", "A"), ("b", "B"), ("c", "C")],
            Some(json!(["a", "c"])),
        );
        let fragment = ListField.input(&definition);
        assert!(fragment.contains("name=\"tags[]\""));
        assert!(fragment.contains("multiple=\"multiple\""));
        assert!(fragment.contains("<option value=\"a\" selected=\"selected\">A</option>"));
        assert!(fragment.contains("<option value=\"b\">B</option>"));
        assert!(fragment.contains("<option value=\"c\" selected=\"selected\">C</option>"));
    }
}
