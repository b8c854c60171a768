use super::FieldType;
use crate::definition::FieldDefinition;

/// Layout-only element with no submitted value; the usual case for
/// auto-generated field names.
pub struct SpacerField;

impl FieldType for SpacerField {
    fn input(&self, definition: &FieldDefinition) -> String {
        if definition.node.attr_bool("hr") {
            "<hr/>".to_string()
        } else {
            "<span class=\"spacer\">&#160;</span>".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::definition_for_test;
    use super::*;

    #[test]
    fn renders_rule_or_blank_span() {
        let rule = definition_for_test(&[("type", "spacer"), ("hr", "true")], &[], None);
        assert_eq!(SpacerField.input(&rule), "<hr/>");

        let blank = definition_for_test(&[("type", "spacer")], &[], None);
        assert_eq!(SpacerField.input(&blank), "<span class=\"spacer\">&#160;</span>");
    }
}
