//! Built-in field types. Each type renders the input fragment for one kind
//! of form control; the registry resolves a field's declared `type` name to
//! one of these (or to a caller-registered custom type).

mod checkbox;
mod hidden;
mod list;
mod radio;
mod spacer;
mod text;
mod textarea;

pub use checkbox::CheckboxField;
pub use hidden::HiddenField;
pub use list::ListField;
pub use radio::RadioField;
pub use spacer::SpacerField;
pub use text::TextField;
pub use textarea::TextareaField;

use crate::definition::FieldDefinition;
use crate::registry::TypeRegistry;

pub trait FieldType: Send + Sync {
    /// Renders the `<input>`/`<select>`/… fragment for one field.
    fn input(&self, definition: &FieldDefinition) -> String;
}

impl TypeRegistry<dyn FieldType> {
    /// A registry pre-populated with every built-in field type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("text", || Box::new(TextField));
        registry.register("hidden", || Box::new(HiddenField));
        registry.register("list", || Box::new(ListField));
        registry.register("radio", || Box::new(RadioField));
        registry.register("checkbox", || Box::new(CheckboxField));
        registry.register("textarea", || Box::new(TextareaField));
        registry.register("spacer", || Box::new(SpacerField));
        registry
    }
}

/// Whether an option value counts as selected for the bound value: a bound
/// array selects each of its members, a scalar selects its string form.
pub(crate) fn is_selected(definition: &FieldDefinition, option_value: &str) -> bool {
    match &definition.value {
        serde_json::Value::Array(items) => items
            .iter()
            .any(|item| crate::data::value_to_string(item) == option_value),
        other => crate::data::value_to_string(other) == option_value,
    }
}

/// Appends ` name="value"` when the schema node carries the attribute.
pub(crate) fn push_passthrough(fragment: &mut String, definition: &FieldDefinition, attr: &str) {
    if let Some(value) = definition.node.attr(attr) {
        fragment.push_str(&format!(" {attr}=\"{}\"", crate::html::escape_attr(value)));
    }
}

#[cfg(test)]
pub(crate) fn definition_for_test(
    attrs: &[(&str, &str)],
    options: &[(&str, &str)],
    value: Option<serde_json::Value>,
) -> FieldDefinition {
    let mut node = crate::schema::FieldNode::new();
    for (name, attr_value) in attrs {
        node = node.with_attr(*name, *attr_value);
    }
    for (option_value, text) in options {
        node.options.push(crate::schema::OptionNode {
            value: (*option_value).to_string(),
            text: (*text).to_string(),
        });
    }
    FieldDefinition::new(&node, None, value, None)
}
