//! The per-field view derived on demand from a schema node, a group path
//! and the currently bound value. Nothing here is cached across binds; a
//! definition is recomputed for every lookup.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::data::value_to_string;
use crate::fields::FieldType;
use crate::html::{escape_attr, escape_text};
use crate::i18n::Translate;
use crate::registry::TypeRegistry;
use crate::schema::{FieldNode, SchemaNode};

static AUTO_NAME_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique placeholder name for layout elements (such as
/// spacers) that carry no `name` attribute.
fn auto_name() -> String {
    format!("__field{}", AUTO_NAME_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    pub node: FieldNode,
    pub group: Option<String>,
    pub id: String,
    pub name: String,
    pub value: Value,
}

impl FieldDefinition {
    /// Builds a definition from a field node. `value` is the caller's
    /// override or the bound value; absent both, the node's `default`
    /// attribute applies.
    pub fn new(
        node: &FieldNode,
        group: Option<&str>,
        value: Option<Value>,
        control: Option<&str>,
    ) -> Self {
        let raw_name = match node.name() {
            Some(name) => name.to_string(),
            None => auto_name(),
        };
        let value = match value.filter(|v| !v.is_null()) {
            Some(value) => value,
            None => node
                .attr("default")
                .map(|default| Value::String(default.to_string()))
                .unwrap_or(Value::Null),
        };
        Self {
            id: compute_id(control, group, node.attr("id"), &raw_name),
            name: compute_name(control, group, &raw_name, node.is_multiple()),
            node: node.clone(),
            group: group.map(str::to_string),
            value,
        }
    }

    /// The non-strict setup contract: a group node is not a field, which is
    /// reported as `None` rather than raised.
    pub fn from_schema_node(
        node: &SchemaNode,
        group: Option<&str>,
        value: Option<Value>,
        control: Option<&str>,
    ) -> Option<Self> {
        match node {
            SchemaNode::Field(field) => Some(Self::new(field, group, value, control)),
            SchemaNode::Group(bad) => {
                log::warn!("cannot set up field definition from group node {}", bad.name);
                None
            }
        }
    }

    pub fn value_string(&self) -> String {
        value_to_string(&self.value)
    }

    /// The translated display title: the `label` attribute when present,
    /// the field name otherwise. Hidden fields have no title.
    pub fn title(&self, translator: &dyn Translate) -> String {
        if self.node.is_hidden() {
            return String::new();
        }
        let key = self
            .node
            .attr("label")
            .or_else(|| self.node.name())
            .unwrap_or(&self.name);
        translator.translate(key)
    }

    /// Renders the field's `<label>` fragment. Hidden fields render
    /// nothing. A description adds the `hasTip` class plus a `title`
    /// tooltip attribute; a required field adds the `required` class and a
    /// trailing star marker.
    pub fn label(&self, translator: &dyn Translate) -> String {
        if self.node.is_hidden() {
            return String::new();
        }
        let title = self.title(translator);
        let description = self.node.attr("description").map(|d| translator.translate(d));
        let required = self.node.is_required();

        let mut class = String::new();
        if description.is_some() {
            class.push_str("hasTip");
        }
        if required {
            if !class.is_empty() {
                class.push(' ');
            }
            class.push_str("required");
        }

        let mut label = format!("<label id=\"{0}-lbl\" for=\"{0}\"", self.id);
        if !class.is_empty() {
            label.push_str(&format!(" class=\"{class}\""));
        }
        if let Some(description) = description {
            let tooltip = format!("{title}::{description}");
            label.push_str(&format!(" title=\"{}\"", escape_attr(&tooltip)));
        }
        label.push('>');
        label.push_str(&escape_text(&title));
        if required {
            label.push_str("<span class=\"star\">&#160;*</span>");
        }
        label.push_str("</label>");
        label
    }

    /// Renders the input fragment through the declared field type. An
    /// unresolvable type quietly falls back to `text`.
    pub fn input(&self, types: &TypeRegistry<dyn FieldType>) -> String {
        let declared = self.node.field_type();
        let field_type = types.create(declared).or_else(|| {
            log::warn!("field type {declared} did not resolve; falling back to text");
            types.create("text")
        });
        match field_type {
            Some(field_type) => field_type.input(self),
            None => String::new(),
        }
    }
}

/// `[control_][group_with_underscores_]id-or-name`, everything outside
/// `[A-Za-z0-9_]` mapped to `_`, sanitization artifacts trimmed from both
/// ends. Underscores the input already started with are kept, so
/// auto-generated `__field<N>` names keep their prefix.
fn compute_id(
    control: Option<&str>,
    group: Option<&str>,
    raw_id: Option<&str>,
    raw_name: &str,
) -> String {
    let mut id = String::new();
    if let Some(control) = control {
        id.push_str(control);
        id.push('_');
    }
    if let Some(group) = group.filter(|g| !g.is_empty()) {
        id.push_str(&group.replace('.', "_"));
        id.push('_');
    }
    id.push_str(raw_id.unwrap_or(raw_name));
    let prefix = &id[..id.len() - id.trim_start_matches('_').len()];
    let sanitized = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect::<String>();
    format!("{prefix}{}", sanitized.trim_matches('_'))
}

/// `control[g1][g2][name]` with a control prefix, `g1[g2][name]` without
/// one, bare `name` when ungrouped; multiple fields get a trailing `[]`.
fn compute_name(
    control: Option<&str>,
    group: Option<&str>,
    raw_name: &str,
    multiple: bool,
) -> String {
    let groups = group
        .filter(|g| !g.is_empty())
        .map(|g| g.split('.').collect::<Vec<_>>())
        .unwrap_or_default();

    let mut name = String::new();
    match control {
        Some(control) => {
            name.push_str(control);
            for segment in &groups {
                name.push_str(&format!("[{segment}]"));
            }
            name.push_str(&format!("[{raw_name}]"));
        }
        None => match groups.split_first() {
            Some((first, rest)) => {
                name.push_str(first);
                for segment in rest {
                    name.push_str(&format!("[{segment}]"));
                }
                name.push_str(&format!("[{raw_name}]"));
            }
            None => name.push_str(raw_name),
        },
    }
    if multiple {
        name.push_str("[]");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::NullTranslate;
    use serde_json::json;

    fn field(attrs: &[(&str, &str)]) -> FieldNode {
        let mut node = FieldNode::new();
        for (name, value) in attrs {
            node = node.with_attr(*name, *value);
        }
        node
    }

    #[test]
    fn id_combines_control_group_and_name() {
        let node = field(&[("name", "show-title")]);
        let def = FieldDefinition::new(&node, Some("params.advanced"), None, Some("jform"));
        assert_eq!(def.id, "jform_params_advanced_show_title");
    }

    #[test]
    fn name_nests_group_segments_with_and_without_control() {
        let node = field(&[("name", "title")]);
        let with_control = FieldDefinition::new(&node, Some("params"), None, Some("jform"));
        assert_eq!(with_control.name, "jform[params][title]");

        let without = FieldDefinition::new(&node, Some("params.advanced"), None, None);
        assert_eq!(without.name, "params[advanced][title]");

        let bare = FieldDefinition::new(&node, None, None, None);
        assert_eq!(bare.name, "title");
    }

    #[test]
    fn multiple_appends_array_brackets() {
        let node = field(&[("name", "tags"), ("multiple", "true")]);
        let def = FieldDefinition::new(&node, None, None, Some("jform"));
        assert_eq!(def.name, "jform[tags][]");
    }

    #[test]
    fn nameless_nodes_get_distinct_auto_names() {
        let node = field(&[("type", "spacer")]);
        let first = FieldDefinition::new(&node, None, None, None);
        let second = FieldDefinition::new(&node, None, None, None);
        assert!(first.name.starts_with("__field"));
        assert_ne!(first.name, second.name);
    }

    #[test]
    fn auto_name_id_keeps_the_underscore_prefix() {
        let node = field(&[("type", "spacer")]);
        let def = FieldDefinition::new(&node, None, None, None);
        assert!(def.id.starts_with("__field"), "got {}", def.id);
        assert_eq!(def.id, def.name);
    }

    #[test]
    fn id_trims_sanitization_artifacts() {
        let node = field(&[("name", "title!")]);
        let def = FieldDefinition::new(&node, None, None, None);
        assert_eq!(def.id, "title");
    }

    #[test]
    fn default_attribute_applies_when_no_value_is_bound() {
        let node = field(&[("name", "title"), ("default", "Untitled")]);
        let def = FieldDefinition::new(&node, None, None, None);
        assert_eq!(def.value, json!("Untitled"));

        let bound = FieldDefinition::new(&node, None, Some(json!("Hello")), None);
        assert_eq!(bound.value, json!("Hello"));
    }

    #[test]
    fn label_renders_tooltip_and_required_marker() {
        let node = field(&[
            ("name", "title"),
            ("label", "Title"),
            ("description", "The title."),
            ("required", "true"),
        ]);
        let def = FieldDefinition::new(&node, None, None, None);
        assert_eq!(
            def.label(&NullTranslate),
            "<label id=\"title-lbl\" for=\"title\" class=\"hasTip required\" \
             title=\"Title::The title.\">Title<span class=\"star\">&#160;*</span></label>"
        );
    }

    #[test]
    fn label_reduces_class_combinations() {
        let plain = field(&[("name", "title"), ("label", "Title")]);
        let def = FieldDefinition::new(&plain, None, None, None);
        assert_eq!(
            def.label(&NullTranslate),
            "<label id=\"title-lbl\" for=\"title\">Title</label>"
        );

        let required = field(&[("name", "title"), ("label", "Title"), ("required", "true")]);
        let def = FieldDefinition::new(&required, None, None, None);
        assert_eq!(
            def.label(&NullTranslate),
            "<label id=\"title-lbl\" for=\"title\" class=\"required\">\
             Title<span class=\"star\">&#160;*</span></label>"
        );
    }

    #[test]
    fn hidden_fields_render_no_label_or_title() {
        let by_type = field(&[("name", "token"), ("type", "hidden")]);
        let def = FieldDefinition::new(&by_type, None, None, None);
        assert_eq!(def.label(&NullTranslate), "");
        assert_eq!(def.title(&NullTranslate), "");

        let by_attr = field(&[("name", "token"), ("hidden", "true")]);
        let def = FieldDefinition::new(&by_attr, None, None, None);
        assert_eq!(def.label(&NullTranslate), "");
    }

    #[test]
    fn title_falls_back_to_name() {
        let node = field(&[("name", "alias")]);
        let def = FieldDefinition::new(&node, None, None, None);
        assert_eq!(def.title(&NullTranslate), "alias");
    }
}
