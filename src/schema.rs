//! The in-memory schema tree mirroring a form's XML definition.
//!
//! `<fields>` containers become [`GroupNode`]s and `<field>` leaves become
//! [`FieldNode`]s. An unnamed `<fields>` container is transparent: its
//! children are hoisted into the parent at parse time, so the group path of
//! any field is exactly the dot-joined names of its group ancestors. Merge
//! and lookup operations are plain functions over this tree; nothing mutates
//! XML in place.

use std::collections::BTreeMap;

use crate::error::{FormError, FormResult};

/// One `<option>` child of a list/radio field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionNode {
    pub value: String,
    pub text: String,
}

/// A `<field>` leaf. All recognized behavior is attribute-driven; unknown
/// attributes are kept verbatim for custom field types to consume.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldNode {
    pub attributes: BTreeMap<String, String>,
    pub options: Vec<OptionNode>,
}

impl FieldNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attr_bool(&self, name: &str) -> bool {
        matches!(self.attr(name), Some(raw) if raw.eq_ignore_ascii_case("true") || raw == "1")
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name")
    }

    pub fn field_type(&self) -> &str {
        self.attr("type").unwrap_or("text")
    }

    pub fn is_hidden(&self) -> bool {
        self.field_type() == "hidden" || self.attr_bool("hidden")
    }

    pub fn is_required(&self) -> bool {
        self.attr_bool("required")
    }

    pub fn is_multiple(&self) -> bool {
        self.attr_bool("multiple")
    }
}

/// A named `<fields>` container. The parse-time root is the one group whose
/// name is empty; it never contributes to group paths.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<SchemaNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SchemaNode {
    Group(GroupNode),
    Field(FieldNode),
}

impl SchemaNode {
    pub fn as_field(&self) -> Option<&FieldNode> {
        match self {
            SchemaNode::Field(field) => Some(field),
            SchemaNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            SchemaNode::Group(group) => Some(group),
            SchemaNode::Field(_) => None,
        }
    }
}

impl GroupNode {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Direct field children, in document order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.children.iter().filter_map(SchemaNode::as_field)
    }

    /// Direct subgroup children, in document order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupNode> {
        self.children.iter().filter_map(SchemaNode::as_group)
    }

    fn field_position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(
            |child| matches!(child, SchemaNode::Field(field) if field.name() == Some(name)),
        )
    }

    fn group_position(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| matches!(child, SchemaNode::Group(group) if group.name == name))
    }
}

/// Resolves a dotted group path to the group node it names. `None` or an
/// empty path resolves to the root itself.
pub fn find_group<'a>(root: &'a GroupNode, path: Option<&str>) -> Option<&'a GroupNode> {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Some(root);
    };
    let mut current = root;
    for segment in path.split('.') {
        current = current.groups().find(|group| group.name == segment)?;
    }
    Some(current)
}

pub fn find_group_mut<'a>(root: &'a mut GroupNode, path: Option<&str>) -> Option<&'a mut GroupNode> {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Some(root);
    };
    let mut current = root;
    for segment in path.split('.') {
        let position = current.group_position(segment)?;
        current = match &mut current.children[position] {
            SchemaNode::Group(group) => group,
            SchemaNode::Field(_) => return None,
        };
    }
    Some(current)
}

/// Finds a field by name. With a group path the search is confined to that
/// group's direct children; without one the whole tree is searched depth
/// first and the earliest match wins.
pub fn find_field<'a>(
    root: &'a GroupNode,
    name: &str,
    group: Option<&str>,
) -> Option<&'a FieldNode> {
    match group {
        Some(_) => find_group(root, group)?.fields().find(|f| f.name() == Some(name)),
        None => find_field_anywhere(root, name),
    }
}

fn find_field_anywhere<'a>(group: &'a GroupNode, name: &str) -> Option<&'a FieldNode> {
    for child in &group.children {
        match child {
            SchemaNode::Field(field) if field.name() == Some(name) => return Some(field),
            SchemaNode::Field(_) => {}
            SchemaNode::Group(nested) => {
                if let Some(found) = find_field_anywhere(nested, name) {
                    return Some(found);
                }
            }
        }
    }
    None
}

pub fn find_field_mut<'a>(
    root: &'a mut GroupNode,
    name: &str,
    group: Option<&str>,
) -> Option<&'a mut FieldNode> {
    match group {
        Some(_) => {
            let group = find_group_mut(root, group)?;
            let position = group.field_position(name)?;
            match &mut group.children[position] {
                SchemaNode::Field(field) => Some(field),
                SchemaNode::Group(_) => None,
            }
        }
        None => find_field_anywhere_mut(root, name),
    }
}

fn find_field_anywhere_mut<'a>(group: &'a mut GroupNode, name: &str) -> Option<&'a mut FieldNode> {
    for child in &mut group.children {
        match child {
            SchemaNode::Field(field) if field.name() == Some(name) => return Some(field),
            SchemaNode::Field(_) => {}
            SchemaNode::Group(nested) => {
                if let Some(found) = find_field_anywhere_mut(nested, name) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Appends a node to a container, regardless of identity matches.
pub fn add_node(target: &mut GroupNode, node: SchemaNode) {
    target.children.push(node);
}

/// Removes the named field; confined to the group's direct children when a
/// group path is given, otherwise the first match anywhere in the tree.
pub fn remove_field(root: &mut GroupNode, name: &str, group: Option<&str>) -> bool {
    match group {
        Some(_) => match find_group_mut(root, group) {
            Some(group) => match group.field_position(name) {
                Some(position) => {
                    group.children.remove(position);
                    true
                }
                None => false,
            },
            None => false,
        },
        None => remove_field_anywhere(root, name),
    }
}

fn remove_field_anywhere(group: &mut GroupNode, name: &str) -> bool {
    if let Some(position) = group.field_position(name) {
        group.children.remove(position);
        return true;
    }
    for child in &mut group.children {
        if let SchemaNode::Group(nested) = child {
            if remove_field_anywhere(nested, name) {
                return true;
            }
        }
    }
    false
}

/// Removes the group a dotted path names, along with everything under it.
pub fn remove_group(root: &mut GroupNode, path: &str) -> bool {
    let Some((parent_path, leaf)) = split_group_path(path) else {
        return false;
    };
    match find_group_mut(root, parent_path) {
        Some(parent) => match parent.group_position(leaf) {
            Some(position) => {
                parent.children.remove(position);
                true
            }
            None => false,
        },
        None => false,
    }
}

fn split_group_path(path: &str) -> Option<(Option<&str>, &str)> {
    if path.is_empty() {
        return None;
    }
    match path.rsplit_once('.') {
        Some((parent, leaf)) => Some((Some(parent), leaf)),
        None => Some((None, path)),
    }
}

/// Collects the fields under a group, optionally descending into subgroups.
pub fn fields_in_group<'a>(group: &'a GroupNode, nested: bool) -> Vec<&'a FieldNode> {
    let mut collected = Vec::new();
    collect_fields(group, nested, &mut collected);
    collected
}

fn collect_fields<'a>(group: &'a GroupNode, nested: bool, into: &mut Vec<&'a FieldNode>) {
    for child in &group.children {
        match child {
            SchemaNode::Field(field) => into.push(field),
            SchemaNode::Group(sub) if nested => collect_fields(sub, nested, into),
            SchemaNode::Group(_) => {}
        }
    }
}

/// Walks every field together with its effective group path.
pub fn walk_fields<'a>(root: &'a GroupNode) -> Vec<(Option<String>, &'a FieldNode)> {
    let mut collected = Vec::new();
    walk(root, None, &mut collected);
    collected
}

fn walk<'a>(
    group: &'a GroupNode,
    path: Option<&str>,
    into: &mut Vec<(Option<String>, &'a FieldNode)>,
) {
    for child in &group.children {
        match child {
            SchemaNode::Field(field) => into.push((path.map(str::to_string), field)),
            SchemaNode::Group(sub) => {
                let sub_path = match path {
                    Some(parent) => format!("{parent}.{}", sub.name),
                    None => sub.name.clone(),
                };
                walk(sub, Some(&sub_path), into);
            }
        }
    }
}

/// Attribute merge primitive: incoming values overwrite, everything else is
/// kept.
pub fn merge_attributes(target: &mut BTreeMap<String, String>, incoming: &BTreeMap<String, String>) {
    for (name, value) in incoming {
        target.insert(name.clone(), value.clone());
    }
}

/// Merges one field into an already-present one of the same identity:
/// attributes overwrite, and an incoming option list replaces the old one
/// when it is non-empty.
pub fn merge_field(target: &mut FieldNode, incoming: &FieldNode) {
    merge_attributes(&mut target.attributes, &incoming.attributes);
    if !incoming.options.is_empty() {
        target.options = incoming.options.clone();
    }
}

/// Merges the children of `incoming` into `target`. Identity is the `name`
/// attribute: with `replace`, a matched field is merged in place (keeping
/// its original position); without it the existing field survives
/// untouched. Unmatched children append in document order. Matched groups
/// merge recursively either way.
pub fn merge_groups(target: &mut GroupNode, incoming: GroupNode, replace: bool) {
    for child in incoming.children {
        match child {
            SchemaNode::Field(field) => {
                let position = field.name().and_then(|name| target.field_position(name));
                match position {
                    Some(position) if replace => {
                        if let SchemaNode::Field(existing) = &mut target.children[position] {
                            merge_field(existing, &field);
                        }
                    }
                    Some(_) => {}
                    None => target.children.push(SchemaNode::Field(field)),
                }
            }
            SchemaNode::Group(group) => match target.group_position(&group.name) {
                Some(position) => {
                    if let SchemaNode::Group(existing) = &mut target.children[position] {
                        merge_attributes(&mut existing.attributes, &group.attributes);
                        merge_groups(existing, group, replace);
                    }
                }
                None => target.children.push(SchemaNode::Group(group)),
            },
        }
    }
}

/// What `parse` extracts from one XML document: the logical form root plus
/// any search paths the schema declared for itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedSchema {
    pub root: GroupNode,
    pub field_paths: Vec<String>,
    pub rule_paths: Vec<String>,
    pub form_paths: Vec<String>,
}

/// Parses an XML document (or fragment) into a schema tree. Any root
/// element name is accepted and treated as `form`. A selector of
/// slash-separated element names picks a nested subtree below the document
/// element as the logical root.
pub fn parse(xml: &str, selector: Option<&str>) -> FormResult<ParsedSchema> {
    let document =
        roxmltree::Document::parse(xml).map_err(|error| FormError::Parse(error.to_string()))?;
    let mut element = document.root_element();

    if let Some(selector) = selector.filter(|s| !s.is_empty()) {
        for segment in selector.split('/') {
            element = element
                .children()
                .filter(roxmltree::Node::is_element)
                .find(|child| child.has_tag_name(segment))
                .ok_or_else(|| {
                    FormError::Parse(format!("selector segment {segment} matched nothing"))
                })?;
        }
    }

    let mut parsed = ParsedSchema::default();
    collect_declared_paths(&element, &mut parsed);
    parsed.root = convert_container(&element, &mut parsed);
    Ok(parsed)
}

fn convert_container(element: &roxmltree::Node<'_, '_>, parsed: &mut ParsedSchema) -> GroupNode {
    let mut group = GroupNode {
        name: element
            .attribute("name")
            .or_else(|| element.attribute("group"))
            .unwrap_or_default()
            .to_string(),
        attributes: element
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect(),
        children: Vec::new(),
    };

    for child in element.children().filter(roxmltree::Node::is_element) {
        if child.has_tag_name("field") {
            group.children.push(SchemaNode::Field(convert_field(&child)));
        } else if child.has_tag_name("fields") {
            collect_declared_paths(&child, parsed);
            let nested = convert_container(&child, parsed);
            if nested.name.is_empty() {
                // Transparent container: hoist its children to this level.
                group.children.extend(nested.children);
            } else {
                group.children.push(SchemaNode::Group(nested));
            }
        } else {
            log::debug!("ignoring unrecognized schema element <{}>", child.tag_name().name());
        }
    }
    group
}

fn convert_field(element: &roxmltree::Node<'_, '_>) -> FieldNode {
    let mut field = FieldNode::new();
    field.attributes = element
        .attributes()
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();
    for option in element
        .children()
        .filter(roxmltree::Node::is_element)
        .filter(|child| child.has_tag_name("option"))
    {
        field.options.push(OptionNode {
            value: option.attribute("value").unwrap_or_default().to_string(),
            text: option.text().unwrap_or_default().trim().to_string(),
        });
    }
    field
}

fn collect_declared_paths(element: &roxmltree::Node<'_, '_>, parsed: &mut ParsedSchema) {
    let targets = [
        ("addfieldpath", &mut parsed.field_paths),
        ("addrulepath", &mut parsed.rule_paths),
        ("addformpath", &mut parsed.form_paths),
    ];
    for (attribute, list) in targets {
        if let Some(value) = element.attribute(attribute) {
            if !list.iter().any(|existing| existing == value) {
                list.push(value.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
        <form>
            <field name="title" type="text" required="true"/>
            <fields name="params">
                <field name="show_title" type="list">
                    <option value="0">Hide</option>
                    <option value="1">Show</option>
                </field>
                <fields name="advanced">
                    <field name="cache" type="text"/>
                </fields>
            </fields>
        </form>
    "#;

    #[test]
    fn parses_nested_groups_and_options() {
        let parsed = parse(SCHEMA, None).expect("schema should parse");
        let root = &parsed.root;
        assert_eq!(root.fields().count(), 1);

        let field = find_field(root, "show_title", Some("params")).expect("field exists");
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.options[1].value, "1");
        assert_eq!(field.options[1].text, "Show");

        assert!(find_field(root, "cache", Some("params.advanced")).is_some());
        assert!(find_field(root, "cache", Some("params")).is_none());
    }

    #[test]
    fn ungrouped_search_walks_the_whole_tree() {
        let parsed = parse(SCHEMA, None).expect("schema should parse");
        assert!(find_field(&parsed.root, "cache", None).is_some());
        assert!(find_field(&parsed.root, "nope", None).is_none());
    }

    #[test]
    fn unnamed_fields_container_is_transparent() {
        let xml = r#"
            <form>
                <fields>
                    <field name="inner"/>
                </fields>
            </form>
        "#;
        let parsed = parse(xml, None).expect("schema should parse");
        assert!(find_field(&parsed.root, "inner", None).is_some());
        assert_eq!(parsed.root.fields().count(), 1);
        assert_eq!(parsed.root.groups().count(), 0);
    }

    #[test]
    fn foreign_root_name_is_accepted() {
        let parsed = parse(r#"<metadata><field name="x"/></metadata>"#, None)
            .expect("foreign root should parse");
        assert!(find_field(&parsed.root, "x", None).is_some());
    }

    #[test]
    fn selector_picks_a_nested_subtree() {
        let xml = r#"
            <document>
                <config>
                    <form>
                        <field name="deep"/>
                    </form>
                </config>
            </document>
        "#;
        let parsed = parse(xml, Some("config/form")).expect("selector should resolve");
        assert!(find_field(&parsed.root, "deep", None).is_some());

        let miss = parse(xml, Some("config/missing"));
        assert!(matches!(miss, Err(crate::error::FormError::Parse(_))));
    }

    #[test]
    fn bad_xml_is_a_parse_error() {
        assert!(matches!(
            parse("<form><field", None),
            Err(crate::error::FormError::Parse(_))
        ));
    }

    #[test]
    fn declared_paths_are_collected() {
        let xml = r#"
            <form addfieldpath="/custom/fields">
                <fields name="params" addrulepath="/custom/rules">
                    <field name="x"/>
                </fields>
            </form>
        "#;
        let parsed = parse(xml, None).expect("schema should parse");
        assert_eq!(parsed.field_paths, vec!["/custom/fields".to_string()]);
        assert_eq!(parsed.rule_paths, vec!["/custom/rules".to_string()]);
        assert!(parsed.form_paths.is_empty());
    }

    #[test]
    fn merge_replaces_in_place_and_appends_new() {
        let mut target = parse(SCHEMA, None).expect("schema should parse").root;
        let incoming = parse(
            r#"
            <form>
                <field name="title" type="text" label="Title"/>
                <field name="alias" type="text"/>
            </form>
            "#,
            None,
        )
        .expect("schema should parse")
        .root;

        merge_groups(&mut target, incoming, true);

        let names = target
            .fields()
            .map(|f| f.name().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["title", "alias"]);
        let title = find_field(&target, "title", None).expect("title kept");
        assert_eq!(title.attr("label"), Some("Title"));
        assert_eq!(title.attr("required"), Some("true"));
    }

    #[test]
    fn merge_without_replace_preserves_existing_fields() {
        let mut target = parse(SCHEMA, None).expect("schema should parse").root;
        let incoming = parse(
            r#"<form><field name="title" label="Ignored"/></form>"#,
            None,
        )
        .expect("schema should parse")
        .root;

        merge_groups(&mut target, incoming, false);
        let title = find_field(&target, "title", None).expect("title kept");
        assert_eq!(title.attr("label"), None);
    }

    #[test]
    fn merge_recurses_into_matching_groups() {
        let mut target = parse(SCHEMA, None).expect("schema should parse").root;
        let incoming = parse(
            r#"
            <form>
                <fields name="params" description="More">
                    <field name="extra"/>
                </fields>
            </form>
            "#,
            None,
        )
        .expect("schema should parse")
        .root;

        merge_groups(&mut target, incoming, true);
        assert_eq!(target.groups().count(), 1);
        let params = find_group(&target, Some("params")).expect("params group");
        assert_eq!(params.attributes.get("description").map(String::as_str), Some("More"));
        assert!(find_field(&target, "extra", Some("params")).is_some());
        assert!(find_field(&target, "show_title", Some("params")).is_some());
    }

    #[test]
    fn walk_reports_effective_group_paths() {
        let parsed = parse(SCHEMA, None).expect("schema should parse");
        let paths = walk_fields(&parsed.root)
            .into_iter()
            .map(|(path, field)| (path, field.name().unwrap_or_default().to_string()))
            .collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![
                (None, "title".to_string()),
                (Some("params".to_string()), "show_title".to_string()),
                (Some("params.advanced".to_string()), "cache".to_string()),
            ]
        );
    }
}
