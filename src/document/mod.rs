//! The form document: one schema tree plus its bound data, with load/merge,
//! binding, filtering, validation and rendering entry points.


use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::data::{BoundData, value_at, value_is_empty};
use crate::definition::FieldDefinition;
use crate::error::{FormError, FormResult, ValidationFailure};
use crate::fields::FieldType;
use crate::filters::{self, FilterFn};
use crate::i18n::{NullTranslate, Translate};
use crate::paths::FormPaths;
use crate::registry::TypeRegistry;
use crate::rules::Rule;
use crate::schema::{
    self, FieldNode, GroupNode, SchemaNode, fields_in_group, find_group, merge_groups, walk_fields,
};

/// Form-level configuration, fixed at construction. `control` is the
/// optional name prefix that lets several forms with colliding field names
/// coexist on one page.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormOptions {
    pub name: String,
    pub control: Option<String>,
}

impl FormOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control: None,
        }
    }

    pub fn with_control(mut self, control: impl Into<String>) -> Self {
        self.control = Some(control.into());
        self
    }
}

pub struct Form {
    options: FormOptions,
    schema: Option<GroupNode>,
    data: BoundData,
    errors: Vec<ValidationFailure>,
    field_types: TypeRegistry<dyn FieldType>,
    rule_types: TypeRegistry<dyn Rule>,
    filters: HashMap<String, FilterFn>,
    translator: Arc<dyn Translate>,
    paths: FormPaths,
    declared_field_paths: Vec<String>,
    declared_rule_paths: Vec<String>,
}

impl Form {
    /// A form with the built-in field types, rules and filters and an
    /// identity translator.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(FormOptions::new(name))
    }

    pub fn with_options(options: FormOptions) -> Self {
        Self {
            options,
            schema: None,
            data: BoundData::new(),
            errors: Vec::new(),
            field_types: TypeRegistry::<dyn FieldType>::with_builtins(),
            rule_types: TypeRegistry::<dyn Rule>::with_builtins(),
            filters: HashMap::new(),
            translator: Arc::new(NullTranslate),
            paths: FormPaths::new(),
            declared_field_paths: Vec::new(),
            declared_rule_paths: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    /// The configured control prefix, or the empty string.
    pub fn form_control(&self) -> &str {
        self.options.control.as_deref().unwrap_or_default()
    }

    pub fn schema(&self) -> Option<&GroupNode> {
        self.schema.as_ref()
    }

    pub fn set_translator(&mut self, translator: Arc<dyn Translate>) {
        self.translator = translator;
    }

    pub fn field_types_mut(&mut self) -> &mut TypeRegistry<dyn FieldType> {
        &mut self.field_types
    }

    pub fn rule_types_mut(&mut self) -> &mut TypeRegistry<dyn Rule> {
        &mut self.rule_types
    }

    pub fn register_filter(&mut self, name: impl Into<String>, filter: FilterFn) {
        self.filters.insert(name.into(), filter);
    }

    pub fn paths_mut(&mut self) -> &mut FormPaths {
        &mut self.paths
    }

    /// Search locations the loaded schemas declared for custom field types
    /// and rules, in load order. The embedding application decides what to
    /// register from them.
    pub fn declared_field_paths(&self) -> &[String] {
        &self.declared_field_paths
    }

    pub fn declared_rule_paths(&self) -> &[String] {
        &self.declared_rule_paths
    }

    /// Loads (or merges) a schema document. On a parse failure the current
    /// tree is left exactly as it was. `selector` picks a nested subtree of
    /// the document as the logical form root.
    pub fn load(&mut self, xml: &str, replace: bool, selector: Option<&str>) -> FormResult<()> {
        let parsed = schema::parse(xml, selector)?;
        for path in &parsed.field_paths {
            if !self.declared_field_paths.contains(path) {
                self.declared_field_paths.push(path.clone());
            }
        }
        for path in &parsed.rule_paths {
            if !self.declared_rule_paths.contains(path) {
                self.declared_rule_paths.push(path.clone());
            }
        }
        for path in &parsed.form_paths {
            self.paths.add_path(path);
        }
        match &mut self.schema {
            Some(existing) => merge_groups(existing, parsed.root, replace),
            None => self.schema = Some(parsed.root),
        }
        Ok(())
    }

    /// Loads a schema file resolved against the registered form paths.
    pub fn load_file(
        &mut self,
        name: impl AsRef<std::path::Path>,
        replace: bool,
        selector: Option<&str>,
    ) -> FormResult<()> {
        let name = name.as_ref();
        let resolved = self
            .paths
            .find(name)
            .ok_or_else(|| FormError::FileNotFound(name.display().to_string()))?;
        let xml = std::fs::read_to_string(&resolved)
            .map_err(|error| FormError::Parse(format!("{}: {error}", resolved.display())))?;
        self.load(&xml, replace, selector)
    }

    /// Replaces the bound data wholesale. Only values whose dotted path
    /// matches a known field are kept; unknown keys are dropped silently.
    pub fn bind(&mut self, data: &impl Serialize) -> FormResult<()> {
        let value = serde_json::to_value(data).map_err(|error| FormError::Bind(error.to_string()))?;
        if !value.is_object() {
            return Err(FormError::Bind("expected a map or a struct".to_string()));
        }
        self.data.clear();
        if let Some(root) = &self.schema {
            for (group, field) in walk_fields(root) {
                let Some(name) = field.name() else { continue };
                let path = field_path(group.as_deref(), name);
                if let Some(bound) = value_at(&value, &path) {
                    self.data.set(&path, bound.clone());
                }
            }
        }
        Ok(())
    }

    /// The bound value of one field, if any.
    pub fn get_value(&self, name: &str, group: Option<&str>) -> Option<&Value> {
        self.data.get(&field_path(group, name))
    }

    /// Overwrites one bound leaf. The field must exist in the schema.
    pub fn set_value(&mut self, name: &str, group: Option<&str>, value: Value) -> bool {
        if self.find_field(name, group).is_none() {
            return false;
        }
        self.data.set(&field_path(group, name), value);
        true
    }

    /// Clears the bound data (and, on request, the schema tree itself).
    pub fn reset(&mut self, reset_schema: bool) {
        self.data.clear();
        self.errors.clear();
        if reset_schema {
            self.schema = None;
        }
    }

    pub fn find_field(&self, name: &str, group: Option<&str>) -> Option<&FieldNode> {
        schema::find_field(self.schema.as_ref()?, name, group)
    }

    pub fn find_group(&self, path: &str) -> Option<&GroupNode> {
        find_group(self.schema.as_ref()?, Some(path))
    }

    /// The fields under a group (the whole form when `group` is `None`),
    /// optionally including nested subgroups. Unknown groups yield an empty
    /// list.
    pub fn fields_in_group(&self, group: Option<&str>, nested: bool) -> Vec<&FieldNode> {
        let Some(root) = self.schema.as_ref() else {
            return Vec::new();
        };
        match find_group(root, group) {
            Some(node) => fields_in_group(node, nested),
            None => Vec::new(),
        }
    }

    /// The fields claiming a fieldset, wherever they live in the tree.
    pub fn fields_in_fieldset(&self, fieldset: &str) -> Vec<&FieldNode> {
        let Some(root) = self.schema.as_ref() else {
            return Vec::new();
        };
        walk_fields(root)
            .into_iter()
            .filter(|(_, field)| field.attr("fieldset") == Some(fieldset))
            .map(|(_, field)| field)
            .collect()
    }

    /// Distinct fieldset names in document order.
    pub fn fieldsets(&self) -> Vec<String> {
        let Some(root) = self.schema.as_ref() else {
            return Vec::new();
        };
        let mut seen = Vec::new();
        for (_, field) in walk_fields(root) {
            if let Some(fieldset) = field.attr("fieldset") {
                if !seen.iter().any(|known| known == fieldset) {
                    seen.push(fieldset.to_string());
                }
            }
        }
        seen
    }

    /// Derives the ephemeral definition for one field: bound value (or the
    /// caller's override, or the schema default), computed id and name.
    pub fn get_field(
        &self,
        name: &str,
        group: Option<&str>,
        value: Option<Value>,
    ) -> Option<FieldDefinition> {
        let root = self.schema.as_ref()?;
        let (located_group, node) = walk_fields(root).into_iter().find(|(path, field)| {
            field.name() == Some(name)
                && match group {
                    Some(wanted) => path.as_deref() == Some(wanted),
                    None => true,
                }
        })?;
        let bound = self
            .data
            .get(&field_path(located_group.as_deref(), name))
            .cloned();
        Some(FieldDefinition::new(
            node,
            located_group.as_deref(),
            value.or(bound),
            self.options.control.as_deref(),
        ))
    }

    pub fn get_label(&self, name: &str, group: Option<&str>) -> Option<String> {
        Some(self.get_field(name, group, None)?.label(self.translator.as_ref()))
    }

    pub fn get_input(&self, name: &str, group: Option<&str>) -> Option<String> {
        Some(self.get_field(name, group, None)?.input(&self.field_types))
    }

    /// Applies each field's declared filter to the matching entry of `data`
    /// and assembles a same-shaped result. Entries without a matching field
    /// and fields filtered to `unset` are omitted.
    pub fn filter(&self, data: &impl Serialize) -> FormResult<Value> {
        let root = self.schema.as_ref().ok_or(FormError::NotLoaded)?;
        let value = serde_json::to_value(data).map_err(|error| FormError::Bind(error.to_string()))?;
        let mut filtered = BoundData::new();
        for (group, field) in walk_fields(root) {
            let Some(name) = field.name() else { continue };
            let path = field_path(group.as_deref(), name);
            if let Some(raw) = value_at(&value, &path) {
                if let Some(kept) = self.filter_field(field, raw) {
                    filtered.set(&path, kept);
                }
            }
        }
        Ok(filtered.as_value())
    }

    /// One field's filter outcome; `None` means the value is dropped.
    pub fn filter_field(&self, field: &FieldNode, value: &Value) -> Option<Value> {
        filters::apply(field.attr("filter"), value, &self.filters)
    }

    /// Validates `data` against every field (or only those under `group`,
    /// nested subgroups included). All fields are evaluated even after a
    /// failure; the collected failures are available from `get_errors`.
    pub fn validate(&mut self, data: &impl Serialize, group: Option<&str>) -> FormResult<bool> {
        let root = self.schema.as_ref().ok_or(FormError::NotLoaded)?;
        let value = serde_json::to_value(data).map_err(|error| FormError::Bind(error.to_string()))?;
        if let Some(wanted) = group {
            if find_group(root, Some(wanted)).is_none() {
                return Err(FormError::UnknownGroup(wanted.to_string()));
            }
        }

        let mut failures = Vec::new();
        for (path, field) in walk_fields(root) {
            let in_scope = match group {
                Some(wanted) => match path.as_deref() {
                    Some(actual) => {
                        actual == wanted || actual.starts_with(&format!("{wanted}."))
                    }
                    None => false,
                },
                None => true,
            };
            if !in_scope || field.name().is_none() {
                continue;
            }
            let name = field.name().unwrap_or_default();
            let raw = value_at(&value, &field_path(path.as_deref(), name))
                .cloned()
                .unwrap_or(Value::Null);
            if let Some(failure) =
                self.validate_field(field, path.as_deref(), &raw, Some(&value))?
            {
                failures.push(failure);
            }
        }

        self.errors = failures;
        Ok(self.errors.is_empty())
    }

    /// One field's validation outcome for a raw input value. `Ok(None)` is
    /// a pass; a failure is returned as a value so the caller can aggregate
    /// it; `Err` is reserved for rule misuse. Required-ness is judged on
    /// the raw value as supplied; the declared rule evaluates the filtered
    /// candidate, the value that would actually be stored.
    pub fn validate_field(
        &self,
        field: &FieldNode,
        group: Option<&str>,
        value: &Value,
        input: Option<&Value>,
    ) -> FormResult<Option<ValidationFailure>> {
        let name = field.name().unwrap_or_default().to_string();
        if field.is_required() && value_is_empty(value) {
            return Ok(Some(ValidationFailure::Required {
                field: name,
                group: group.map(str::to_string),
            }));
        }
        let Some(rule_name) = field.attr("validate") else {
            return Ok(None);
        };
        let Some(rule) = self.rule_types.create(rule_name) else {
            return Ok(Some(ValidationFailure::UnknownRule {
                field: name,
                rule: rule_name.to_string(),
            }));
        };
        let candidate = self.filter_field(field, value).unwrap_or(Value::Null);
        if rule.test(field, &candidate, group, input)? {
            Ok(None)
        } else {
            Ok(Some(ValidationFailure::Rule {
                field: name,
                rule: rule_name.to_string(),
            }))
        }
    }

    /// The failures collected by the most recent `validate` call.
    pub fn get_errors(&self) -> &[ValidationFailure] {
        &self.errors
    }

    /// Inserts or merges a single field into a group (the root when
    /// `group` is `None`). Unknown groups are a quiet `false`.
    pub fn set_field(&mut self, field: FieldNode, group: Option<&str>, replace: bool) -> bool {
        self.set_fields(vec![field], group, replace)
    }

    pub fn set_fields(
        &mut self,
        fields: Vec<FieldNode>,
        group: Option<&str>,
        replace: bool,
    ) -> bool {
        let Some(root) = self.schema.as_mut() else {
            return false;
        };
        let Some(target) = schema::find_group_mut(root, group) else {
            return false;
        };
        let incoming = GroupNode {
            children: fields.into_iter().map(SchemaNode::Field).collect(),
            ..GroupNode::root()
        };
        merge_groups(target, incoming, replace);
        true
    }

    /// Sets one attribute on an existing field.
    pub fn set_field_attribute(
        &mut self,
        name: &str,
        attribute: &str,
        value: impl Into<String>,
        group: Option<&str>,
    ) -> bool {
        let Some(root) = self.schema.as_mut() else {
            return false;
        };
        match schema::find_field_mut(root, name, group) {
            Some(field) => {
                field.attributes.insert(attribute.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    pub fn remove_field(&mut self, name: &str, group: Option<&str>) -> bool {
        match self.schema.as_mut() {
            Some(root) => schema::remove_field(root, name, group),
            None => false,
        }
    }

    pub fn remove_group(&mut self, group: &str) -> bool {
        match self.schema.as_mut() {
            Some(root) => schema::remove_group(root, group),
            None => false,
        }
    }
}

fn field_path(group: Option<&str>, name: &str) -> String {
    match group.filter(|g| !g.is_empty()) {
        Some(group) => format!("{group}.{name}"),
        None => name.to_string(),
    }
}
