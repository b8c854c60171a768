use serde_json::{Map, Value};

/// Nested value store addressed by dotted group paths. `bind` replaces the
/// whole tree, `set` mutates one leaf, `clear` empties it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundData {
    root: Map<String, Value>,
}

impl BoundData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Resolves a dotted path to the value stored at it.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Stores a value at a dotted path, creating intermediate objects as
    /// needed. An existing non-object on the way is replaced.
    pub fn set(&mut self, path: &str, value: Value) {
        let mut segments = path.split('.').peekable();
        let mut current = &mut self.root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_string(), value);
                return;
            }
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry
                .as_object_mut()
                .unwrap_or_else(|| unreachable!("entry was just made an object"));
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }
}

/// Resolves a dotted path inside an arbitrary JSON value. Used by
/// cross-field rules that compare against another field's raw input.
pub fn value_at<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// The required-field emptiness notion: null, blank strings and empty
/// collections count as missing; `false` and `0` are real values.
pub fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Renders a bound value the way an HTML attribute needs it: strings as-is,
/// scalars via their JSON form, null as the empty string.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
