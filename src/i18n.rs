use std::collections::HashMap;

/// Translation lookup consumed by label/title rendering. A missing key
/// falls back to the key itself so untranslated forms stay readable.
pub trait Translate: Send + Sync {
    fn translate(&self, key: &str) -> String;

    fn has_key(&self, _key: &str) -> bool {
        false
    }
}

/// Identity translator; the default collaborator when none is injected.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTranslate;

impl Translate for NullTranslate {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

/// In-memory key/value catalog. With `debug` enabled, untranslated keys are
/// wrapped in `??` markers so missing strings stand out during development.
#[derive(Clone, Debug, Default)]
pub struct CatalogTranslate {
    entries: HashMap<String, String>,
    debug: bool,
}

impl CatalogTranslate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn extend<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }
}

impl Translate for CatalogTranslate {
    fn translate(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(value) => value.clone(),
            None if self.debug => format!("??{key}??"),
            None => key.to_string(),
        }
    }

    fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_translation_shows_key() {
        let catalog = CatalogTranslate::new();
        assert_eq!(catalog.translate("form.title"), "form.title");
    }

    #[test]
    fn debug_mode_marks_missing_keys() {
        let catalog = CatalogTranslate::new().with_debug(true);
        assert_eq!(catalog.translate("form.title"), "??form.title??");
    }

    #[test]
    fn catalog_hit_returns_translation() {
        let mut catalog = CatalogTranslate::new();
        catalog.insert("form.title", "Titel");
        assert_eq!(catalog.translate("form.title"), "Titel");
        assert!(catalog.has_key("form.title"));
    }
}
