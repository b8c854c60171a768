use std::path::{Path, PathBuf};

/// Ordered list of directories searched when a form schema is loaded by
/// file name. Injected per form instead of living in process-wide state, so
/// two forms can use disjoint search lists without interfering.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormPaths {
    paths: Vec<PathBuf>,
}

impl FormPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a directory if it is not already registered and returns the
    /// full ordered list.
    pub fn add_path(&mut self, path: impl Into<PathBuf>) -> &[PathBuf] {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
        &self.paths
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Resolves a file name against the registered directories in order;
    /// the earliest existing file wins. An absolute or directly readable
    /// path short-circuits the search.
    pub fn find(&self, name: impl AsRef<Path>) -> Option<PathBuf> {
        let name = name.as_ref();
        if name.is_file() {
            return Some(name.to_path_buf());
        }
        self.paths
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}
