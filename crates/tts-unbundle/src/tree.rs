use std::collections::BTreeMap;

/// The virtual directory tree built up while unbundling: relative
/// forward-slash paths mapped to file content. Duplicate paths keep the
/// last write.
#[derive(Debug, Clone, Default)]
pub struct VirtualTree {
    files: BTreeMap<String, String>,
}

impl VirtualTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: String, content: String) {
        self.files.insert(path, content);
    }

    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn into_files(self) -> BTreeMap<String, String> {
        self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
