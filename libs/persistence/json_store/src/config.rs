use std::path::{Path, PathBuf};

/// Location of the backing JSON document.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }
}
