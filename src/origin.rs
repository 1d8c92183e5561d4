//! Directory Loader
//!
//! A loader that serves each key from a file of the same name.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::group::{Loaded, Loader};

// == Dir Loader ==
/// Loads `key` from `{root}/{key}`.
///
/// Keys that are not plain file names (path separators, `.`, `..`) are
/// reported as absent.
#[derive(Debug, Clone)]
pub struct DirLoader {
    root: PathBuf,
}

impl DirLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);
        plain.then(|| self.root.join(key))
    }
}

#[async_trait]
impl Loader for DirLoader {
    async fn load(&self, key: &str) -> Option<Loaded> {
        let path = self.path_for(key)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(Loaded::new(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read origin file");
                None
            }
        }
    }
}
