//! Local directory of saved record pages.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use marksync_shared::{MarksyncError, RawDocument, Result};

use super::SourceAdapter;

/// File extensions treated as documents.
const DOCUMENT_EXTENSIONS: [&str; 3] = ["html", "htm", "txt"];

/// Reads every `.html`, `.htm` and `.txt` file in a directory (non-recursive),
/// ordered by file name. The query is attached to each document but does not
/// filter anything.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SourceAdapter for FileSource {
    async fn fetch(&self, query: &str) -> Result<Vec<RawDocument>> {
        if !self.root.is_dir() {
            return Err(MarksyncError::Source(format!(
                "document directory not found: {}",
                self.root.display()
            )));
        }

        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| MarksyncError::io(&self.root, e))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MarksyncError::io(&self.root, e))?
        {
            let path = entry.path();
            if path.is_file() && is_document(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| MarksyncError::io(&path, e))?;
            debug!(path = %path.display(), bytes = content.len(), "read document");
            documents.push(RawDocument::new(query, content).with_origin(path.display().to_string()));
        }

        Ok(documents)
    }

    fn name(&self) -> &str {
        "files"
    }
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
