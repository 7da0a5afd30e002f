use std::fs;
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::DocumentError;
use crate::export::to_markdown;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Reads a stored document. Files that are not JSON documents load as one
/// paragraph of text.
pub fn load_document(path: &Path) -> Result<Document, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(Document::from_content(&content))
}

/// Writes `doc` as JSON, creating parent directories as needed.
pub fn save_document(path: &Path, doc: &Document) -> Result<(), IoError> {
    write_creating_parents(path, &doc.to_json()?)
}

/// Where the markdown export of `path` goes: the same name with an `.md`
/// extension.
pub fn markdown_path(path: &Path) -> PathBuf {
    path.with_extension("md")
}

/// Writes the markdown export beside `path` and returns where it went.
pub fn export_markdown(path: &Path, doc: &Document) -> Result<PathBuf, IoError> {
    let target = markdown_path(path);
    write_creating_parents(&target, &to_markdown(doc))?;
    Ok(target)
}

fn write_creating_parents(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
