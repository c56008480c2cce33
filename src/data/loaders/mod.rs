//! Document loaders
//!
//! The pipeline consumes plain extracted text; these loaders are the
//! text-extraction boundary for the supported source formats.

use std::fs;
use std::path::Path;

use crate::data::Document;
use crate::error::{RagError, Result};

/// Trait for loading a document from a source file.
pub trait DocumentLoader {
    /// Load a document from the given path.
    fn load(&self, path: &Path) -> Result<Document>;

    /// Check whether this loader handles the given file extension.
    fn can_load(&self, path: &Path) -> bool;
}

/// Plain text loader.
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        let text = fs::read_to_string(path).map_err(|e| {
            RagError::Configuration(format!("failed to read text file {:?}: {}", path, e))
        })?;
        Ok(Document::new(document_id(path), text))
    }

    fn can_load(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("txt") | Some("text")
        )
    }
}

/// Markdown loader. Markdown markup is left in place; it chunks fine.
pub struct MarkdownLoader;

impl DocumentLoader for MarkdownLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        let text = fs::read_to_string(path).map_err(|e| {
            RagError::Configuration(format!("failed to read markdown file {:?}: {}", path, e))
        })?;
        Ok(Document::new(document_id(path), text))
    }

    fn can_load(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("md") | Some("markdown")
        )
    }
}

/// PDF loader backed by `pdf-extract`, available with the `pdf` feature.
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, _path: &Path) -> Result<Document> {
        #[cfg(feature = "pdf")]
        {
            let text = pdf_extract::extract_text(_path).map_err(|e| {
                RagError::Configuration(format!(
                    "failed to extract text from PDF {:?}: {}",
                    _path, e
                ))
            })?;
            Ok(Document::new(document_id(_path), text))
        }

        #[cfg(not(feature = "pdf"))]
        {
            Err(RagError::Configuration(
                "PDF support not enabled; compile with --features pdf".into(),
            ))
        }
    }

    fn can_load(&self, path: &Path) -> bool {
        matches!(path.extension().and_then(|e| e.to_str()), Some("pdf"))
    }
}

/// Loader that delegates to the format-specific loaders by extension.
pub struct MultiFormatLoader {
    loaders: Vec<Box<dyn DocumentLoader>>,
}

impl MultiFormatLoader {
    /// Create a loader covering all supported formats.
    pub fn new() -> Self {
        let loaders: Vec<Box<dyn DocumentLoader>> = vec![
            Box::new(TextLoader),
            Box::new(MarkdownLoader),
            Box::new(PdfLoader),
        ];
        Self { loaders }
    }

    /// Load a document, selecting the loader by file extension.
    pub fn load(&self, path: &Path) -> Result<Document> {
        for loader in &self.loaders {
            if loader.can_load(path) {
                return loader.load(path);
            }
        }
        Err(RagError::Configuration(format!(
            "no loader for file {:?}; supported extensions: txt, md, pdf",
            path
        )))
    }
}

impl Default for MultiFormatLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a stable document id from the file stem.
fn document_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}
