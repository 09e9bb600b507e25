//! Document loaders
//!
//! Turn a file into page-sized documents carrying `source` and `page`
//! metadata. PDFs are read page by page; plain text and markdown files
//! become a single page.

use std::path::Path;

use crate::errors::{RagError, Result};
use crate::index::IndexDocument;

pub trait DocumentLoader: Send + Sync {
    /// Load a document from the given path
    fn load(&self, path: &Path) -> Result<Vec<IndexDocument>>;
}

/// Extracts text from each PDF page
#[derive(Debug, Clone, Default)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<IndexDocument>> {
        let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| {
            RagError::Ingest(format!("Failed to extract text from {}: {}", path.display(), e))
        })?;

        let documents: Vec<IndexDocument> = pages
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(page, text)| {
                IndexDocument::new(text)
                    .with_metadata("source", path.display().to_string())
                    .with_metadata("page", page as u64)
            })
            .collect();

        if documents.is_empty() {
            return Err(RagError::Ingest(format!(
                "No extractable text in {}",
                path.display()
            )));
        }

        Ok(documents)
    }
}

/// Reads UTF-8 text files
#[derive(Debug, Clone, Default)]
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> Result<Vec<IndexDocument>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RagError::Ingest(format!("Failed to read {}: {}", path.display(), e)))?;

        if text.trim().is_empty() {
            return Err(RagError::Ingest(format!("Document is empty: {}", path.display())));
        }

        Ok(vec![IndexDocument::new(text)
            .with_metadata("source", path.display().to_string())
            .with_metadata("page", 0_u64)])
    }
}

/// Pick a loader from the file extension
pub fn loader_for(path: &Path) -> Result<Box<dyn DocumentLoader>> {
    if !path.exists() {
        return Err(RagError::Ingest(format!("Could not find {}", path.display())));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(Box::new(PdfLoader)),
        "txt" | "md" | "markdown" => Ok(Box::new(TextLoader)),
        other => Err(RagError::Ingest(format!(
            "Unsupported file format: '{}' (expected pdf, txt or md)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_text_loader_sets_metadata() {
        let file = write_temp(".txt", "Agentic AI plans and acts.");
        let docs = TextLoader.load(file.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "Agentic AI plans and acts.");
        assert_eq!(docs[0].metadata["page"], 0);
        assert_eq!(
            docs[0].metadata["source"],
            file.path().display().to_string()
        );
    }

    #[test]
    fn test_text_loader_rejects_empty() {
        let file = write_temp(".txt", "   \n");
        assert!(matches!(TextLoader.load(file.path()), Err(RagError::Ingest(_))));
    }

    #[test]
    fn test_loader_for_missing_file() {
        let err = loader_for(Path::new("./data/does-not-exist.pdf")).err().unwrap();
        assert!(err.to_string().contains("Could not find"));
    }

    #[test]
    fn test_loader_for_unsupported_extension() {
        let file = write_temp(".docx", "binary");
        let err = loader_for(file.path()).err().unwrap();
        assert!(err.to_string().contains("Unsupported file format"));
    }

    #[test]
    fn test_loader_for_markdown() {
        let file = write_temp(".MD", "# Title\n\nBody");
        let docs = loader_for(file.path()).unwrap().load(file.path()).unwrap();
        assert_eq!(docs.len(), 1);
    }
}
