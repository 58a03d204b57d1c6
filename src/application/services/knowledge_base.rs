use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

use super::RagService;
use crate::domain::{Document, DocumentChunk, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionReport {
    pub documents: usize,
    pub chunks: usize,
}

/// Loads a document tree and rebuilds the vector index from it in one pass.
pub struct KnowledgeBase {
    rag: Arc<RagService>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl KnowledgeBase {
    pub fn new(rag: Arc<RagService>) -> Self {
        Self {
            rag,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }

    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    /// Any unreadable file aborts the whole run.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn initialize(&self, dir: &Path) -> Result<IngestionReport, DomainError> {
        let documents = load_documents(dir).await?;

        let chunks: Vec<DocumentChunk> = documents
            .iter()
            .flat_map(|d| d.chunks(self.chunk_size, self.chunk_overlap))
            .collect();

        self.rag.rebuild_index(&chunks).await?;

        let report = IngestionReport {
            documents: documents.len(),
            chunks: chunks.len(),
        };
        tracing::info!(
            documents = report.documents,
            chunks = report.chunks,
            "knowledge base initialized"
        );
        Ok(report)
    }
}

/// Reads every visible file with an extension under `root`, in sorted path order.
pub async fn load_documents(root: &Path) -> Result<Vec<Document>, DomainError> {
    let mut paths = collect_files(root).await?;
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DomainError::ingestion(format!("{}: {e}", path.display())))?;

        let source = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        tracing::debug!(source, bytes = content.len(), "document loaded");
        documents.push(Document::new(source, content));
    }

    Ok(documents)
}

async fn collect_files(root: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| DomainError::ingestion(format!("{}: {e}", dir.display())))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::ingestion(format!("{}: {e}", dir.display())))?
        {
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }

            let file_type = entry
                .file_type()
                .await
                .map_err(|e| DomainError::ingestion(format!("{}: {e}", path.display())))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if path.extension().is_some() {
                files.push(path);
            }
        }
    }

    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
