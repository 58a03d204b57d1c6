use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source metadata shared by a document and every chunk cut from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: String,
    pub content_type: String,
}

impl DocumentMetadata {
    pub fn for_source(source: impl Into<String>) -> Self {
        let source = source.into();
        let content_type = mime_guess::from_path(&source)
            .first_or_text_plain()
            .essence_str()
            .to_string();
        Self {
            source,
            content_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub metadata: DocumentMetadata,
    pub content: String,
}

impl Document {
    /// Ids derive from the source path so that re-ingesting an unchanged corpus
    /// yields identical store content.
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        let metadata = DocumentMetadata::for_source(source);
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, metadata.source.as_bytes()),
            metadata,
            content: content.into(),
        }
    }

    pub fn chunks(&self, chunk_size: usize, overlap: usize) -> Vec<DocumentChunk> {
        chunk_text(&self.content, chunk_size, overlap)
            .into_iter()
            .enumerate()
            .map(|(index, content)| {
                DocumentChunk::new(self.id, content, index).with_metadata(self.metadata.clone())
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub metadata: DocumentMetadata,
}

impl DocumentChunk {
    pub fn new(document_id: Uuid, content: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v5(&document_id, &(chunk_index as u64).to_be_bytes()),
            document_id,
            content: content.into(),
            chunk_index,
            metadata: DocumentMetadata {
                source: String::new(),
                content_type: "text/plain".to_string(),
            },
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Splits text into windows of at most `chunk_size` characters where each
/// window repeats the last `overlap` characters of the previous one.
///
/// Window ends are pulled back to the nearest whitespace when one exists past
/// the overlap region, so chunks tend to end on word boundaries. Whitespace-only
/// input yields no chunks. `overlap` is clamped below `chunk_size`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size - 1);
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if len <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let window_end = (start + chunk_size).min(len);
        let end = if window_end < len {
            (start + overlap..window_end)
                .rev()
                .find(|&i| chars[i].is_whitespace())
                .map(|i| i + 1)
                .unwrap_or(window_end)
        } else {
            window_end
        };

        chunks.push(chars[start..end].iter().collect());

        if end >= len {
            break;
        }
        start = end - overlap;
    }

    chunks
}
