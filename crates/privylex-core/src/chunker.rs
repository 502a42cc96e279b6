use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::types::Chunk;

/// Window size and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, overlap: 100 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.chunk_size == 0 || self.overlap >= self.chunk_size {
            return Err(ConfigurationError::InvalidChunking { size: self.chunk_size, overlap: self.overlap });
        }
        Ok(())
    }

    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Splits text into fixed-size overlapping windows.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        split_windows(text, self.config.chunk_size, self.config.step())
    }
}

/// Chunk `text` into windows of `size` characters advancing by `size - overlap`.
///
/// The last window is truncated to the remaining text and is emitted exactly
/// once. Empty text yields no chunks.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<Chunk>, ConfigurationError> {
    Ok(Chunker::new(ChunkingConfig { chunk_size: size, overlap })?.chunk(text))
}

fn split_windows(text: &str, size: usize, step: usize) -> Vec<Chunk> {
    // byte offset of every char boundary, plus the end of the text
    let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
    let len = bounds.len() - 1;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let end = (start + size).min(len);
        chunks.push(Chunk { index: chunks.len(), start, content: text[bounds[start]..bounds[end]].to_string() });
        if start + size >= len {
            break;
        }
        start += step;
    }
    chunks
}
