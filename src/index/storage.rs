// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk storage for a built index.
//!
//! An index is persisted as two companion files in one directory:
//!
//! - `embeddings.bin`: the N x D matrix as little-endian f32 values behind a
//!   small header (magic, model id, row count, dimension).
//! - `metadata.json`: a JSON array of N `{filename, chunk_index, text}` objects.
//!
//! The files are always written and read as a pair. A missing half, a corrupt
//! matrix, or a row-count mismatch is a configuration error.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{ChunkMetadata, Index};
use crate::embedding::EmbeddingMatrix;
use crate::errors::{RagError, Result};

/// File name of the matrix artifact.
pub const EMBEDDINGS_FILE: &str = "embeddings.bin";

/// File name of the metadata artifact.
pub const METADATA_FILE: &str = "metadata.json";

/// Default directory for the artifacts, relative to the working directory.
pub const DEFAULT_INDEX_DIR: &str = "vector_store";

const MAGIC: &[u8; 8] = b"BRAGIDX1";

/// Pair of index artifacts rooted at a directory.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn embeddings_path(&self) -> PathBuf {
        self.dir.join(EMBEDDINGS_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// True when both artifacts are present.
    pub fn exists(&self) -> bool {
        self.embeddings_path().is_file() && self.metadata_path().is_file()
    }

    /// Writes both artifacts, replacing any previous pair.
    ///
    /// Each file is written to a temporary sibling first and renamed into
    /// place only after both have been written.
    pub fn save(&self, index: &Index) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let emb_tmp = self.dir.join(format!("{}.tmp", EMBEDDINGS_FILE));
        let meta_tmp = self.dir.join(format!("{}.tmp", METADATA_FILE));

        {
            let mut writer = BufWriter::new(fs::File::create(&emb_tmp)?);
            writer.write_all(&Self::encode_matrix(index.model_id(), index.embeddings()))?;
            writer.flush()?;
        }
        {
            let mut writer = BufWriter::new(fs::File::create(&meta_tmp)?);
            serde_json::to_writer_pretty(&mut writer, index.metadata())?;
            writer.flush()?;
        }

        fs::rename(&emb_tmp, self.embeddings_path())?;
        fs::rename(&meta_tmp, self.metadata_path())?;

        tracing::info!(
            dir = %self.dir.display(),
            rows = index.len(),
            dim = index.embeddings().dim(),
            "saved index"
        );
        Ok(())
    }

    /// Loads both artifacts and checks that they describe the same rows.
    pub fn load(&self) -> Result<Index> {
        let emb_path = self.embeddings_path();
        let meta_path = self.metadata_path();

        match (emb_path.is_file(), meta_path.is_file()) {
            (true, true) => {}
            (false, false) => {
                return Err(RagError::config(format!(
                    "index not found in {}",
                    self.dir.display()
                )))
            }
            (false, true) => {
                return Err(RagError::config(format!(
                    "index artifact pair is incomplete: missing {}",
                    emb_path.display()
                )))
            }
            (true, false) => {
                return Err(RagError::config(format!(
                    "index artifact pair is incomplete: missing {}",
                    meta_path.display()
                )))
            }
        }

        let bytes = fs::read(&emb_path)?;
        let (model_id, embeddings) = Self::decode_matrix(&bytes)
            .map_err(|msg| RagError::config(format!("{}: {}", emb_path.display(), msg)))?;

        let reader = BufReader::new(fs::File::open(&meta_path)?);
        let metadata: Vec<ChunkMetadata> = serde_json::from_reader(reader).map_err(|e| {
            RagError::config(format!("{}: invalid metadata: {}", meta_path.display(), e))
        })?;

        if metadata.len() != embeddings.rows() {
            return Err(RagError::config(format!(
                "index artifacts disagree: {} has {} rows but {} has {} entries",
                emb_path.display(),
                embeddings.rows(),
                meta_path.display(),
                metadata.len()
            )));
        }

        tracing::info!(dir = %self.dir.display(), rows = metadata.len(), "loaded index");
        Index::new(model_id, embeddings, metadata)
    }

    fn encode_matrix(model_id: Option<&str>, matrix: &EmbeddingMatrix) -> Vec<u8> {
        let model = model_id.unwrap_or("").as_bytes();
        let mut out = Vec::with_capacity(MAGIC.len() + 4 + model.len() + 16 + matrix.as_slice().len() * 4);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&(model.len() as u32).to_le_bytes());
        out.extend_from_slice(model);
        out.extend_from_slice(&(matrix.rows() as u64).to_le_bytes());
        out.extend_from_slice(&(matrix.dim() as u64).to_le_bytes());
        out.extend(Self::embedding_to_blob(matrix.as_slice()));
        out
    }

    fn decode_matrix(bytes: &[u8]) -> std::result::Result<(Option<String>, EmbeddingMatrix), String> {
        let mut cursor = ByteCursor { bytes, pos: 0 };

        if cursor.take(MAGIC.len())? != MAGIC {
            return Err("not an embeddings file".to_string());
        }
        let model_len = cursor.u32()? as usize;
        let model = std::str::from_utf8(cursor.take(model_len)?)
            .map_err(|_| "model id is not UTF-8".to_string())?
            .to_string();
        let rows = usize::try_from(cursor.u64()?).map_err(|_| "row count overflow".to_string())?;
        let dim = usize::try_from(cursor.u64()?).map_err(|_| "dimension overflow".to_string())?;

        let expected = rows
            .checked_mul(dim)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| "matrix size overflow".to_string())?;
        let blob = cursor.rest();
        if blob.len() != expected {
            return Err(format!(
                "expected {} bytes of matrix data for {} x {}, found {}",
                expected,
                rows,
                dim,
                blob.len()
            ));
        }

        let matrix = EmbeddingMatrix::from_raw(rows, dim, Self::blob_to_embedding(blob))
            .map_err(|e| e.to_string())?;
        let model_id = (!model.is_empty()).then_some(model);
        Ok((model_id, matrix))
    }

    /// Converts embedding values to a compact blob.
    fn embedding_to_blob(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Converts a blob back to embedding values.
    fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
        blob.chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }
}

struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn take(&mut self, len: usize) -> std::result::Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| "truncated header".to_string())?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> std::result::Result<u32, String> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> std::result::Result<u64, String> {
        let mut buf = [0_u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}
