// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dense row-major embedding matrix.

use crate::errors::{RagError, Result};

/// An N x D matrix of f32 values stored row-major.
///
/// The empty matrix has shape (0, 0).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingMatrix {
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a matrix from raw row-major data.
    pub fn from_raw(rows: usize, dim: usize, data: Vec<f32>) -> Result<Self> {
        if rows.checked_mul(dim) != Some(data.len()) {
            return Err(RagError::config(format!(
                "matrix data has {} values, expected {} x {}",
                data.len(),
                rows,
                dim
            )));
        }
        if rows == 0 || dim == 0 {
            return Ok(Self::empty());
        }
        Ok(Self { rows, dim, data })
    }

    /// Builds a matrix from equal-length rows.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let Some(dim) = rows.first().map(Vec::len) else {
            return Ok(Self::empty());
        };
        let count = rows.len();
        let mut data = Vec::with_capacity(count * dim);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(RagError::Embedding(format!(
                    "row {} has dimension {}, expected {}",
                    idx,
                    row.len(),
                    dim
                )));
            }
            data.extend(row);
        }
        Self::from_raw(count, dim, data)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.dim)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on 0, and the empty matrix has no rows anyway.
        self.data.chunks_exact(self.dim.max(1))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Dot product of `query` with every row.
    ///
    /// Returns an empty vector if the dimensions disagree.
    pub fn dot_all(&self, query: &[f32]) -> Vec<f32> {
        if query.len() != self.dim {
            return Vec::new();
        }
        self.iter_rows()
            .map(|row| row.iter().zip(query).map(|(a, b)| a * b).sum())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let m = EmbeddingMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(m.row(2), None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(EmbeddingMatrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_empty_shape() {
        let m = EmbeddingMatrix::from_rows(Vec::new()).unwrap();
        assert_eq!(m.shape(), (0, 0));
        assert!(m.is_empty());
        assert_eq!(m.iter_rows().count(), 0);
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(EmbeddingMatrix::from_raw(2, 3, vec![0.0; 5]).is_err());
        assert!(EmbeddingMatrix::from_raw(2, 3, vec![0.0; 6]).is_ok());
    }

    #[test]
    fn test_dot_all() {
        let m = EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.6, 0.8]]).unwrap();
        let scores = m.dot_all(&[0.0, 1.0]);
        assert_eq!(scores.len(), 2);
        assert!((scores[0] - 0.0).abs() < 1e-6);
        assert!((scores[1] - 0.8).abs() < 1e-6);
        assert!(m.dot_all(&[1.0]).is_empty());
    }
}
