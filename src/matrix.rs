//! Sparse document-term count matrix.

use crate::error::{LdaError, Result};

/// Documents × vocabulary matrix of non-negative word counts.
///
/// Each row holds `(word_id, count)` pairs sorted by word id with zero
/// counts dropped, so iteration order is row-major over documents and then
/// ascending word ids.
#[derive(Debug, Clone, PartialEq)]
pub struct DocTermMatrix {
    n_words: usize,
    rows: Vec<Vec<(usize, usize)>>,
}

impl DocTermMatrix {
    pub fn from_dense(rows: &[Vec<usize>]) -> Result<Self> {
        let n_words = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut sparse = Vec::with_capacity(rows.len());
        for (doc_id, row) in rows.iter().enumerate() {
            if row.len() != n_words {
                return Err(LdaError::shape(
                    format!("{} columns", n_words),
                    format!("{} columns in row {}", row.len(), doc_id),
                ));
            }
            sparse.push(
                row.iter()
                    .enumerate()
                    .filter(|(_, count)| **count > 0)
                    .map(|(word_id, count)| (word_id, *count))
                    .collect(),
            );
        }
        Ok(DocTermMatrix { n_words, rows: sparse })
    }

    /// Builds a matrix from sparse rows. Duplicate word ids within a row are summed.
    pub fn from_rows(n_words: usize, rows: Vec<Vec<(usize, usize)>>) -> Result<Self> {
        let mut normalized = Vec::with_capacity(rows.len());
        for mut row in rows {
            if let Some(&(word_id, _)) = row.iter().find(|(word_id, _)| *word_id >= n_words) {
                return Err(LdaError::shape(
                    format!("word ids below {}", n_words),
                    format!("word id {}", word_id),
                ));
            }
            row.sort_by_key(|&(word_id, _)| word_id);
            let mut merged: Vec<(usize, usize)> = Vec::with_capacity(row.len());
            for (word_id, count) in row {
                match merged.last_mut() {
                    Some(last) if last.0 == word_id => last.1 += count,
                    _ => merged.push((word_id, count)),
                }
            }
            merged.retain(|&(_, count)| count > 0);
            normalized.push(merged);
        }
        Ok(DocTermMatrix { n_words, rows: normalized })
    }

    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }

    pub fn n_words(&self) -> usize {
        self.n_words
    }

    /// Total token count N.
    pub fn total(&self) -> usize {
        self.rows.iter().flat_map(|row| row.iter().map(|&(_, count)| count)).sum()
    }

    pub fn row(&self, doc_id: usize) -> &[(usize, usize)] {
        &self.rows[doc_id]
    }

    pub fn get(&self, doc_id: usize, word_id: usize) -> usize {
        self.rows[doc_id]
            .binary_search_by_key(&word_id, |&(w, _)| w)
            .map(|idx| self.rows[doc_id][idx].1)
            .unwrap_or(0)
    }

    /// Non-zero entries as `(doc_id, word_id, count)`, row-major.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(doc_id, row)| {
            row.iter().map(move |&(word_id, count)| (doc_id, word_id, count))
        })
    }

    /// Expands one document into its word-id sequence, one entry per occurrence.
    pub fn document_tokens(&self, doc_id: usize) -> Vec<usize> {
        self.rows[doc_id]
            .iter()
            .flat_map(|&(word_id, count)| std::iter::repeat(word_id).take(count))
            .collect()
    }

    /// Expands the matrix into parallel word-id and doc-id token lists.
    pub fn to_token_lists(&self) -> (Vec<usize>, Vec<usize>) {
        let total = self.total();
        let mut words = Vec::with_capacity(total);
        let mut docs = Vec::with_capacity(total);
        for (doc_id, word_id, count) in self.nonzero() {
            for _ in 0..count {
                words.push(word_id);
                docs.push(doc_id);
            }
        }
        (words, docs)
    }
}
