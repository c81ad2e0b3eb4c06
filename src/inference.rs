//! Topic mixtures of unseen documents by iterated pseudo-counts.
//!
//! Each token position keeps a distribution over topics. A round sets
//! position `i`'s weight for topic `k` to `topic_word[k][w_i]` times the
//! mass the *other* positions put on `k` plus `alpha`, then renormalises.
//! Rounds repeat until the total absolute change drops below `tol`. This is
//! the simpler first-order variant of Buntine (2009), as used by Wallach et
//! al. (2009) for held-out evaluation.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{LdaError, Result};
use crate::matrix::DocTermMatrix;

/// Topic mixture of one document given as a word-id sequence.
/// A document without tokens gets the uniform mixture.
pub fn transform_single(topic_word: &[Vec<f64>], doc: &[usize], alpha: f64, max_iter: usize, tol: f64) -> Vec<f64> {
    let n_topics = topic_word.len();
    if doc.is_empty() || n_topics == 0 {
        return vec![1.0 / n_topics.max(1) as f64; n_topics];
    }

    let mut pzs = vec![vec![0.0; n_topics]; doc.len()];
    let mut column = vec![0.0; n_topics];
    for iteration in 0..=max_iter {
        let mut delta = 0.0;
        let mut next_column = vec![0.0; n_topics];
        let next: Vec<Vec<f64>> = doc
            .iter()
            .zip(&pzs)
            .map(|(&w, previous)| {
                let mut row: Vec<f64> = (0..n_topics)
                    .map(|k| topic_word[k][w] * (column[k] - previous[k] + alpha))
                    .collect();
                let norm: f64 = row.iter().sum();
                for (k, p) in row.iter_mut().enumerate() {
                    *p /= norm;
                    delta += (*p - previous[k]).abs();
                    next_column[k] += *p;
                }
                row
            })
            .collect();
        debug!(iteration, delta, "transform");
        pzs = next;
        column = next_column;
        if delta < tol {
            break;
        }
    }

    let total: f64 = column.iter().sum();
    column.iter().map(|c| c / total).collect()
}

/// Topic mixture of every row of `dtm`; documents are processed in parallel.
pub fn transform(
    topic_word: &[Vec<f64>],
    dtm: &DocTermMatrix,
    alpha: f64,
    max_iter: usize,
    tol: f64,
) -> Result<Vec<Vec<f64>>> {
    let n_words = topic_word.first().map(|row| row.len()).unwrap_or(0);
    if dtm.n_words() != n_words {
        return Err(LdaError::shape(
            format!("{} vocabulary columns", n_words),
            format!("{} columns", dtm.n_words()),
        ));
    }

    Ok((0..dtm.n_docs())
        .into_par_iter()
        .map(|d| transform_single(topic_word, &dtm.document_tokens(d), alpha, max_iter, tol))
        .collect())
}
