//! Word vectors and the id-to-token vocabulary the coherence adjuster looks them up through.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LdaError, Result};

/// Lookup from a vocabulary token to a fixed-length vector.
pub trait WordEmbeddings {
    fn dimension(&self) -> usize;
    fn vector(&self, token: &str) -> Option<&[f64]>;
}

/// Dense vocabulary: word id `i` is `tokens[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    tokens: Vec<String>,
}

impl Vocabulary {
    pub fn new(tokens: Vec<String>) -> Self {
        Vocabulary { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, word_id: usize) -> Option<&str> {
        self.tokens.get(word_id).map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn index(&self) -> HashMap<&str, usize> {
        self.tokens.iter().enumerate().map(|(i, token)| (token.as_str(), i)).collect()
    }
}

/// In-memory word vectors keyed by token.
#[derive(Debug, Clone, Default)]
pub struct WordVectors {
    dimension: usize,
    vectors: HashMap<String, Vec<f64>>,
}

impl WordVectors {
    pub fn new(dimension: usize) -> Self {
        WordVectors {
            dimension,
            vectors: HashMap::new(),
        }
    }

    pub fn insert(&mut self, token: impl Into<String>, vector: Vec<f64>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(LdaError::shape(
                format!("{}-dimensional vector", self.dimension),
                format!("{} components", vector.len()),
            ));
        }
        self.vectors.insert(token.into(), vector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Reads the word2vec text format: an optional `count dimension` header,
    /// then one `token v1 v2 ...` line per word.
    pub fn from_word2vec_text<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut vectors: Option<WordVectors> = None;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(token) = fields.next() else {
                continue;
            };
            let values: Vec<f64> = fields
                .map(|field| field.parse::<f64>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| LdaError::EmbeddingParse {
                    line: line_no + 1,
                    message: e.to_string(),
                })?;

            if line_no == 0 && values.len() == 1 && token.parse::<usize>().is_ok() {
                continue;  // "count dimension" header
            }

            let table = vectors.get_or_insert_with(|| WordVectors::new(values.len()));
            if values.len() != table.dimension {
                return Err(LdaError::EmbeddingParse {
                    line: line_no + 1,
                    message: format!("expected {} components, found {}", table.dimension, values.len()),
                });
            }
            table.vectors.insert(token.to_string(), values);
        }

        Ok(vectors.unwrap_or_default())
    }
}

impl WordEmbeddings for WordVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, token: &str) -> Option<&[f64]> {
        self.vectors.get(token).map(Vec::as_slice)
    }
}

/// Cosine similarity; zero when either vector has no length.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
