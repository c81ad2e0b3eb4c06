//! Raw text to document-term counts.

use std::collections::{HashMap, HashSet};

use counter::Counter;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::embedding::Vocabulary;
use crate::error::Result;
use crate::matrix::DocTermMatrix;

const STOP_WORDS: &[&str] = &[
    // Common English stop words
    "the", "and", "for", "are", "but", "not", "you", "your", "all", "can", "had",
    "her", "was", "one", "our", "out", "get", "has", "him", "his", "how", "its",
    "may", "now", "who", "did", "what", "when", "where", "will", "with", "this",
    "that", "have", "from", "they", "been", "much", "some", "very", "here", "just",
    "like", "many", "over", "such", "than", "them", "well", "were", "there", "then",
    "these", "those", "into", "also", "about", "which", "their", "would", "could",
    "should", "might", "does", "being", "each", "other", "more", "most", "only",
    "any", "both", "because", "while", "after", "before", "again", "once",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub min_word_freq: usize,
    pub max_vocab_size: usize,
    pub remove_stop_words: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        CorpusConfig {
            min_word_freq: 1,
            max_vocab_size: 10_000,
            remove_stop_words: true,
        }
    }
}

/// Lower-cased alphabetic words of three or more letters.
pub struct Tokenizer {
    word_re: Regex,
    stop_words: HashSet<&'static str>,
}

impl Tokenizer {
    pub fn new(remove_stop_words: bool) -> Self {
        let stop_words = if remove_stop_words {
            STOP_WORDS.iter().copied().collect()
        } else {
            HashSet::new()
        };
        Tokenizer {
            word_re: Regex::new(r"\b[a-zA-Z]{3,}\b").expect("static pattern compiles"),
            stop_words,
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.word_re
            .find_iter(&text.to_lowercase())
            .map(|m| m.as_str())
            .filter(|word| !self.stop_words.contains(*word))
            .map(|word| word.to_string())
            .collect()
    }
}

/// Vocabulary and counts built from a list of raw documents.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub vocabulary: Vocabulary,
    pub matrix: DocTermMatrix,
}

impl Corpus {
    pub fn from_texts<S: AsRef<str>>(texts: &[S], config: &CorpusConfig) -> Result<Self> {
        let tokenizer = Tokenizer::new(config.remove_stop_words);
        let documents: Vec<Vec<String>> = texts.iter().map(|text| tokenizer.tokenize(text.as_ref())).collect();
        let vocabulary = build_vocabulary(&documents, config.min_word_freq, config.max_vocab_size);
        let matrix = vectorize(&documents, &vocabulary)?;
        Ok(Corpus { vocabulary, matrix })
    }
}

/// Words seen at least `min_word_freq` times, most frequent first (ties alphabetical),
/// truncated to `max_vocab_size`.
pub fn build_vocabulary(documents: &[Vec<String>], min_word_freq: usize, max_vocab_size: usize) -> Vocabulary {
    let mut word_counts: Counter<String> = Counter::new();
    for doc in documents {
        for word in doc {
            word_counts[word] += 1;
        }
    }

    let mut vocab: Vec<(String, usize)> = word_counts
        .into_iter()
        .filter(|(_, count)| *count >= min_word_freq)
        .collect();
    vocab.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    vocab.truncate(max_vocab_size);

    Vocabulary::new(vocab.into_iter().map(|(word, _)| word).collect())
}

/// Counts of in-vocabulary words per document; other words are dropped.
pub fn vectorize(documents: &[Vec<String>], vocabulary: &Vocabulary) -> Result<DocTermMatrix> {
    let index: HashMap<&str, usize> = vocabulary.index();
    let rows = documents
        .iter()
        .map(|doc| {
            let mut counts: HashMap<usize, usize> = HashMap::new();
            for word_id in doc.iter().filter_map(|word| index.get(word.as_str()).copied()) {
                *counts.entry(word_id).or_insert(0) += 1;
            }
            counts.into_iter().collect()
        })
        .collect();
    DocTermMatrix::from_rows(vocabulary.len(), rows)
}
