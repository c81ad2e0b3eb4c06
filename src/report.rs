use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coherence::corpus_coherence;
use crate::config::LdaConfig;
use crate::embedding::Vocabulary;
use crate::error::{LdaError, Result};
use crate::lda::FittedModel;
use crate::matrix::DocTermMatrix;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeledTopic {
    pub id: usize,
    pub name: String,
    pub words: Vec<(String, f64)>,  // Word and its probability in this topic
    pub documents: Vec<usize>,       // Document indices whose strongest topic is this one
    pub coherence_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicReport {
    pub fitted_at: DateTime<Utc>,
    pub config: LdaConfig,
    pub vocabulary_size: usize,
    pub n_documents: usize,
    pub loglikelihoods: Vec<f64>,
    pub perplexity: Option<f64>,
    pub topics: Vec<ModeledTopic>,
}

impl TopicReport {
    pub fn build(
        model: &FittedModel,
        vocabulary: &Vocabulary,
        dtm: &DocTermMatrix,
        config: &LdaConfig,
        words_per_topic: usize,
    ) -> Result<Self> {
        if vocabulary.len() != model.n_words {
            return Err(LdaError::shape(
                format!("{} vocabulary entries", model.n_words),
                format!("{} vocabulary entries", vocabulary.len()),
            ));
        }

        let primary_topics: Vec<usize> = model.doc_topic.iter().map(|probs| argmax(probs)).collect();

        let topics = (0..model.n_topics)
            .map(|topic_id| {
                let top = model.top_words(topic_id, words_per_topic);
                let word_ids: Vec<usize> = top.iter().map(|&(w, _)| w).collect();
                let words: Vec<(String, f64)> = top
                    .iter()
                    .map(|&(w, p)| (vocabulary.token(w).unwrap_or_default().to_string(), p))
                    .collect();
                let name = words.iter().take(3).map(|(word, _)| word.as_str()).collect::<Vec<_>>().join("_");
                let documents = primary_topics
                    .iter()
                    .enumerate()
                    .filter(|(_, primary)| **primary == topic_id)
                    .map(|(doc_id, _)| doc_id)
                    .collect();

                ModeledTopic {
                    id: topic_id,
                    name,
                    words,
                    documents,
                    coherence_score: corpus_coherence(dtm, &word_ids),
                }
            })
            .collect();

        Ok(TopicReport {
            fitted_at: Utc::now(),
            config: config.clone(),
            vocabulary_size: vocabulary.len(),
            n_documents: model.doc_topic.len(),
            loglikelihoods: model.loglikelihoods.clone(),
            perplexity: model.perplexity,
            topics,
        })
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn print_summary(&self) {
        println!("📊 Fitted {} topics over {} documents ({} words)",
                 self.topics.len(), self.n_documents, self.vocabulary_size);
        if let Some(ll) = self.loglikelihoods.last() {
            println!("   Final log likelihood: {:.3}", ll);
        }
        if let Some(perplexity) = self.perplexity {
            println!("   Perplexity: {:.3}", perplexity);
        }
        for topic in &self.topics {
            println!("🎯 Topic {:<3} {:<30} coherence: {:.3}, documents: {}",
                     topic.id, topic.name, topic.coherence_score, topic.documents.len());
            let words: Vec<String> = topic.words.iter()
                .map(|(word, prob)| format!("{} ({:.3})", word, prob))
                .collect();
            println!("   {}", words.join(", "));
        }
    }
}

/// Index of the largest value; the first one on ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
