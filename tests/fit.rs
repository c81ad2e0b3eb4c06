use embed_lda::eval::loglikelihood;
use embed_lda::{
    Corpus, CorpusConfig, CountState, DocTermMatrix, EmbeddedLda, LdaConfig, Priors, TopicReport, Vocabulary,
    WordVectors,
};

fn reference_matrix() -> DocTermMatrix {
    DocTermMatrix::from_dense(&[
        vec![1, 1],
        vec![2, 1],
        vec![3, 1],
        vec![4, 1],
        vec![5, 8],
        vec![6, 1],
    ])
    .unwrap()
}

/// 16 documents alternating between two disjoint 12-word vocabularies.
fn separable_matrix() -> DocTermMatrix {
    let rows: Vec<Vec<usize>> = (0..16)
        .map(|d| {
            let mut row = vec![0; 24];
            let base = if d % 2 == 0 { 0 } else { 12 };
            for j in 0..12 {
                row[base + j] = 1 + (d + j) % 3;
            }
            row
        })
        .collect();
    DocTermMatrix::from_dense(&rows).unwrap()
}

fn separable_embeddings() -> (WordVectors, Vocabulary) {
    let mut vectors = WordVectors::new(3);
    let mut tokens = Vec::new();
    for w in 0..24 {
        let token = format!("word{}", w);
        let jitter = (w % 5) as f64 * 0.1;
        let vector = if w < 12 { vec![1.0, jitter, 0.2] } else { vec![jitter, 1.0, -0.2] };
        vectors.insert(token.clone(), vector).unwrap();
        tokens.push(token);
    }
    (vectors, Vocabulary::new(tokens))
}

#[test]
fn reference_corpus_converges_near_documented_loglikelihood() {
    let initial = {
        let state = CountState::initialize(&reference_matrix(), 2).unwrap();
        loglikelihood(&state, &Priors::symmetric(0.1, 0.01, 2))
    };

    for seed in 0..20 {
        let config = LdaConfig::new(2).with_n_iter(100).with_seed(seed).with_lamda(1.0);
        let mut lda = EmbeddedLda::new(config).unwrap();
        let model = lda.fit(&reference_matrix()).unwrap();

        assert!((model.loglikelihoods[0] - initial).abs() < 1e-9);
        let last = *model.loglikelihoods.last().unwrap();
        assert!(last > initial, "seed {}: {} <= {}", seed, last, initial);
        // The documented value for the reference generator is about -40.4.
        assert!((-60.0..=-30.0).contains(&last), "seed {}: {}", seed, last);

        for row in &model.topic_word {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        assert_eq!(model.nz.iter().sum::<usize>(), 33);
        assert_eq!(model.ndz.iter().flatten().sum::<usize>(), 33);
    }
}

#[test]
fn fitted_counts_satisfy_invariants() {
    let config = LdaConfig::new(3).with_n_iter(50).with_seed(17);
    let mut lda = EmbeddedLda::new(config).unwrap();
    let model = lda.fit(&separable_matrix()).unwrap();

    for z in 0..3 {
        let by_word: usize = model.nzw[z].iter().sum();
        let by_doc: usize = model.ndz.iter().map(|row| row[z]).sum();
        assert_eq!(by_word, model.nz[z]);
        assert_eq!(by_doc, model.nz[z]);
    }
}

#[test]
fn transform_recovers_training_mixtures() {
    let dtm = separable_matrix();
    let config = LdaConfig::new(2).with_n_iter(200).with_seed(5).with_lamda(1.0).with_alpha(0.01);
    let mut lda = EmbeddedLda::new(config).unwrap();
    let doc_topic = lda.fit_transform(&dtm).unwrap();

    let inferred = lda.transform_with(&dtm, 100, 1e-12).unwrap();
    for (fitted, estimate) in doc_topic.iter().zip(&inferred) {
        assert!((estimate.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        for (a, b) in fitted.iter().zip(estimate) {
            assert!((a - b).abs() < 0.02, "fitted {:?}, inferred {:?}", fitted, estimate);
        }
    }
}

#[test]
fn embedding_adjusted_fit_produces_distributions() {
    let dtm = separable_matrix();
    let (vectors, vocabulary) = separable_embeddings();
    let config = LdaConfig::new(2).with_n_iter(40).with_seed(13).with_refresh(5);
    let mut lda = EmbeddedLda::new(config)
        .unwrap()
        .with_embeddings(vectors, vocabulary);
    let model = lda.fit(&dtm).unwrap();

    for row in model.topic_word.iter().chain(&model.doc_topic) {
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(row.iter().all(|&p| p >= 0.0));
    }
    assert_eq!(model.loglikelihoods.len(), 9);
    let perplexity = model.perplexity.unwrap();
    assert!(perplexity > 1.0 && perplexity < 16.0);
    assert!((lda.perplexity(&dtm).unwrap() - perplexity).abs() < 1e-9);
}

#[test]
fn missing_embedding_aborts_the_fit() {
    let dtm = separable_matrix();
    let (_, vocabulary) = separable_embeddings();
    let mut vectors = WordVectors::new(3);
    vectors.insert("word0", vec![1.0, 0.0, 0.0]).unwrap();

    let config = LdaConfig::new(2).with_n_iter(4).with_seed(1);
    let mut lda = EmbeddedLda::new(config).unwrap().with_embeddings(vectors, vocabulary);
    assert!(matches!(lda.fit(&dtm), Err(embed_lda::LdaError::MissingEmbedding { .. })));
}

#[test]
fn transform_rejects_foreign_vocabulary() {
    let config = LdaConfig::new(2).with_n_iter(5).with_seed(1);
    let mut lda = EmbeddedLda::new(config).unwrap();
    lda.fit(&reference_matrix()).unwrap();

    let other = DocTermMatrix::from_dense(&[vec![1, 2, 3]]).unwrap();
    assert!(matches!(lda.transform(&other), Err(embed_lda::LdaError::ShapeMismatch { .. })));
}

#[test]
fn raw_texts_fit_into_a_report() {
    let texts = [
        "river bank fishing boat river water",
        "loan money bank interest money",
        "boat water river fishing",
        "interest loan money credit",
        "water river boat",
        "credit money loan bank",
    ];
    let corpus = Corpus::from_texts(&texts, &CorpusConfig::default()).unwrap();
    let config = LdaConfig::new(2).with_n_iter(30).with_seed(3);
    let mut lda = EmbeddedLda::new(config.clone()).unwrap();
    let model = lda.fit(&corpus.matrix).unwrap();

    let report = TopicReport::build(model, &corpus.vocabulary, &corpus.matrix, &config, 4).unwrap();
    assert_eq!(report.n_documents, texts.len());
    assert_eq!(report.vocabulary_size, corpus.vocabulary.len());
    assert_eq!(report.topics.len(), 2);
    let assigned: usize = report.topics.iter().map(|t| t.documents.len()).sum();
    assert_eq!(assigned, texts.len());
    for topic in &report.topics {
        assert_eq!(topic.words.len(), 4);
        assert_eq!(topic.name.split('_').count(), 3);
    }
}
