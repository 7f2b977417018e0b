use std::collections::{BTreeMap, HashMap, HashSet};

use super::text::{ngrams, tokenize};

/// Default cap on the number of terms kept in the vocabulary
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Largest n-gram extracted from product text (unigrams and bigrams)
const MAX_NGRAM: usize = 2;

/// Sparse term-weight vector, indices sorted ascending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Builds a vector from unordered (index, value) pairs, dropping zeros
    fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.retain(|(_, v)| *v != 0.0);
        pairs.sort_by_key(|(i, _)| *i);
        let (indices, values) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Euclidean length
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product via a merge over both sorted index lists
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut a, mut b) = (0, 0);
        let mut sum = 0.0;

        while a < self.indices.len() && b < other.indices.len() {
            match self.indices[a].cmp(&other.indices[b]) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[a] * other.values[b];
                    a += 1;
                    b += 1;
                }
            }
        }

        sum
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }
}

/// TF-IDF vectorizer over unigrams and bigrams
///
/// Fitting fixes the vocabulary and IDF weights. Vocabulary terms are the
/// `max_features` terms with the highest corpus-wide count (ties broken
/// alphabetically) and feature indices follow alphabetical term order.
///
/// IDF is smoothed, `ln((1 + n) / (1 + df)) + 1`, so a term present in every
/// document still carries weight. Output vectors are L2-normalized.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl TfidfVectorizer {
    /// Creates an unfitted vectorizer
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    /// Fits the vocabulary on `documents` and returns one vector per document, in order
    ///
    /// An empty corpus, or one with no extractable terms, leaves a zero-dimension
    /// space and every returned vector is zero.
    pub fn fit_transform(&mut self, documents: &[&str]) -> Vec<SparseVector> {
        let analyzed: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| ngrams(&tokenize(doc), MAX_NGRAM))
            .collect();

        // BTreeMap keeps terms alphabetical, which makes tie-breaking deterministic
        let mut term_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();

        for terms in &analyzed {
            let mut seen: HashSet<&str> = HashSet::new();
            for term in terms {
                *term_counts.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(&str, usize)> = term_counts.into_iter().collect();
        // Stable sort: equal counts stay alphabetical
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);

        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n_docs = documents.len() as f64;
        self.vocabulary = kept
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();
        self.idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        tracing::debug!(
            documents = documents.len(),
            vocabulary_size = self.vocabulary.len(),
            "TF-IDF vocabulary fitted"
        );

        analyzed.iter().map(|terms| self.weigh(terms)).collect()
    }

    /// Vectorizes a text with the fitted vocabulary; unknown terms are ignored
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&ngrams(&tokenize(text), MAX_NGRAM))
    }

    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in terms {
            if let Some(&idx) = self.vocabulary.get(term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector::from_pairs(
            counts
                .into_iter()
                .map(|(idx, tf)| (idx, tf * self.idf[idx]))
                .collect(),
        );
        vector.normalize();
        vector
    }

    /// Number of dimensions of the fitted space
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// IDF weight of a vocabulary term
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&idx| self.idf[idx])
    }
}
