use std::collections::{BTreeSet, HashSet};
use std::time::Instant;

use serde::Serialize;

use crate::models::{Product, RankedEntry};
use crate::services::similarity::SimilarityMatrix;
use crate::services::text::normalize_tag;
use crate::services::vectorizer::{SparseVector, TfidfVectorizer, DEFAULT_MAX_FEATURES};

/// A ranked product returned by [`Recommender::recommend`]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation<'a> {
    /// 1-based position in the result list
    pub rank: usize,
    /// Mean similarity to the filtered cohort
    pub score: f64,
    pub product: &'a Product,
}

impl Recommendation<'_> {
    /// The persisted view of this recommendation
    pub fn to_ranked_entry(&self) -> RankedEntry {
        RankedEntry {
            rank: self.rank,
            product_name: self.product.name.clone(),
            product_url: self.product.url.clone(),
        }
    }
}

/// Content-based recommendation engine
///
/// Built once per catalog: the TF-IDF space and the full similarity matrix are
/// computed up front and only read afterwards, so a single instance can be
/// shared across threads behind an `Arc` without locking.
#[derive(Debug)]
pub struct Recommender {
    products: Vec<Product>,
    vectorizer: TfidfVectorizer,
    similarity: SimilarityMatrix,
}

impl Recommender {
    /// Builds the engine with the default vocabulary cap
    pub fn build(products: Vec<Product>) -> Self {
        Self::with_max_features(products, DEFAULT_MAX_FEATURES)
    }

    /// Builds the engine keeping at most `max_features` vocabulary terms
    ///
    /// Product ids are reassigned to their catalog position so that they always
    /// address the matching similarity row.
    pub fn with_max_features(mut products: Vec<Product>, max_features: usize) -> Self {
        let start = Instant::now();

        for (idx, product) in products.iter_mut().enumerate() {
            product.id = idx;
        }

        let texts: Vec<&str> = products.iter().map(|p| p.combined_text.as_str()).collect();
        let mut vectorizer = TfidfVectorizer::new(max_features);
        let vectors = vectorizer.fit_transform(&texts);
        let similarity = SimilarityMatrix::build(&vectors);

        let empty_vectors = vectors.iter().filter(|v| v.is_zero()).count();
        if vectorizer.vocabulary_size() == 0 {
            tracing::warn!(
                products = products.len(),
                "Catalog has no usable text, recommendations will be empty"
            );
        } else if empty_vectors > 0 {
            tracing::warn!(
                count = empty_vectors,
                "Products without usable text will score zero"
            );
        }

        tracing::info!(
            products = products.len(),
            vocabulary_size = vectorizer.vocabulary_size(),
            max_features = vectorizer.max_features(),
            nonzero_weights = vectors.iter().map(SparseVector::nnz).sum::<usize>(),
            build_time_ms = start.elapsed().as_millis(),
            "Recommendation engine built"
        );

        Self {
            products,
            vectorizer,
            similarity,
        }
    }

    /// Recommends up to `top_n` products matching both filters
    ///
    /// An empty filter set places no constraint on its dimension. Eligible
    /// products are ranked by their mean similarity to the whole eligible
    /// cohort; equal scores keep catalog order. Returns an empty list when
    /// nothing matches, `top_n` is zero, or the catalog has no vocabulary.
    pub fn recommend(
        &self,
        skin_types: &HashSet<String>,
        categories: &HashSet<String>,
        top_n: usize,
    ) -> Vec<Recommendation<'_>> {
        if top_n == 0 || self.vectorizer.vocabulary_size() == 0 {
            return Vec::new();
        }

        let cohort = self.filter_indices(skin_types, categories);
        if cohort.is_empty() {
            tracing::debug!("No products match the requested filters");
            return Vec::new();
        }

        let scores = self.cohort_scores(&cohort);

        let mut ranked: Vec<(usize, f64)> = cohort.iter().map(|&j| (j, scores[j])).collect();
        // sort_by is stable, so ties keep ascending catalog order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_n);

        tracing::debug!(
            cohort_size = cohort.len(),
            returned = ranked.len(),
            "Recommendations ranked"
        );

        ranked
            .into_iter()
            .enumerate()
            .map(|(pos, (idx, score))| Recommendation {
                rank: pos + 1,
                score,
                product: &self.products[idx],
            })
            .collect()
    }

    /// Ids of products passing both filters, in catalog order
    pub fn filter_indices(
        &self,
        skin_types: &HashSet<String>,
        categories: &HashSet<String>,
    ) -> Vec<usize> {
        let skin_types = normalize_filter(skin_types);
        let categories = normalize_filter(categories);

        self.products
            .iter()
            .filter(|p| matches(&p.skin_type, &skin_types) && matches(&p.category, &categories))
            .map(|p| p.id)
            .collect()
    }

    /// Mean similarity of every product to the products in `cohort`
    ///
    /// The result has one entry per catalog product. An empty cohort yields
    /// all zeros.
    pub fn cohort_scores(&self, cohort: &[usize]) -> Vec<f64> {
        let mut scores = vec![0.0; self.products.len()];
        if cohort.is_empty() {
            return scores;
        }

        for row in cohort.iter().filter_map(|&i| self.similarity.row(i)) {
            for (score, sim) in scores.iter_mut().zip(row) {
                *score += sim;
            }
        }

        let n = cohort.len() as f64;
        for score in &mut scores {
            *score /= n;
        }

        scores
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: usize) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    /// Distinct skin type tags across the catalog, sorted
    pub fn skin_type_options(&self) -> Vec<String> {
        distinct_sorted(self.products.iter().flat_map(|p| p.skin_type.iter()))
    }

    /// Distinct category tags across the catalog, sorted
    pub fn category_options(&self) -> Vec<String> {
        distinct_sorted(self.products.iter().flat_map(|p| p.category.iter()))
    }
}

fn normalize_filter(values: &HashSet<String>) -> HashSet<String> {
    values
        .iter()
        .map(|v| normalize_tag(v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// True when the filter is empty or shares at least one tag with `tags`
fn matches(tags: &[String], filter: &HashSet<String>) -> bool {
    filter.is_empty() || tags.iter().any(|t| filter.contains(t))
}

fn distinct_sorted<'a>(tags: impl Iterator<Item = &'a String>) -> Vec<String> {
    tags.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn names(recs: &[Recommendation<'_>]) -> Vec<String> {
        recs.iter().map(|r| r.product.name.clone()).collect()
    }

    fn scenario() -> Recommender {
        Recommender::build(vec![
            Product::new(0, "A", "hydrating serum for dry skin", &["dry"], &["serum"]),
            Product::new(1, "B", "oil control cleanser oily skin", &["oily"], &["cleanser"]),
            Product::new(2, "C", "hydrating moisturizer dry skin", &["dry"], &["moisturizer"]),
        ])
    }

    #[test]
    fn test_dry_skin_scenario_excludes_oily_product() {
        let engine = scenario();
        let recs = engine.recommend(&set(&["dry"]), &set(&[]), 2);

        assert_eq!(recs.len(), 2);
        let mut got = names(&recs);
        got.sort();
        assert_eq!(got, vec!["A", "C"]);
        assert!(recs.iter().all(|r| r.score > 0.0));
        assert_eq!(recs[0].rank, 1);
        assert_eq!(recs[1].rank, 2);
    }

    #[test]
    fn test_both_filters_must_match() {
        let engine = scenario();
        let recs = engine.recommend(&set(&["dry"]), &set(&["serum", "cleanser"]), 5);
        assert_eq!(names(&recs), vec!["A"]);
    }

    #[test]
    fn test_filter_values_are_normalized() {
        let engine = scenario();
        let recs = engine.recommend(&set(&["  DRY "]), &set(&["Moisturizer"]), 5);
        assert_eq!(names(&recs), vec!["C"]);
    }

    #[test]
    fn test_empty_filters_match_whole_catalog() {
        let engine = scenario();
        let recs = engine.recommend(&set(&[]), &set(&[]), 10);
        assert_eq!(recs.len(), 3);

        let scores = engine.cohort_scores(&[0, 1, 2]);
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for rec in &recs {
            assert_eq!(rec.score, scores[rec.product.id]);
        }
    }

    #[test]
    fn test_unknown_tag_returns_empty() {
        let engine = scenario();
        assert!(engine
            .recommend(&set(&["nonexistent-tag"]), &set(&[]), 5)
            .is_empty());
        assert!(engine
            .recommend(&set(&["dry"]), &set(&["sunscreen"]), 5)
            .is_empty());
    }

    #[test]
    fn test_zero_top_n_returns_empty() {
        let engine = scenario();
        assert!(engine.recommend(&set(&[]), &set(&[]), 0).is_empty());
    }

    #[test]
    fn test_cardinality_is_min_of_top_n_and_cohort() {
        let engine = scenario();
        for k in 0..5 {
            let recs = engine.recommend(&set(&["dry"]), &set(&[]), k);
            assert_eq!(recs.len(), k.min(2));
        }
    }

    #[test]
    fn test_recommend_is_deterministic() {
        let engine = scenario();
        let first = engine.recommend(&set(&[]), &set(&[]), 3);
        let second = engine.recommend(&set(&[]), &set(&[]), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        // Disjoint vocabularies give an identity similarity matrix, so every
        // product in the cohort scores exactly 1/3
        let engine = Recommender::build(vec![
            Product::new(0, "Zinc", "zinc", &["oily"], &["serum"]),
            Product::new(1, "Mask", "clay", &["oily"], &["mask"]),
            Product::new(2, "Aloe", "aloe", &["oily"], &["gel"]),
        ]);
        let recs = engine.recommend(&set(&["oily"]), &set(&[]), 3);
        assert_eq!(names(&recs), vec!["Zinc", "Mask", "Aloe"]);
        assert_eq!(recs[0].score, recs[2].score);
    }

    #[test]
    fn test_empty_text_products_tie_at_zero_in_catalog_order() {
        let engine = Recommender::build(vec![
            Product::new(0, "Lotion", "body lotion", &["normal"], &["lotion"]),
            Product::new(1, "Second", "", &["dry"], &["toner"]),
            Product::new(2, "First", "", &["dry"], &["toner"]),
        ]);
        let recs = engine.recommend(&set(&["dry"]), &set(&[]), 5);
        assert_eq!(names(&recs), vec!["Second", "First"]);
        assert!(recs.iter().all(|r| r.score == 0.0));
        assert_eq!(engine.similarity().get(1, 1), Some(0.0));
        assert_eq!(engine.similarity().get(0, 0), Some(1.0));
    }

    #[test]
    fn test_scores_restricted_to_cohort_but_computed_on_full_width() {
        let engine = scenario();
        let scores = engine.cohort_scores(&[0, 2]);
        assert_eq!(scores.len(), 3);
        // B is outside the cohort yet still has a score, it is just never returned
        assert!(scores[1] > 0.0);
        assert_eq!(engine.cohort_scores(&[]), vec![0.0; 3]);
    }

    #[test]
    fn test_no_vocabulary_returns_empty() {
        let engine = Recommender::build(vec![
            Product::new(0, "Blank", "", &["dry"], &["serum"]),
            Product::new(1, "Symbols", "! ?", &["dry"], &["serum"]),
        ]);
        assert_eq!(engine.vocabulary_size(), 0);
        assert!(engine.recommend(&set(&[]), &set(&[]), 5).is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let engine = Recommender::build(Vec::new());
        assert!(engine.is_empty());
        assert!(engine.similarity().is_empty());
        assert!(engine.recommend(&set(&[]), &set(&[]), 5).is_empty());
    }

    #[test]
    fn test_vocabulary_capped_by_max_features() {
        let engine = Recommender::with_max_features(
            vec![
                Product::new(0, "X", "rose water toner", &[], &[]),
                Product::new(1, "Y", "rose water mist", &[], &[]),
            ],
            2,
        );
        assert_eq!(engine.vocabulary_size(), 2);
        let sim = engine.similarity().get(0, 1).unwrap();
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ids_follow_catalog_position() {
        let engine = Recommender::build(vec![
            Product::new(7, "X", "rose water toner", &[], &[]),
            Product::new(7, "Y", "rose water mist", &[], &[]),
        ]);
        assert_eq!(engine.product(0).unwrap().name, "X");
        assert_eq!(engine.product(1).unwrap().id, 1);
        assert!(engine.product(2).is_none());
    }

    #[test]
    fn test_filter_options_are_sorted_and_distinct() {
        let engine = scenario();
        assert_eq!(engine.skin_type_options(), vec!["dry", "oily"]);
        assert_eq!(
            engine.category_options(),
            vec!["cleanser", "moisturizer", "serum"]
        );
    }

    #[test]
    fn test_ranked_entry_carries_url() {
        let engine = Recommender::build(vec![Product::new(0, "Toner", "rose toner", &[], &[])
            .with_url("https://wardah.example/toner")]);
        let recs = engine.recommend(&set(&[]), &set(&[]), 1);
        let entry = recs[0].to_ranked_entry();
        assert_eq!(entry.rank, 1);
        assert_eq!(entry.product_name, "Toner");
        assert_eq!(entry.product_url.as_deref(), Some("https://wardah.example/toner"));
    }
}
