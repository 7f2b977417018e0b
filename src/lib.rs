//! Content-based skincare product recommendations.
//!
//! A catalog is loaded once, vectorized with TF-IDF over unigrams and bigrams,
//! and turned into a full cosine similarity matrix. Queries filter the catalog
//! by skin type and category and rank the matching products by their mean
//! similarity to the filtered cohort.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
