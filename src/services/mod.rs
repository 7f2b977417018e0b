//! Recommendation engine and its collaborators
//!
//! `text`, `vectorizer`, `similarity` and `recommender` make up the engine;
//! `catalog` feeds it and `history` records what it served.

pub mod catalog;
pub mod history;
pub mod recommender;
pub mod similarity;
pub mod text;
pub mod vectorizer;

pub use history::HistoryStore;
pub use recommender::{Recommendation, Recommender};
