use serde::{Deserialize, Serialize};

pub mod history;
pub mod product;

pub use history::{RankedEntry, UserHistory, UserProfile};
pub use product::Product;

use crate::services::recommender::Recommendation;

/// Body of `POST /api/v1/recommendations`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub skin_types: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Values of zero or below yield an empty list
    #[serde(default)]
    pub top_n: Option<i64>,
    /// When present the served list is recorded to history
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Response of `POST /api/v1/recommendations`
#[derive(Debug, Serialize)]
pub struct RecommendationResponse<'a> {
    pub count: usize,
    pub recommendations: Vec<Recommendation<'a>>,
    /// History row id when the request was recorded
    pub history_id: Option<i64>,
}

/// Filter values available in the catalog
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FilterOptions {
    pub skin_types: Vec<String>,
    pub categories: Vec<String>,
}
