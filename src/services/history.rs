use crate::{
    error::AppResult,
    models::{RankedEntry, UserHistory, UserProfile},
    services::recommender::Recommendation,
};

/// Number of top recommendations written to history per request
pub const MAX_PERSISTED_RECOMMENDATIONS: usize = 3;

/// Storage for user history and the recommendations served to them
///
/// The recommendation engine never depends on this; a store failure only
/// means the request goes unrecorded.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Saves a history row and returns its id
    async fn save_user_history(&self, history: &UserHistory) -> AppResult<i64>;

    /// Saves ranked recommendations for a history row
    async fn save_recommendations(&self, user_id: i64, entries: &[RankedEntry]) -> AppResult<()>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

/// Records a served recommendation list
///
/// Writes the history row and then the top [`MAX_PERSISTED_RECOMMENDATIONS`]
/// entries. Returns the history id, or `None` if anything failed; failures are
/// logged and never propagated.
pub async fn record_recommendations(
    store: &dyn HistoryStore,
    profile: &UserProfile,
    skin_types: &[String],
    categories: &[String],
    recommendations: &[Recommendation<'_>],
) -> Option<i64> {
    let history = UserHistory::new(profile, skin_types, categories);

    let user_id = match store.save_user_history(&history).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "Failed to save user history");
            return None;
        }
    };

    let entries: Vec<RankedEntry> = recommendations
        .iter()
        .take(MAX_PERSISTED_RECOMMENDATIONS)
        .map(Recommendation::to_ranked_entry)
        .collect();

    if let Err(e) = store.save_recommendations(user_id, &entries).await {
        tracing::warn!(
            store = store.name(),
            user_id,
            error = %e,
            "Failed to save recommendations"
        );
        return None;
    }

    tracing::info!(
        store = store.name(),
        user_id,
        saved = entries.len(),
        "Recommendations recorded"
    );

    Some(user_id)
}
