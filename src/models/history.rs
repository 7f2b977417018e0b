use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MIN_AGE: u8 = 10;
pub const MAX_AGE: u8 = 80;

/// Who asked for recommendations, as entered in the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(default = "default_username")]
    pub username: String,
    pub age: u8,
    pub gender: String,
}

fn default_username() -> String {
    "Guest".to_string()
}

impl UserProfile {
    /// Checks the profile before it is persisted
    pub fn validate(&self) -> AppResult<()> {
        if self.username.trim().is_empty() {
            return Err(AppError::InvalidInput("username must not be empty".to_string()));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(AppError::InvalidInput(format!(
                "age must be between {} and {}",
                MIN_AGE, MAX_AGE
            )));
        }
        Ok(())
    }
}

/// A history row: the profile plus the filters it was served with
#[derive(Debug, Clone, PartialEq)]
pub struct UserHistory {
    pub username: String,
    pub age: u8,
    pub gender: String,
    /// Comma-joined skin type filters
    pub skin_type: String,
    /// Comma-joined category filters
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl UserHistory {
    pub fn new(profile: &UserProfile, skin_types: &[String], categories: &[String]) -> Self {
        Self {
            username: profile.username.trim().to_string(),
            age: profile.age,
            gender: profile.gender.clone(),
            skin_type: skin_types.join(","),
            category: categories.join(","),
            created_at: Utc::now(),
        }
    }
}

/// One ranked recommendation as handed to the history store
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedEntry {
    /// 1-based position in the result list
    pub rank: usize,
    pub product_name: String,
    pub product_url: Option<String>,
}
