use serde::Serialize;

use crate::services::text::normalize_tag;

/// A catalog product, immutable once loaded
///
/// `id` is the product's position in the catalog and doubles as its row and
/// column in the similarity matrix.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Product {
    pub id: usize,
    pub name: String,
    /// Concatenated descriptive text, the unit of vectorization
    #[serde(skip_serializing)]
    pub combined_text: String,
    pub description: String,
    pub ingredients: String,
    /// Normalized skin type tags
    pub skin_type: Vec<String>,
    /// Normalized category tags
    pub category: Vec<String>,
    /// Product page link
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl Product {
    /// Creates a product with normalized tags and no optional fields
    pub fn new(
        id: usize,
        name: impl Into<String>,
        combined_text: impl Into<String>,
        skin_type: &[&str],
        category: &[&str],
    ) -> Self {
        Self {
            id,
            name: name.into(),
            combined_text: combined_text.into(),
            description: String::new(),
            ingredients: String::new(),
            skin_type: normalize_tags(skin_type.iter().copied()),
            category: normalize_tags(category.iter().copied()),
            url: None,
            image_url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Normalizes tags, dropping blanks and duplicates
pub fn normalize_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = normalize_tag(tag);
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}
