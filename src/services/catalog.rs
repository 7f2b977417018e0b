use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::{
    error::AppResult,
    models::Product,
    services::text::{normalize_name, parse_tag_list},
};

/// Raw row of the product table
#[derive(Debug, Deserialize)]
struct ProductRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    about: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ingredients: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    skin_type: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    combined_text: Option<String>,
}

/// Raw row of the image table
#[derive(Debug, Deserialize)]
struct ImageRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    image_url: Option<String>,
}

/// Loads the product catalog, merging image URLs when an image table is given
///
/// The image table is optional: if it cannot be read the catalog still loads,
/// just without images. Products are joined to images by normalized name and
/// the first image row for a name wins.
pub fn load_catalog(products_path: &Path, images_path: Option<&Path>) -> AppResult<Vec<Product>> {
    let mut products = read_products(products_path)?;

    let images = match images_path {
        Some(path) => match read_images(path) {
            Ok(images) => {
                tracing::info!(path = %path.display(), entries = images.len(), "Image table loaded");
                images
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load image table, continuing without images");
                HashMap::new()
            }
        },
        None => HashMap::new(),
    };

    let mut matched = 0usize;
    for product in &mut products {
        if let Some(url) = images.get(&normalize_name(&product.name)) {
            product.image_url = Some(url.clone());
            matched += 1;
        }
    }

    let percentage = if products.is_empty() {
        0.0
    } else {
        (matched as f64 / products.len() as f64 * 1000.0).round() / 10.0
    };

    tracing::info!(
        products = products.len(),
        with_image = matched,
        percentage,
        "Catalog loaded"
    );

    Ok(products)
}

fn read_products(path: &Path) -> AppResult<Vec<Product>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut products = Vec::new();

    for (row, record) in reader.deserialize::<ProductRecord>().enumerate() {
        let record = record?;
        if record.name.trim().is_empty() {
            tracing::warn!(row = row + 1, "Skipping catalog row without a name");
            continue;
        }
        products.push(into_product(products.len(), record));
    }

    Ok(products)
}

fn into_product(id: usize, record: ProductRecord) -> Product {
    let name = record.name.split_whitespace().collect::<Vec<_>>().join(" ");
    let skin_type = parse_tag_list(&record.skin_type);
    let category = parse_tag_list(&record.category);
    let description = description_of(record.about.as_deref(), record.description.as_deref());

    let combined_text = record
        .combined_text
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| {
            build_combined_text(&[
                &name,
                &description,
                &record.ingredients,
                &category.join(" "),
                &skin_type.join(" "),
            ])
        });

    Product {
        id,
        name,
        combined_text,
        description,
        ingredients: record.ingredients.trim().to_string(),
        skin_type,
        category,
        url: record.url.and_then(|u| clean_value(&u)),
        image_url: None,
    }
}

/// Product text from `about`, falling back to `description` when blank
fn description_of(about: Option<&str>, description: Option<&str>) -> String {
    [about, description]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Joins the non-blank descriptive fields with single spaces
pub fn build_combined_text(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn read_images(path: &Path) -> AppResult<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut images = HashMap::new();

    for record in reader.deserialize::<ImageRecord>() {
        let record = record?;
        let Some(url) = record.image_url.as_deref().and_then(normalize_image_url) else {
            continue;
        };
        let key = normalize_name(&record.name);
        if !key.is_empty() {
            images.entry(key).or_insert(url);
        }
    }

    Ok(images)
}

/// Trims a cell, treating blanks and `nan` as missing
fn clean_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(value.to_string())
    }
}

/// Cleans an image URL and completes a missing scheme with https
pub fn normalize_image_url(raw: &str) -> Option<String> {
    let url = clean_value(raw)?;
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url)
    } else if url.starts_with("//") {
        Some(format!("https:{}", url))
    } else {
        Some(format!("https://{}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const PRODUCTS: &str = "\
name,about,ingredients,category,skin_type,url,combined_text
Hydra  Rose Serum,Hydrating serum,Rose water,\"['Serum']\",\"['Dry', 'Normal']\",https://wardah.example/serum,
Acne Wash,Oil control cleanser,Salicylic acid,\"['Cleanser', 'Face Wash']\",\"['Oily']\",nan,acne oil control wash
,Orphan row,,,,,
Night Cream,,,\"['Moisturizer']\",[],,
";

    #[test]
    fn test_load_catalog_parses_products() {
        let dir = TempDir::new().unwrap();
        let products_path = write_file(&dir, "products.csv", PRODUCTS);

        let products = load_catalog(&products_path, None).unwrap();

        assert_eq!(products.len(), 3);
        assert_eq!(products[0].id, 0);
        assert_eq!(products[0].name, "Hydra Rose Serum");
        assert_eq!(products[0].skin_type, vec!["dry", "normal"]);
        assert_eq!(products[0].category, vec!["serum"]);
        assert_eq!(products[0].url.as_deref(), Some("https://wardah.example/serum"));
        assert_eq!(products[1].category, vec!["cleanser", "face wash"]);
        assert_eq!(products[1].url, None);
        // Orphan row skipped, ids stay positional
        assert_eq!(products[2].id, 2);
        assert_eq!(products[2].name, "Night Cream");
        assert!(products[2].skin_type.is_empty());
    }

    #[test]
    fn test_combined_text_built_when_missing() {
        let dir = TempDir::new().unwrap();
        let products_path = write_file(&dir, "products.csv", PRODUCTS);

        let products = load_catalog(&products_path, None).unwrap();

        assert_eq!(
            products[0].combined_text,
            "Hydra Rose Serum Hydrating serum Rose water serum dry normal"
        );
        assert_eq!(products[1].combined_text, "acne oil control wash");
        assert_eq!(products[2].combined_text, "Night Cream moisturizer");
    }

    #[test]
    fn test_images_joined_by_normalized_name() {
        let dir = TempDir::new().unwrap();
        let products_path = write_file(&dir, "products.csv", PRODUCTS);
        let images_path = write_file(
            &dir,
            "images.csv",
            "name,image_url\n\
             hydra rose serum,//cdn.example/serum.png\n\
             HYDRA ROSE SERUM,https://cdn.example/duplicate.png\n\
             Acne Wash,nan\n\
             Night Cream,cdn.example/cream.webp\n",
        );

        let products = load_catalog(&products_path, Some(&images_path)).unwrap();

        assert_eq!(
            products[0].image_url.as_deref(),
            Some("https://cdn.example/serum.png")
        );
        assert_eq!(products[1].image_url, None);
        assert_eq!(
            products[2].image_url.as_deref(),
            Some("https://cdn.example/cream.webp")
        );
    }

    #[test]
    fn test_description_column_is_accepted() {
        let dir = TempDir::new().unwrap();
        let products_path = write_file(
            &dir,
            "products.csv",
            "name,description,category,skin_type\n\
             Aloe Gel,Soothing aloe gel,Gel,Normal\n",
        );

        let products = load_catalog(&products_path, None).unwrap();

        assert_eq!(products[0].description, "Soothing aloe gel");
        assert_eq!(products[0].combined_text, "Aloe Gel Soothing aloe gel gel normal");
    }

    #[test]
    fn test_about_preferred_over_description() {
        let dir = TempDir::new().unwrap();
        let products_path = write_file(
            &dir,
            "products.csv",
            "name,about,description,category,skin_type\n\
             Aloe Gel,Cooling gel,Soothing aloe gel,Gel,Normal\n\
             Clay Mask,,Purifying clay,Mask,Oily\n",
        );

        let products = load_catalog(&products_path, None).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].description, "Cooling gel");
        assert_eq!(products[1].description, "Purifying clay");
    }

    #[test]
    fn test_missing_image_table_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let products_path = write_file(&dir, "products.csv", PRODUCTS);
        let missing = dir.path().join("missing.csv");

        let products = load_catalog(&products_path, Some(&missing)).unwrap();

        assert_eq!(products.len(), 3);
        assert!(products.iter().all(|p| p.image_url.is_none()));
    }

    #[test]
    fn test_missing_product_table_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = load_catalog(&dir.path().join("nope.csv"), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_image_url() {
        assert_eq!(
            normalize_image_url(" https://a.example/x.png "),
            Some("https://a.example/x.png".to_string())
        );
        assert_eq!(
            normalize_image_url("http://a.example/x.png"),
            Some("http://a.example/x.png".to_string())
        );
        assert_eq!(
            normalize_image_url("//a.example/x.png"),
            Some("https://a.example/x.png".to_string())
        );
        assert_eq!(
            normalize_image_url("a.example/x.png"),
            Some("https://a.example/x.png".to_string())
        );
        assert_eq!(normalize_image_url("NaN"), None);
        assert_eq!(normalize_image_url("  "), None);
    }

    #[test]
    fn test_build_combined_text_skips_blanks() {
        assert_eq!(build_combined_text(&["a", " ", "", " b "]), "a b");
        assert_eq!(build_combined_text(&[]), "");
    }
}
