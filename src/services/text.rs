//! Text normalization shared by the catalog loader and the vectorizer.
//!
//! Tags and names are normalized once at load time so that filtering at query
//! time is plain set intersection.

/// Splits text into lowercase word tokens
///
/// A token is a run of alphanumeric characters or underscores at least two
/// characters long. Everything else acts as a separator.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_string())
        .collect()
}

/// Expands tokens into unigrams followed by contiguous n-grams up to `max_n`
///
/// N-grams are joined with a single space, e.g. `["dry", "skin"]` yields
/// `["dry", "skin", "dry skin"]` for `max_n = 2`.
pub fn ngrams(tokens: &[String], max_n: usize) -> Vec<String> {
    let mut terms: Vec<String> = tokens.to_vec();

    for n in 2..=max_n {
        if tokens.len() < n {
            break;
        }
        terms.extend(tokens.windows(n).map(|w| w.join(" ")));
    }

    terms
}

/// Normalizes a tag: trimmed, inner whitespace collapsed, lowercase
pub fn normalize_tag(tag: &str) -> String {
    tag.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalizes a product name into the key used to join catalog tables
pub fn normalize_name(name: &str) -> String {
    normalize_tag(name)
}

/// Parses a list cell from the catalog into normalized tags
///
/// Accepts list literals such as `['oily', 'dry']` as well as plain
/// comma-separated values. Duplicates are dropped, first occurrence wins.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Vec::new();
    }

    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    let mut tags: Vec<String> = Vec::new();
    for part in inner.split(',') {
        let tag = normalize_tag(part.trim().trim_matches(|c: char| c == '\'' || c == '"'));
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    tags
}
