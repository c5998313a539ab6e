//! Query variant generation.
//!
//! Each source gets an ordered list of candidate search strings, most
//! specific first, deduplicated while preserving first-seen order. The
//! fallback runner walks the list until a variant yields a validated
//! result set.

use crate::identity::CardIdentity;

/// Case- and whitespace-insensitive dedup preserving first-seen order,
/// so the most specific spelling of a duplicate wins. Variants shorter
/// than two characters are dropped (a bare "ex" would match everything).
fn dedup_variants(variants: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut result = Vec::new();
    for v in variants {
        let trimmed = v.trim().to_string();
        if trimmed.len() < 2 {
            continue;
        }
        let key: String = trimmed
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        result.push(trimmed);
    }
    result
}

/// Variants for the domestic buylist search, most specific first:
/// name + rarity, name + full identifier, name alone.
pub fn domestic_variants(identity: &CardIdentity) -> Vec<String> {
    let name = identity.local_name.trim();
    let mut variants = Vec::new();

    if let Some(token) = identity.rarity_token() {
        variants.push(format!("{} {}", name, token));
    }
    if !identity.number.is_empty() {
        variants.push(format!("{} {}", name, identity.number));
    }
    variants.push(name.to_string());

    dedup_variants(variants)
}

/// The single sold-listings query for the ungraded export search:
/// name + cleaned identifier + franchise marker.
pub fn export_ungraded_query(identity: &CardIdentity) -> String {
    let number = identity.clean_number();
    let parts = [identity.name.as_str(), number.as_str(), "Pokemon"];
    parts
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Variants for the graded-top export search. Japanese-print variants
/// carry a locale marker and come first when the card is a Japanese
/// print; the grade phrase is appended to every variant.
pub fn export_graded_variants(identity: &CardIdentity) -> Vec<String> {
    let name = &identity.name;
    let full = identity.clean_number();
    let bare = identity.bare_number();
    let mut variants = Vec::new();

    if identity.is_japanese && !bare.is_empty() {
        variants.push(format!("{} {} Japanese PSA 10", name, bare));
        variants.push(format!("{} {} Japanese Pokemon PSA 10", name, bare));
    }

    if !full.is_empty() {
        variants.push(format!("{} {} PSA 10", name, full));
        variants.push(format!("{} {} Pokemon PSA 10", name, full));
    }
    if !bare.is_empty() {
        variants.push(format!("{} {} Pokemon PSA 10", name, bare));
        variants.push(format!("{} {} PSA 10", name, bare));
    }
    variants.push(format!("{} Pokemon PSA 10", name));

    if identity.is_japanese {
        if !full.is_empty() {
            variants.push(format!("{} {} Japanese PSA 10", name, full));
        }
        variants.push(format!("{} Japanese Pokemon PSA 10", name));
    }

    dedup_variants(variants)
}

/// Query string for the secondary export source. Japanese prints append
/// the locale marker so the result filter can pick the right print run.
pub fn price_charting_query(identity: &CardIdentity) -> String {
    let clean_name: String = identity
        .name
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let clean_number: String = identity
        .number
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '/')
        .collect();

    let base = format!("{} {}", clean_name.trim(), clean_number.trim())
        .trim()
        .to_string();
    if identity.is_japanese {
        format!("{} Japanese", base)
    } else {
        base
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
