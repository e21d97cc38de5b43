//! JSON-LD ClaimReview extraction.
//!
//! Fact-check articles embed their verdict as schema.org structured data in
//! `<script type="application/ld+json">` blocks. The node of interest is
//! either a direct `ClaimReview`, any object carrying both `claimReviewed`
//! and `reviewRating`, or one of those nested under `@graph` (or arbitrarily
//! deep in values and arrays — publishers nest inconsistently).

use scraper::{Html, Selector};
use serde_json::Value;

/// Fields pulled from one ClaimReview node. All optional; publishers omit
/// freely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimReview {
    pub claim: Option<String>,
    pub label: Option<String>,
    pub date_verified: Option<String>,
    pub speaker: Option<String>,
    pub source_url: Option<String>,
    pub title: Option<String>,
}

/// Scan every JSON-LD block in `html` and return the first ClaimReview found.
pub fn extract_from_html(html: &str) -> Option<ClaimReview> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;

    for script in doc.select(&sel) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue; // malformed blocks are common, skip silently
        };
        if let Some(node) = find_claim_review(&value) {
            return Some(from_node(node));
        }
    }
    None
}

/// Depth-first search for a ClaimReview node.
pub fn find_claim_review(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => {
            if map.get("@type").and_then(Value::as_str) == Some("ClaimReview") {
                return Some(value);
            }
            if map.contains_key("claimReviewed") && map.contains_key("reviewRating") {
                return Some(value);
            }
            if let Some(graph) = map.get("@graph") {
                if let Some(hit) = find_claim_review(graph) {
                    return Some(hit);
                }
            }
            map.values().find_map(find_claim_review)
        }
        Value::Array(items) => items.iter().find_map(find_claim_review),
        _ => None,
    }
}

fn from_node(node: &Value) -> ClaimReview {
    // Publishers occasionally double-escape entities inside JSON-LD strings.
    let str_at = |v: &Value, key: &str| -> Option<String> {
        v.get(key)
            .and_then(Value::as_str)
            .map(|s| html_escape::decode_html_entities(s.trim()).into_owned())
            .filter(|s| !s.is_empty())
    };

    let item = node.get("itemReviewed");
    let rating = node.get("reviewRating");

    ClaimReview {
        claim: str_at(node, "claimReviewed"),
        label: rating.and_then(|r| str_at(r, "alternateName")),
        date_verified: str_at(node, "datePublished"),
        speaker: item
            .and_then(|i| i.get("author"))
            .and_then(|a| str_at(a, "name")),
        source_url: item.and_then(|i| str_at(i, "url")),
        title: str_at(node, "name"),
    }
}
