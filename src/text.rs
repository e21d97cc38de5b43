//! Text composition for the classifier inputs.
//!
//! A long body always wins inclusion, but a short title/claim summary is
//! prepended as context rather than discarded, so classifiers see both a
//! headline-level and a content-level view.

/// Minimum normalized body length for the body to dominate the composition.
pub const PREFER_BODY_MIN_LEN: usize = 200;

/// Collapse all whitespace runs to single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed character length, used by length-gated decisions downstream.
pub fn text_len(s: &str) -> usize {
    s.trim().chars().count()
}

/// Merge title/claim/body into one canonical text representation.
///
/// 1. Each field is whitespace-normalized; missing fields become empty.
/// 2. "Short" form: `"{title} [SEP] {claim}"` when both are present, else
///    whichever one is.
/// 3. Body of at least `prefer_body_min_len` chars wins:
///    `"[SHORT] {short}\n[LONG] {body}"` when a short form exists, else the
///    body alone.
/// 4. Otherwise the short form, falling back to the (possibly empty) body.
pub fn build_text_input(
    title: Option<&str>,
    claim: Option<&str>,
    body: Option<&str>,
    prefer_body_min_len: usize,
) -> String {
    let title = normalize_ws(title.unwrap_or(""));
    let claim = normalize_ws(claim.unwrap_or(""));
    let body = normalize_ws(body.unwrap_or(""));

    let short = if !title.is_empty() && !claim.is_empty() {
        format!("{title} [SEP] {claim}")
    } else if !title.is_empty() {
        title
    } else {
        claim
    };

    if body.chars().count() >= prefer_body_min_len && !body.is_empty() {
        if !short.is_empty() {
            return format!("[SHORT] {short}\n[LONG] {body}");
        }
        return body;
    }

    if !short.is_empty() {
        short
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_body(len: usize) -> String {
        // Deterministic filler with no whitespace runs to collapse.
        "x".repeat(len)
    }

    #[test]
    fn long_body_with_title_and_claim_keeps_both_views() {
        let body = long_body(300);
        let out = build_text_input(Some("Title"), Some("Claim"), Some(&body), PREFER_BODY_MIN_LEN);
        let short_pos = out.find("[SHORT]").expect("short marker");
        let long_pos = out.find("[LONG]").expect("long marker");
        assert!(short_pos < long_pos);
        assert!(out.contains("Title [SEP] Claim"));
    }

    #[test]
    fn short_body_without_title_claim_passes_through_normalized() {
        let out = build_text_input(None, None, Some("  a   short\tbody  "), PREFER_BODY_MIN_LEN);
        assert_eq!(out, "a short body");
    }

    #[test]
    fn long_body_without_short_form_stands_alone() {
        let body = long_body(250);
        let out = build_text_input(None, None, Some(&body), PREFER_BODY_MIN_LEN);
        assert_eq!(out, body);
    }

    #[test]
    fn title_only_and_claim_only() {
        assert_eq!(build_text_input(Some("T"), None, None, PREFER_BODY_MIN_LEN), "T");
        assert_eq!(build_text_input(None, Some("C"), None, PREFER_BODY_MIN_LEN), "C");
    }

    #[test]
    fn short_body_loses_to_short_form() {
        let out = build_text_input(Some("T"), Some("C"), Some("tiny"), PREFER_BODY_MIN_LEN);
        assert_eq!(out, "T [SEP] C");
    }

    #[test]
    fn all_empty_yields_empty() {
        assert_eq!(build_text_input(None, None, None, PREFER_BODY_MIN_LEN), "");
        assert_eq!(build_text_input(Some("  "), Some(""), None, PREFER_BODY_MIN_LEN), "");
    }

    #[test]
    fn text_len_counts_trimmed_chars() {
        assert_eq!(text_len("  abc  "), 3);
        assert_eq!(text_len(""), 0);
        assert_eq!(text_len("adevărat"), 8);
    }
}
