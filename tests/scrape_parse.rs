// tests/scrape_parse.rs
//
// Offline dataset-builder tests: article HTML fixtures through the
// ClaimReview extractor, then the filter/dedup/CSV stages end to end.

use std::fs;
use std::path::PathBuf;

use claim_veracity_analyzer::scrape::{
    build_dataset, parse_article, write_outputs, FactCheckRecord,
};

const ARTICLE_HTML: &str = r#"<!doctype html>
<html lang="ro">
<head>
  <title>Verificare AFP</title>
  <script type="application/ld+json">
  {
    "@context": "https://schema.org",
    "@graph": [
      {"@type": "Organization", "name": "AFP"},
      {
        "@type": "ClaimReview",
        "claimReviewed": "Uniunea Europeană ar fi interzis legumele din grădinile proprii",
        "name": "Nu, UE nu a interzis legumele din grădinile proprii",
        "datePublished": "2024-05-14",
        "reviewRating": {"@type": "Rating", "alternateName": "Fals"},
        "itemReviewed": {
          "@type": "Claim",
          "url": "https://facebook.com/post/123",
          "author": {"@type": "Person", "name": "Pagina Adevărul Ascuns"}
        }
      }
    ]
  }
  </script>
</head>
<body><p>conținutul articolului</p></body>
</html>"#;

const URL: &str = "https://verificat.afp.com/doc.afp.com.34ab12c";

#[test]
fn article_fixture_parses_into_a_labeled_record() {
    let rec = parse_article(ARTICLE_HTML, URL);

    assert_eq!(rec.url, URL);
    assert_eq!(rec.id.len(), 64);
    assert_eq!(rec.record_type, "afp_factcheck");
    assert_eq!(rec.language, "ro");
    assert_eq!(
        rec.claim.as_deref(),
        Some("Uniunea Europeană ar fi interzis legumele din grădinile proprii")
    );
    assert_eq!(rec.label.as_deref(), Some("Fals"));
    assert_eq!(rec.label_norm().as_deref(), Some("FALS"));
    assert_eq!(rec.label_group(), Some("FALSE"));
    assert_eq!(rec.date_verified.as_deref(), Some("2024-05-14"));
    assert_eq!(rec.speaker.as_deref(), Some("Pagina Adevărul Ascuns"));
    assert_eq!(rec.source_url.as_deref(), Some("https://facebook.com/post/123"));
    assert!(rec.error.is_none());
}

#[test]
fn article_without_claimreview_yields_empty_record() {
    let rec = parse_article("<html><body>nimic aici</body></html>", URL);
    assert!(rec.claim.is_none());
    assert!(rec.label_group().is_none());
    assert!(rec.error.is_none());
}

#[test]
fn outputs_write_three_csvs_with_expected_shapes() {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let out_dir: PathBuf =
        std::env::temp_dir().join(format!("cva-scrape-{}-{nanos}", std::process::id()));

    let good = parse_article(ARTICLE_HTML, URL);
    let dup = parse_article(ARTICLE_HTML, "https://verificat.afp.com/doc.afp.com.copy");
    let failed = FactCheckRecord::failed("https://verificat.afp.com/doc.afp.com.err", "timeout");

    let all = vec![good, dup, failed];
    let dataset = build_dataset(&all);
    assert_eq!(dataset.len(), 1, "duplicate claim and error row must drop");

    write_outputs(&out_dir, &all, &dataset).expect("write outputs");

    let raw = fs::read_to_string(out_dir.join("afp_verificat_raw.csv")).expect("raw csv");
    let ds = fs::read_to_string(out_dir.join("afp_verificat_dataset.csv")).expect("dataset csv");
    let fl = fs::read_to_string(out_dir.join("afp_verificat_dataset_factual_like.csv"))
        .expect("factual csv");

    // Header + all three rows in raw, header + one row elsewhere.
    assert_eq!(raw.lines().count(), 4);
    assert_eq!(ds.lines().count(), 2);
    assert_eq!(fl.lines().count(), 2);

    assert!(raw.lines().next().expect("header").starts_with("id,url,type,language,claim"));
    assert!(raw.contains("timeout"));
    assert!(ds.contains("FALSE"));
    assert_eq!(
        fl.lines().next().expect("header"),
        "url,type,label,label_group,date_verified,speaker,claim,source_url"
    );
}
