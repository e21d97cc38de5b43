// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /predict (full nested report shape; empty request -> 400)
// - GET /debug/source-prior

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use claim_veracity_analyzer::api::{create_router, AppState};
use claim_veracity_analyzer::config::PipelineConfig;
use claim_veracity_analyzer::pipeline::VeracityPipeline;
use claim_veracity_analyzer::scorers::mock_scorers;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Unique artifacts dir with a usable fusion model and reputation table.
fn temp_artifacts(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("cva-api-{tag}-{}-{nanos}", std::process::id()));
    fs::create_dir_all(dir.join("fusion")).expect("mkdir fusion");
    fs::create_dir_all(dir.join("source_veracity")).expect("mkdir source_veracity");
    fs::write(
        dir.join("fusion/fusion_lr.json"),
        r#"{"features": {}, "intercept": 0.0}"#,
    )
    .expect("write model");
    fs::write(
        dir.join("source_veracity/source_veracity_table.csv"),
        "source_domain,source_score_final,p_true_final,evidence\n\
         agerpres.ro,0.9,0.95,table:agg\n",
    )
    .expect("write table");
    dir
}

/// Build the same Router the binary uses, with mock scorers.
fn test_router(tag: &str) -> Router {
    let config = PipelineConfig {
        artifacts_dir: temp_artifacts(tag),
        ..PipelineConfig::default()
    };
    let pipeline = VeracityPipeline::new(config, mock_scorers());
    pipeline.load().expect("load artifacts");
    create_router(AppState {
        pipeline: Arc::new(pipeline),
    })
}

async fn json_body(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router("health");

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "ok");
}

#[tokio::test]
async fn api_predict_returns_full_nested_report() {
    let app = test_router("predict");

    let payload = json!({
        "title": "Guvernul anunță noi măsuri economice",
        "claim": "Premierul a declarat că inflația va scădea sub 5% anul viitor.",
        "body": "",
        "source_url": "https://www.agerpres.ro/economic/2024/stire"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /predict");

    let resp = app.oneshot(req).await.expect("oneshot /predict");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;

    // Contract checks for downstream consumers
    let input = v.get("input").expect("missing 'input'");
    assert_eq!(input["source_domain"], "agerpres.ro");
    assert!(input["text_len"].as_u64().expect("text_len") > 0);

    let comp = v.get("component_outputs").expect("missing 'component_outputs'");
    for key in [
        "p_clickbait",
        "p_true_content",
        "source_score",
        "p_true_source",
        "source_evidence",
    ] {
        assert!(comp.get(key).is_some(), "missing component_outputs.{key}");
    }

    let fusion = v.get("fusion").expect("missing 'fusion'");
    assert!(fusion.get("final_p_true").is_some());
    assert!(fusion.get("threshold").is_some());
    assert!(fusion.get("binary_label").is_some());
    assert!(fusion.get("features").is_some());

    let fine6 = v.get("fine6").expect("missing 'fine6'");
    assert!(fine6.get("fine6_label").is_some());
    assert!(fine6.get("raw_fine6_label").is_some());
    assert!(fine6.get("top_prob").is_some());
    assert!(fine6["probs"].is_object());

    assert!(v["gated"].get("gated_label").is_some(), "missing gated_label");
}

#[tokio::test]
async fn api_predict_empty_request_is_bad_request() {
    let app = test_router("empty");

    let req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .expect("build POST /predict");

    let resp = app.oneshot(req).await.expect("oneshot /predict");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = json_body(resp).await;
    assert_eq!(v["error"]["kind"], "empty-input");
    assert!(v["error"]["message"].is_string());
}

#[tokio::test]
async fn api_predict_blank_fields_are_also_empty() {
    let app = test_router("blank");

    let payload = json!({ "title": "   ", "claim": "", "body": "\n", "source_url": " " });
    let req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /predict");

    let resp = app.oneshot(req).await.expect("oneshot /predict");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_debug_source_prior_resolves_table_domain() {
    let app = test_router("prior");

    let req = Request::builder()
        .method("GET")
        .uri("/debug/source-prior?url=https://www.agerpres.ro/x")
        .body(Body::empty())
        .expect("build GET /debug/source-prior");

    let resp = app.oneshot(req).await.expect("oneshot /debug/source-prior");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = json_body(resp).await;
    assert_eq!(v["source_domain"], "agerpres.ro");
    assert_eq!(v["evidence"], "table:agg");
    assert!((v["p_true"].as_f64().expect("p_true") - 0.95).abs() < 1e-9);
}

#[tokio::test]
async fn api_debug_source_prior_without_url_is_no_source() {
    let app = test_router("nosource");

    let req = Request::builder()
        .method("GET")
        .uri("/debug/source-prior")
        .body(Body::empty())
        .expect("build GET /debug/source-prior");

    let resp = app.oneshot(req).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["evidence"], "no-source");
    assert_eq!(v["source_domain"], "");
}
