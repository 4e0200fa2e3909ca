use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, QUERY_PATH};
use tower::ServiceExt;

const USGS_QUERY: &str = "format=geojson&starttime=2012-01-01&endtime=2012-12-01&minmagnitude=8";

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- query ---

#[tokio::test]
async fn query_returns_feature_collection() {
    let resp = app()
        .oneshot(get(&format!("{QUERY_PATH}?{USGS_QUERY}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let features = body["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(
        features[0]["properties"]["title"],
        "M 8.2 - off the west coast of northern Sumatra"
    );
    assert_eq!(features[0]["properties"]["tsunami"], 1);
}

#[tokio::test]
async fn query_filters_by_min_magnitude() {
    let resp = app()
        .oneshot(get(&format!("{QUERY_PATH}?format=geojson&minmagnitude=8.5")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["features"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn query_above_all_magnitudes_is_empty() {
    let resp = app()
        .oneshot(get(&format!("{QUERY_PATH}?format=geojson&minmagnitude=9.5")))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert!(body["features"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn query_rejects_other_formats() {
    let resp = app()
        .oneshot(get(&format!("{QUERY_PATH}?format=xml")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_without_format_is_bad_request() {
    let resp = app().oneshot(get(QUERY_PATH)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- status ---

#[tokio::test]
async fn status_route_echoes_code() {
    let resp = app().oneshot(get("/status/503")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_bytes(resp).await, "status 503");
}

// --- raw ---

#[tokio::test]
async fn raw_bodies_are_served_verbatim() {
    let resp = app().oneshot(get("/raw/garbage")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(body.starts_with(b"<html>"));

    let resp = app().oneshot(get("/raw/missing-title")).await.unwrap();
    let body = body_json(resp).await;
    assert!(body["features"][0]["properties"].get("title").is_none());
}

#[tokio::test]
async fn raw_latin1_is_not_utf8() {
    let resp = app().oneshot(get("/raw/latin1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(std::str::from_utf8(&body).is_err());
}

#[tokio::test]
async fn raw_unknown_name_is_404() {
    let resp = app().oneshot(get("/raw/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- slow ---

#[tokio::test]
async fn slow_route_eventually_serves_feed() {
    let resp = app().oneshot(get("/slow/20")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["features"].as_array().unwrap().len(), 2);
}
