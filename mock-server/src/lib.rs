use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

pub const QUERY_PATH: &str = "/fdsnws/event/1/query";

/// One canned event, serialized in the USGS GeoJSON feature layout.
#[derive(Clone, Debug)]
pub struct Quake {
    pub id: String,
    pub mag: f64,
    pub place: String,
    pub title: String,
    pub time: i64,
    pub tsunami: i32,
}

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub format: Option<String>,
    pub starttime: Option<String>,
    pub endtime: Option<String>,
    pub minmagnitude: Option<f64>,
}

/// M8+ events between 2012-01-01 and 2012-12-01, newest first.
pub fn events_2012() -> Vec<Quake> {
    vec![
        Quake {
            id: "usp000jhjq".to_string(),
            mag: 8.2,
            place: "off the west coast of northern Sumatra".to_string(),
            title: "M 8.2 - off the west coast of northern Sumatra".to_string(),
            time: 1334139745630,
            tsunami: 1,
        },
        Quake {
            id: "usp000jhjb".to_string(),
            mag: 8.6,
            place: "off the west coast of northern Sumatra".to_string(),
            title: "M 8.6 - off the west coast of northern Sumatra".to_string(),
            time: 1334132708820,
            tsunami: 1,
        },
    ]
}

pub fn feature_collection(events: &[Quake]) -> serde_json::Value {
    let features: Vec<serde_json::Value> = events
        .iter()
        .map(|q| {
            json!({
                "type": "Feature",
                "properties": {
                    "mag": q.mag,
                    "place": q.place,
                    "time": q.time,
                    "tsunami": q.tsunami,
                    "type": "earthquake",
                    "title": q.title,
                },
                "id": q.id,
            })
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "metadata": { "status": 200, "count": features.len() },
        "features": features,
    })
}

pub fn app() -> Router {
    Router::new()
        .route(QUERY_PATH, get(query))
        .route("/status/{code}", get(status))
        .route("/raw/{name}", get(raw))
        .route("/slow/{ms}", get(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn query(
    Query(params): Query<QueryParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match params.format.as_deref() {
        Some("geojson") => {}
        other => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Error 400: Bad format {other:?}"),
            ))
        }
    }
    let min = params.minmagnitude.unwrap_or(0.0);
    let events: Vec<Quake> = events_2012().into_iter().filter(|q| q.mag >= min).collect();
    tracing::debug!(
        starttime = ?params.starttime,
        endtime = ?params.endtime,
        count = events.len(),
        "serving feed"
    );
    Ok(Json(feature_collection(&events)))
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("status {}", status.as_u16()))
}

async fn raw(Path(name): Path<String>) -> Result<Vec<u8>, StatusCode> {
    let body = match name.as_str() {
        "garbage" => "<html><body>upstream timeout</body></html>".to_string(),
        "blank" => "   \n".to_string(),
        // "café" in Latin-1, which is not valid UTF-8.
        "latin1" => return Ok(b"caf\xe9".to_vec()),
        "empty-features" => feature_collection(&[]).to_string(),
        "missing-title" => json!({
            "features": [{ "properties": { "time": 1334132708820i64, "tsunami": 1 } }]
        })
        .to_string(),
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(body.into_bytes())
}

async fn slow(Path(ms): Path<u64>) -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(feature_collection(&events_2012()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_collection_has_usgs_shape() {
        let value = feature_collection(&events_2012());
        assert_eq!(value["type"], "FeatureCollection");
        let first = &value["features"][0]["properties"];
        assert_eq!(first["title"], "M 8.2 - off the west coast of northern Sumatra");
        assert_eq!(first["time"], 1334139745630i64);
        assert_eq!(first["tsunami"], 1);
    }

    #[test]
    fn events_are_newest_first() {
        let events = events_2012();
        assert!(events.windows(2).all(|w| w[0].time >= w[1].time));
    }

    #[test]
    fn empty_collection_keeps_features_array() {
        let value = feature_collection(&[]);
        assert!(value["features"].as_array().unwrap().is_empty());
        assert_eq!(value["metadata"]["count"], 0);
    }

    #[test]
    fn query_params_all_optional() {
        let params: QueryParams = serde_json::from_str("{}").unwrap();
        assert!(params.format.is_none());
        assert!(params.minmagnitude.is_none());
    }
}
