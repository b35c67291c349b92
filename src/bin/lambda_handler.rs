//! AWS Lambda handler for premium quotes
//!
//! Accepts a quote request as JSON and returns the ranked quotes with their
//! breakdowns. The underwriting dataset is loaded once at cold start from
//! `QUOTE_DATA_PATH`; a request may instead carry its own `dataset` object.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use chrono::Utc;
use lambda_http::{run, service_fn, Body, Request, Response};
use lambda_runtime::Error;
use log::{error, info};
use premium_quote::dataset::{load_dataset_from_path, loader::DEFAULT_DATA_PATH};
use premium_quote::{Quote, QuoteEngine, QuoteError, QuoteRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Environment variable naming the underwriting file
const DATA_PATH_ENV: &str = "QUOTE_DATA_PATH";

/// Input body: a quote request, optionally with an inline dataset
#[derive(Debug, Deserialize)]
pub struct QuoteHttpRequest {
    #[serde(flatten)]
    pub request: QuoteRequest,

    /// Price against this dataset instead of the one loaded at cold start
    #[serde(default)]
    pub dataset: Option<Value>,

    /// Drop per-quote breakdowns from the response
    #[serde(default)]
    pub omit_breakdown: bool,
}

/// Output body
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quotes: Vec<Value>,
    pub quote_count: usize,
    pub carriers: Vec<String>,
    pub quoted_at: String,
    pub execution_time_ms: u64,
}

fn with_cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message }).to_string();
    Ok(with_cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(body))?)
}

fn json_response(body: &QuoteResponse) -> Result<Response<Body>, Error> {
    Ok(with_cors(Response::builder())
        .status(200)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// Quote as JSON, without its breakdown when requested
fn quote_json(quote: &Quote, omit_breakdown: bool) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(quote)?;
    if omit_breakdown {
        if let Some(object) = value.as_object_mut() {
            object.remove("breakdown");
        }
    }
    Ok(value)
}

/// Status code for a failed quote run
fn status_for(error: &QuoteError) -> u16 {
    match error {
        QuoteError::MissingGenderRate { .. } => 500,
        _ => 400,
    }
}

/// Lambda handler function
async fn handler(default_engine: Option<Arc<QuoteEngine>>, event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(with_cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let http_request: QuoteHttpRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    let engine = match (http_request.dataset, default_engine) {
        (Some(dataset), _) => match QuoteEngine::from_value(dataset) {
            Ok(engine) => Arc::new(engine),
            Err(e) => return error_response(400, &e.to_string()),
        },
        (None, Some(engine)) => engine,
        (None, None) => return error_response(500, "No underwriting data is loaded"),
    };

    let quotes = match engine.calculate_quotes(&http_request.request) {
        Ok(quotes) => quotes,
        Err(e) => return error_response(status_for(&e), &e.to_string()),
    };

    let quote_values = quotes
        .iter()
        .map(|q| quote_json(q, http_request.omit_breakdown))
        .collect::<Result<Vec<_>, _>>()?;

    let response = QuoteResponse {
        quote_count: quote_values.len(),
        quotes: quote_values,
        carriers: engine.list_carriers(),
        quoted_at: Utc::now().to_rfc3339(),
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    json_response(&response)
}

/// Load the cold-start engine; a failure is logged and leaves only inline datasets usable
fn load_default_engine() -> Option<Arc<QuoteEngine>> {
    let path = std::env::var(DATA_PATH_ENV).unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
    let engine = load_dataset_from_path(&path)
        .map_err(|e| e.to_string())
        .and_then(|value| QuoteEngine::from_value(value).map_err(|e| e.to_string()));

    match engine {
        Ok(engine) => {
            info!("Loaded {} carriers from {}", engine.list_carriers().len(), path);
            Some(Arc::new(engine))
        }
        Err(e) => {
            error!("Failed to load underwriting data from {}: {}", path, e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let default_engine = load_default_engine();
    run(service_fn(move |event: Request| {
        let engine = default_engine.clone();
        async move { handler(engine, event).await }
    }))
    .await
}
