use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    Router,
    extract::{Json, Query, Request},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::net::TcpListener;
use tracing::{Instrument, info, info_span, warn};

use super::{
    AffordabilityArgs, Calculator, CompoundArgs, DcaArgs, HsaArgs, MatchArgs, MortgageArgs,
    RentVsBuyArgs, RetirementArgs, RothArgs,
};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/mortgage", calculator_route::<MortgageArgs>())
        .route("/api/affordability", calculator_route::<AffordabilityArgs>())
        .route("/api/dca", calculator_route::<DcaArgs>())
        .route("/api/retirement", calculator_route::<RetirementArgs>())
        .route("/api/hsa", calculator_route::<HsaArgs>())
        .route("/api/compound", calculator_route::<CompoundArgs>())
        .route("/api/match-401k", calculator_route::<MatchArgs>())
        .route("/api/roth", calculator_route::<RothArgs>())
        .route("/api/rent-vs-buy", calculator_route::<RentVsBuyArgs>())
        .fallback(not_found_handler)
        .layer(middleware::from_fn(log_request))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "fincalc HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/health");

    axum::serve(listener, router()).await
}

fn calculator_route<C>() -> MethodRouter
where
    C: Calculator + DeserializeOwned + Send + 'static,
{
    get(calculator_get_handler::<C>).post(calculator_post_handler::<C>)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let span = info_span!("http.request", method = %method, path = %path);

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
    span.in_scope(|| info!(status, latency_ms, "request completed"));
    response
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculator_get_handler<C: Calculator>(Query(args): Query<C>) -> Response {
    calculator_response(&args)
}

async fn calculator_post_handler<C: Calculator>(Json(args): Json<C>) -> Response {
    calculator_response(&args)
}

fn calculator_response<C: Calculator>(args: &C) -> Response {
    match args.evaluate() {
        Ok(output) => json_response(StatusCode::OK, output),
        Err(err) => {
            warn!(error = %err, "rejected calculator input");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
