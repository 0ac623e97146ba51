use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::error::Error;
use crate::models::{Chart, Summary, WalletSnapshot};
use crate::portfolio::{now_ms, Portfolio};
use crate::range::TimeRange;
use crate::rpc::LedgerSource;

#[derive(Deserialize)]
pub struct ChartQuery {
    pub range: Option<String>, // defaults to 1D
}

pub fn router<L>(portfolio: Arc<Portfolio<L>>) -> Router
where
    L: LedgerSource + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Balance chart API running" }))
        .route("/chart", get(chart::<L>))
        .route("/charts", get(charts::<L>))
        .route("/summary/today", get(today::<L>))
        .route("/wallet", get(wallet::<L>))
        .layer(cors)
        .with_state(portfolio)
}

pub async fn serve<L>(port: u16, portfolio: Arc<Portfolio<L>>) -> eyre::Result<()>
where
    L: LedgerSource + 'static,
{
    let app = router(portfolio);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn chart<L: LedgerSource>(
    State(portfolio): State<Arc<Portfolio<L>>>,
    Query(q): Query<ChartQuery>,
) -> Result<Json<Chart>, Error> {
    let range = match q.range.as_deref() {
        Some(key) => key.parse::<TimeRange>()?,
        None => TimeRange::OneDay,
    };
    Ok(Json(portfolio.chart(range, now_ms()).await?))
}

async fn charts<L: LedgerSource>(
    State(portfolio): State<Arc<Portfolio<L>>>,
) -> Result<Json<Vec<Chart>>, Error> {
    Ok(Json(portfolio.charts(now_ms()).await?))
}

async fn today<L: LedgerSource>(
    State(portfolio): State<Arc<Portfolio<L>>>,
) -> Result<Json<Summary>, Error> {
    Ok(Json(portfolio.today_summary(now_ms()).await?))
}

async fn wallet<L: LedgerSource>(
    State(portfolio): State<Arc<Portfolio<L>>>,
) -> Result<Json<WalletSnapshot>, Error> {
    Ok(Json(portfolio.snapshot().await?))
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRange(_) => StatusCode::BAD_REQUEST,
            Error::TokenNotConfigured => StatusCode::NOT_FOUND,
            Error::UpstreamStatus(_) | Error::Transport(_) | Error::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_upstream() {
            warn!("Upstream failure: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
