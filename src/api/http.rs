use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::config::ApiConfig;
pub use crate::error::ApiError;
use crate::error::ServiceError;
use crate::models::{Block, BlockWithTypes, Transaction};
use crate::service::pagination::INVALID_PAGE;
use crate::service::{Found, TransactionService};

impl From<&ServiceError> for StatusCode {
    fn from(error: &ServiceError) -> Self {
        match error {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Query parameters for the paginated endpoints. Missing values fall back to
/// the configured defaults.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

impl From<ServiceError> for ErrorResponse {
    fn from(error: ServiceError) -> Self {
        let kind = match error {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::NotFound(_) => "not_found",
        };
        Self {
            error: kind.to_string(),
            message: error.message().to_string(),
        }
    }
}

fn error_response(error: ServiceError) -> HandlerError {
    let status = StatusCode::from(&error);
    (status, Json(ErrorResponse::from(error)))
}

/// Page and limit from the query string, falling back to the configured
/// defaults. A malformed query is reported like any other invalid page.
fn page_params(
    query: Result<Query<PaginationQuery>, QueryRejection>,
    state: &AppState,
) -> Result<(u64, u64), HandlerError> {
    let Query(params) = query.map_err(|rejection| {
        log::debug!("Rejected pagination query: {}", rejection);
        error_response(ServiceError::bad_request(INVALID_PAGE))
    })?;

    Ok((
        params.page.unwrap_or(state.default_page),
        params.limit.unwrap_or(state.default_limit),
    ))
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TransactionService>,
    pub default_page: u64,
    pub default_limit: u64,
}

impl AppState {
    pub fn new(service: Arc<TransactionService>, config: &ApiConfig) -> Self {
        Self {
            service,
            default_page: config.default_page,
            default_limit: config.default_limit,
        }
    }
}

/// Routes under `/transaction`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/transaction/all", get(get_all_blocks))
        .route("/transaction/block/paginate", get(get_block_paginate))
        .route("/transaction/transactions/paginate", get(get_transaction_paginate))
        .route("/transaction/infor/:tx", get(get_infor_transaction))
        .route("/transaction/:text", get(find_transaction))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
        )
        .with_state(state)
}

/// HTTP API server
pub struct ApiServer {
    state: AppState,
    pub host: String,
    pub port: u16,
}

impl ApiServer {
    pub fn new(service: Arc<TransactionService>, config: &ApiConfig) -> Self {
        Self {
            state: AppState::new(service, config),
            host: config.host.clone(),
            port: config.port,
        }
    }

    /// Start the HTTP server
    pub async fn start(&self) -> Result<(), ApiError> {
        let app = router(self.state.clone());

        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ApiError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        log::info!("HTTP API server starting on {}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| ApiError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// GET /transaction/all - Every block from height 1 to the tip
pub async fn get_all_blocks(
    State(state): State<AppState>,
) -> Result<Json<Vec<Block>>, HandlerError> {
    state.service.get_all_blocks().await.map(Json).map_err(error_response)
}

/// GET /transaction/block/paginate - Blocks with their transaction types
pub async fn get_block_paginate(
    State(state): State<AppState>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<Json<Vec<BlockWithTypes>>, HandlerError> {
    let (page, limit) = page_params(query, &state)?;

    state
        .service
        .get_block_paginate(page, limit)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /transaction/transactions/paginate - Transactions of a page of blocks
pub async fn get_transaction_paginate(
    State(state): State<AppState>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, HandlerError> {
    let (page, limit) = page_params(query, &state)?;

    state
        .service
        .get_transaction_paginate(page, limit)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /transaction/infor/:tx - Transaction detail by hash
pub async fn get_infor_transaction(
    Path(tx): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Transaction>, HandlerError> {
    state
        .service
        .get_infor_transaction(&tx)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /transaction/:text - Block by height or transaction by `0x` hash
pub async fn find_transaction(
    Path(text): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Found>, HandlerError> {
    state
        .service
        .find_transaction(&text)
        .await
        .map(Json)
        .map_err(error_response)
}
