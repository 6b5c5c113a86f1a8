use super::models::{ErrorResponse, IndexResponse, parse_quote_request};
use crate::errors::{ExchangeError, QuoteError, ServiceError};
use crate::service::{QuoteResponse, QuoteService};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};
use std::sync::Arc;

/// A failed request, rendered as the `{code, message, extra}` envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    extra: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = Some(extra);
        self
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::UnknownPair { .. }
            | ServiceError::Exchange(ExchangeError::InvalidPair(_))
            | ServiceError::Quote(QuoteError::InvalidAmount(_))
            | ServiceError::Quote(QuoteError::InsufficientLiquidity { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Quote(QuoteError::InvalidEntry { .. })
            | ServiceError::Quote(QuoteError::Overflow(_))
            | ServiceError::Exchange(ExchangeError::UnexpectedData(_))
            | ServiceError::Exchange(ExchangeError::Parse(_)) => StatusCode::BAD_GATEWAY,
            ServiceError::Exchange(ExchangeError::Unavailable(_))
            | ServiceError::Exchange(ExchangeError::Http(_)) => StatusCode::SERVICE_UNAVAILABLE,
        };

        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.status.as_u16(),
            message: self.message,
            extra: self.extra,
        };
        (self.status, Json(body)).into_response()
    }
}

/// GET /: service banner
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: "Coinbase Quote Service",
    })
}

/// GET /health: simple liveness check
pub async fn health() -> &'static str {
    "OK"
}

/// POST /quote: price a trade against the live book
pub async fn quote(
    State(service): State<Arc<QuoteService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

    let request = parse_quote_request(&body).map_err(|errors| {
        ApiError::new(StatusCode::BAD_REQUEST, "invalid parameters")
            .with_extra(json!({ "invalid_parameters": errors }))
    })?;

    let response = service.quote(&request).await?;
    Ok(Json(response))
}

pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "method not found")
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}
