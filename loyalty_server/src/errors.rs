use actix_web::{
    error::{JsonPayloadError, ResponseError},
    http::{header::ContentType, StatusCode},
    HttpRequest,
    HttpResponse,
};
use log::debug;
use loyalty_engine::{helpers::OrderNumberError, traits::WithdrawalError, OrderApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error. {0}")]
    CouldNotDeserializePayload(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    InvalidOrderNumber(OrderNumberError),
    #[error("{0}")]
    OrderConflict(String),
    #[error("{0}")]
    InsufficientFunds(String),
    #[error("{0}")]
    InvalidAmount(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidOrderNumber(OrderNumberError::Empty) => StatusCode::BAD_REQUEST,
            Self::InvalidOrderNumber(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OrderConflict(_) => StatusCode::CONFLICT,
            Self::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

/// Rejects malformed JSON bodies with the same `{"error": ...}` body as every other failure.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Could not deserialize the body sent to {}. {err}", req.path());
    ServerError::CouldNotDeserializePayload(err.to_string()).into()
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("The X-Loyalty-User-Id header is missing.")]
    MissingUserId,
    #[error("The X-Loyalty-User-Id header does not contain a valid user id. {0}")]
    InvalidUserId(String),
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::InvalidOrderNumber(e) => Self::InvalidOrderNumber(e),
            OrderApiError::OwnedByAnotherUser(_) => Self::OrderConflict(e.to_string()),
            OrderApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<WithdrawalError> for ServerError {
    fn from(e: WithdrawalError) -> Self {
        match e {
            WithdrawalError::InsufficientFunds { .. } => Self::InsufficientFunds(e.to_string()),
            WithdrawalError::InvalidOrderNumber(e) => Self::InvalidOrderNumber(e),
            WithdrawalError::InvalidAmount(_) => Self::InvalidAmount(e.to_string()),
            WithdrawalError::Conflict(_) => Self::OrderConflict(e.to_string()),
            WithdrawalError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
