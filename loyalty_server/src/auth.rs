//! Caller identity.
//!
//! Authentication happens upstream of this server. The gateway in front of us authenticates the user and forwards
//! their numeric id in the `X-Loyalty-User-Id` header. Handlers take a [`UserId`] argument to require it.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use log::debug;

use crate::errors::{AuthError, ServerError};

pub const USER_ID_HEADER: &str = "X-Loyalty-User-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

impl UserId {
    pub fn from_request_headers(req: &HttpRequest) -> Result<Self, AuthError> {
        let value = req.headers().get(USER_ID_HEADER).ok_or(AuthError::MissingUserId)?;
        let value = value.to_str().map_err(|e| AuthError::InvalidUserId(e.to_string()))?;
        let id = value.trim().parse::<i64>().map_err(|e| AuthError::InvalidUserId(format!("'{value}': {e}")))?;
        if id <= 0 {
            return Err(AuthError::InvalidUserId(format!("'{value}' is not a positive number")));
        }
        Ok(Self(id))
    }
}

impl FromRequest for UserId {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = Self::from_request_headers(req).map_err(|e| {
            debug!("💻️ Rejecting request to {}. {e}", req.path());
            ServerError::from(e)
        });
        ready(result)
    }
}
