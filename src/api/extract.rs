use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use super::validate::Validate;
use crate::error::ApiError;

/// JSON body extractor that also runs [`Validate`] before the handler sees it.
///
/// Syntax and shape failures come back as [`ApiError`] instead of axum's plain
/// text rejections, so every error response shares the same JSON body.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|field_errors| ApiError::validation_error("Invalid request body", Some(field_errors)))?;
        Ok(Self(value))
    }
}

/// Query string extractor whose rejection is an [`ApiError`]
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Parse a path segment as a product id
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        let mut field_errors = HashMap::new();
        field_errors.insert("id".to_string(), format!("Invalid integer: {}", raw));
        ApiError::validation_error("Invalid path parameter", Some(field_errors))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_ids() {
        assert_eq!(parse_id("42").unwrap(), 42);
    }

    #[test]
    fn rejects_non_integer_ids() {
        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert!(err.to_json()["field_errors"]["id"].is_string());
    }
}
