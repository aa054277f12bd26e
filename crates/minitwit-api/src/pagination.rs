use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

pub const DEFAULT_LIMIT: u32 = 100;

/// Result-count limit taken from the `no` query parameter.
///
/// Never rejects a request: a missing, negative or malformed value resolves
/// to [`DEFAULT_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit(pub u32);

impl Default for PageLimit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

impl PageLimit {
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(|v| v.parse().ok())
            .map(Self)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    no: Option<String>,
}

impl<S> FromRequestParts<S> for PageLimit
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = Query::<PageQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.no);
        Ok(Self::resolve(raw.as_deref()))
    }
}
