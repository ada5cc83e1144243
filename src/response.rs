use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Réponse JSON d'un handler, avec statut et en-têtes optionnels.
///
/// ```rust,ignore
/// AppResponse::ok(DataResponse::new(record))
/// AppResponse::created(DataResponse::new(record)).with_cookie(cookie)
/// AppResponse::no_content()
/// ```
pub struct AppResponse<T> {
    status: StatusCode,
    data: Option<T>,
    headers: HeaderMap,
}

impl<T> AppResponse<T>
where
    T: Serialize,
{
    pub fn new(status: StatusCode, data: Option<T>) -> Self {
        Self {
            status,
            data,
            headers: HeaderMap::new(),
        }
    }

    /// Adds HTTP headers to the response
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Ajoute un `Set-Cookie`
    pub fn with_cookie(mut self, cookie: HeaderValue) -> Self {
        self.headers.append(header::SET_COOKIE, cookie);
        self
    }

    // === Convenience constructors ===

    /// 200 OK with data
    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, Some(data))
    }

    /// 201 Created with data
    pub fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, Some(data))
    }
}

impl AppResponse<()> {
    /// 204 No Content
    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, None)
    }
}

impl<T> IntoResponse for AppResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let mut response = match self.data {
            Some(data) => (self.status, Json(data)).into_response(),
            None => self.status.into_response(),
        };

        response.headers_mut().extend(self.headers);
        response
    }
}
