use axum::{body::Body, http::Request, middleware::Next, response::Response};
use uuid::Uuid;

use shared_models::auth::{AuthUser, UserRole};
use shared_models::error::AppError;

/// Middleware that lifts the upstream-verified subject headers into an
/// `AuthUser` request extension. Authentication itself happens before this
/// service; a request without the headers never came through the gateway.
pub async fn identity_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let subject = header_value(&request, "x-subject-id")?;
    let role = header_value(&request, "x-subject-role")?;

    let id = Uuid::parse_str(&subject)
        .map_err(|_| AppError::Auth("Invalid subject id".to_string()))?;
    let role = UserRole::parse(&role)
        .ok_or_else(|| AppError::Auth("Unknown subject role".to_string()))?;

    request.extensions_mut().insert(AuthUser { id, role });

    Ok(next.run(request).await)
}

fn header_value(request: &Request<Body>, name: &str) -> Result<String, AppError> {
    request
        .headers()
        .get(name)
        .ok_or_else(|| AppError::Auth(format!("Missing {} header", name)))?
        .to_str()
        .map(|v| v.to_string())
        .map_err(|_| AppError::Auth(format!("Invalid {} header", name)))
}
