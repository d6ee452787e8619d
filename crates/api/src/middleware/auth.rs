//! Bearer-token authentication for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use obra_shared::types::UserId;
use obra_shared::{AppError, Claims, JwtError};

use crate::{AppState, error::error_response};

/// Returns the token of an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Validates the bearer token and stores its [`Claims`] in the request
/// extensions, where [`AuthUser`] picks them up.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return unauthorized("Authorization header with Bearer token is required");
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => unauthorized("Token has expired"),
        Err(_) => unauthorized("Invalid or malformed token"),
    }
}

fn unauthorized(message: &str) -> Response {
    error_response(
        AppError::Unauthorized(message.to_string()),
        "Rejected request",
    )
}

/// Authenticated caller of a protected route.
///
/// The user ID is recorded as the creator of duplicated budgets and the
/// last editor of matrix overrides.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id()
    }

    /// Returns the user's role.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.0.role
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[rstest]
    #[case("Bearer abc.def.ghi", Some("abc.def.ghi"))]
    #[case("bearer abc", Some("abc"))]
    #[case("BEARER  abc ", Some("abc"))]
    #[case("Basic dXNlcjpwYXNz", None)]
    #[case("Bearer ", None)]
    #[case("Bearer", None)]
    fn test_bearer_token(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(bearer_token(&headers(header)), expected);
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
