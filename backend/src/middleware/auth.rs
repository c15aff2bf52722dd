//! Authentication middleware
//!
//! Validates the bearer JWT and stores the caller in request extensions

use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::validate_token;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

fn authenticate(secret: &str, request: &Request) -> Result<AuthUser, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Unauthorized("Missing or invalid Authorization header".to_string()))?;

    let claims = validate_token(secret, bearer.token())?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

    Ok(AuthUser {
        user_id,
        email: claims.email,
    })
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.config.jwt.secret, &request) {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extractor for authenticated user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::AUTHORIZATION;

    use crate::services::auth::issue_token;

    const SECRET: &str = "middleware-test-secret";

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/farms");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_non_bearer_scheme_is_unauthorized() {
        assert!(matches!(
            authenticate(SECRET, &request_with(Some("Basic ZmFybWVyOnB3"))),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_authenticate_valid_token() {
        let user_id = Uuid::new_v4();
        let token = issue_token(SECRET, user_id, "farmer@example.com", 600).unwrap();
        let request = request_with(Some(&format!("Bearer {}", token)));

        let user = authenticate(SECRET, &request).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email, "farmer@example.com");
    }

    #[test]
    fn test_authenticate_missing_header() {
        assert!(matches!(
            authenticate(SECRET, &request_with(None)),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_authenticate_wrong_secret() {
        let token = issue_token("other", Uuid::new_v4(), "farmer@example.com", 600).unwrap();
        let request = request_with(Some(&format!("Bearer {}", token)));
        assert!(matches!(authenticate(SECRET, &request), Err(AppError::InvalidToken)));
    }
}
