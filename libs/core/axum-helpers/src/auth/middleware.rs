use super::jwt::{AuthError, JwtAuth, JwtClaims};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Bearer token from `Authorization`, falling back to an `access_token` cookie.
pub fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| {
            auth.strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
        })
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        cookie
                            .trim()
                            .strip_prefix("access_token=")
                            .filter(|value| !value.is_empty())
                            .map(str::to_string)
                    })
                })
        })
}

/// Reject the request with 401 unless it carries a valid, unrevoked token.
///
/// On success the decoded [`JwtClaims`] are available as an extension.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token_from_request(request.headers()).ok_or(AuthError::MissingToken)?;

    let claims = auth.authenticate(&token).await.inspect_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Attach claims when a valid token is present; never rejects.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token_from_request(request.headers()) {
        match auth.authenticate(&token).await {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring unusable bearer token"),
        }
    }

    next.run(request).await
}

/// Case-insensitive set of email addresses allowed through a route group.
#[derive(Clone, Debug, Default)]
pub struct EmailAllowList(Arc<HashSet<String>>);

impl EmailAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(Arc::new(
            emails
                .into_iter()
                .map(|email| email.as_ref().trim().to_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
        ))
    }

    pub fn contains(&self, email: &str) -> bool {
        self.0.contains(&email.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Must run after [`jwt_auth_middleware`].
pub async fn require_allowed_email(
    State(allowed): State<EmailAllowList>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = request
        .extensions()
        .get::<JwtClaims>()
        .ok_or(AuthError::MissingToken)?;

    if !allowed.contains(&claims.email) {
        tracing::info!(user_id = %claims.sub, "Administrator access denied");
        return Err(AppError::Forbidden(
            "Administrator access required".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{InMemoryTokenStore, JwtConfig};
    use axum::{
        Extension, Router, body::Body, http::StatusCode, middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    fn auth() -> JwtAuth {
        JwtAuth::new(
            &JwtConfig::new("middleware-test-secret-long-enough!").unwrap(),
            Arc::new(InMemoryTokenStore::new()),
        )
    }

    fn protected(auth: JwtAuth) -> Router {
        Router::new()
            .route(
                "/me",
                get(|Extension(claims): Extension<JwtClaims>| async move { claims.email }),
            )
            .route_layer(from_fn_with_state(auth, jwt_auth_middleware))
    }

    fn get_with(uri: &str, header: Option<(&str, String)>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::get(uri);
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn extracts_bearer_then_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; access_token=from-cookie".parse().unwrap());
        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("from-cookie"));

        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());
        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("from-header"));
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let response = protected(auth()).oneshot(get_with("/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let auth = auth();
        let token = auth.issue("id", "a@x.com", "Alice").unwrap().access_token;

        let response = protected(auth)
            .oneshot(get_with("/me", Some(("authorization", format!("Bearer {token}")))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn revoked_token_is_unauthorized() {
        let auth = auth();
        let issued = auth.issue("id", "a@x.com", "Alice").unwrap();
        auth.revoke(&issued.claims).await.unwrap();

        let response = protected(auth)
            .oneshot(get_with(
                "/me",
                Some(("authorization", format!("Bearer {}", issued.access_token))),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn allow_list_rejects_other_users() {
        let auth = auth();
        let router = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(
                EmailAllowList::new(["Admin@X.com"]),
                require_allowed_email,
            ))
            .route_layer(from_fn_with_state(auth.clone(), jwt_auth_middleware));

        let admin = auth.issue("1", "admin@x.com", "Admin").unwrap().access_token;
        let user = auth.issue("2", "user@x.com", "User").unwrap().access_token;

        let ok = router
            .clone()
            .oneshot(get_with("/admin", Some(("authorization", format!("Bearer {admin}")))))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let denied = router
            .oneshot(get_with("/admin", Some(("authorization", format!("Bearer {user}")))))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    }
}
