use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use axum_helpers::{JwtClaims, extract_ip_from_headers, extract_user_agent};
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use uuid::Uuid;

use crate::models::{PageRequest, UserQuery};

/// Authenticated caller, taken from verified token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Per-request inputs resolved once and passed down explicitly.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestContext {
    pub identity: Option<Identity>,
    pub search: Option<String>,
    pub page: u64,
    pub per_page: u64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Context for calls that do not originate from HTTP.
    pub fn anonymous() -> Self {
        let page = PageRequest::default();
        Self {
            page: page.page,
            per_page: page.per_page,
            ..Default::default()
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn actor_id(&self) -> Option<String> {
        self.identity.as_ref().map(|i| i.user_id.to_string())
    }

    pub fn user_query(&self) -> UserQuery {
        UserQuery::new(
            self.search.clone(),
            PageRequest::new(self.page, self.per_page),
        )
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Unparseable query strings are treated as empty.
        let params = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(params)| params)
            .unwrap_or_default();

        let page = PageRequest::parse(
            params.get("page").map(String::as_str),
            params.get("per_page").map(String::as_str),
        );
        let query = UserQuery::new(params.get("search").cloned(), page);

        let identity = parts.extensions.get::<JwtClaims>().and_then(|claims| {
            claims.user_id().map(|user_id| Identity {
                user_id,
                email: claims.email.clone(),
            })
        });

        Ok(Self {
            identity,
            search: query.search,
            page: page.page,
            per_page: page.per_page,
            ip_address: extract_ip_from_headers(&parts.headers),
            user_agent: extract_user_agent(&parts.headers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn context_for(uri: &str) -> RequestContext {
        let (mut parts, _) = Request::get(uri)
            .header("user-agent", "tests/1.0")
            .header("x-forwarded-for", "203.0.113.9")
            .body(())
            .unwrap()
            .into_parts();
        RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn reads_search_and_pagination() {
        let ctx = context_for("/v1/users?search=%20ali%20&page=2&per_page=500").await;

        assert_eq!(ctx.search.as_deref(), Some("ali"));
        assert_eq!(ctx.page, 2);
        assert_eq!(ctx.per_page, 100);
        assert_eq!(ctx.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(ctx.user_agent.as_deref(), Some("tests/1.0"));
        assert!(ctx.identity.is_none());
    }

    #[tokio::test]
    async fn malformed_pagination_falls_back_to_defaults() {
        let ctx = context_for("/v1/users?page=abc&per_page=").await;
        assert_eq!(ctx.user_query().page, PageRequest::default());
    }

    #[tokio::test]
    async fn identity_comes_from_claims() {
        let user_id = Uuid::now_v7();
        let (mut parts, _) = Request::get("/").body(()).unwrap().into_parts();
        parts.extensions.insert(JwtClaims {
            sub: user_id.to_string(),
            email: "a@x.com".into(),
            name: "Alice".into(),
            exp: 0,
            iat: 0,
            jti: "jti".into(),
        });

        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.actor_id(), Some(user_id.to_string()));
    }
}
