//! External JSON representations of users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Page, User};

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResource {
    pub id: Uuid,
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResource {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    /// 1-based position of the first item, null on an empty page
    pub from: Option<u64>,
    /// 1-based position of the last item, null on an empty page
    pub to: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCollection {
    pub data: Vec<UserResource>,
    pub meta: PaginationMeta,
}

impl From<Page<User>> for UserCollection {
    fn from(page: Page<User>) -> Self {
        let offset = page.request.offset();
        let count = page.items.len() as u64;
        let (from, to) = if count == 0 {
            (None, None)
        } else {
            (Some(offset + 1), Some(offset + count))
        };

        let meta = PaginationMeta {
            current_page: page.request.page,
            per_page: page.request.per_page,
            total: page.total,
            last_page: page.last_page(),
            from,
            to,
        };

        Self {
            data: page.items.into_iter().map(UserResource::from).collect(),
            meta,
        }
    }
}

/// Issued access token plus the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserResource,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageRequest;

    fn users(n: usize) -> Vec<User> {
        (0..n)
            .map(|i| User::new(format!("User {i}"), format!("u{i}@x.com"), "hash".into()))
            .collect()
    }

    #[test]
    fn collection_meta_for_second_page() {
        let page = Page {
            items: users(5),
            total: 20,
            request: PageRequest::new(2, 15),
        };

        let collection = UserCollection::from(page);
        assert_eq!(collection.data.len(), 5);
        assert_eq!(
            collection.meta,
            PaginationMeta {
                current_page: 2,
                per_page: 15,
                total: 20,
                last_page: 2,
                from: Some(16),
                to: Some(20),
            }
        );
    }

    #[test]
    fn empty_page_has_null_bounds() {
        let page = Page {
            items: Vec::new(),
            total: 0,
            request: PageRequest::default(),
        };

        let json = serde_json::to_value(UserCollection::from(page)).unwrap();
        assert!(json["meta"]["from"].is_null());
        assert!(json["meta"]["to"].is_null());
        assert_eq!(json["meta"]["last_page"], 1);
    }

    #[test]
    fn resource_omits_password() {
        let user = users(1).remove(0);
        let json = serde_json::to_value(UserResource::from(user)).unwrap();

        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 5);
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
