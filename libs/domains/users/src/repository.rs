use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Page, User, UserChanges, UserQuery};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID, `NotFound` when missing
    async fn find(&self, id: Uuid) -> UserResult<User>;

    /// Case-insensitive lookup by email
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Filtered page of users in creation order
    async fn search(&self, query: &UserQuery) -> UserResult<Page<User>>;

    /// Apply a partial update and return the refreshed user
    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<User>;

    async fn delete(&self, id: Uuid) -> UserResult<()>;

    /// Whether `email` belongs to a user other than `except`
    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    // Kept in insertion order so listing is stable.
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| same_email(&u.email, &user.email)) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.push(user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn find(&self, id: Uuid) -> UserResult<User> {
        let users = self.users.read().await;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(UserError::NotFound(id))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| same_email(&u.email, email)).cloned())
    }

    async fn search(&self, query: &UserQuery) -> UserResult<Page<User>> {
        let users = self.users.read().await;
        let matching: Vec<&User> = users.iter().filter(|u| query.matches(u)).collect();

        let items = matching
            .iter()
            .skip(query.page.offset() as usize)
            .take(query.page.per_page as usize)
            .map(|u| (*u).clone())
            .collect();

        Ok(Page {
            items,
            total: matching.len() as u64,
            request: query.page,
        })
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<User> {
        let mut users = self.users.write().await;

        if let Some(email) = &changes.email {
            if users.iter().any(|u| u.id != id && same_email(&u.email, email)) {
                return Err(UserError::DuplicateEmail(email.clone()));
            }
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(UserError::NotFound(id))?;
        user.apply(changes);

        tracing::info!(user_id = %id, "Updated user");
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let mut users = self.users.write().await;
        let index = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(UserError::NotFound(id))?;
        users.remove(index);

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .any(|u| Some(u.id) != except && same_email(&u.email, email)))
    }
}
