use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{UserError, UserResult};
use crate::hooks::UserLifecycleHook;
use crate::models::{LoginRequest, Page, SignupRequest, UpdateUserRequest, User, UserChanges};
use crate::repository::UserRepository;
use crate::rules::{login_rules, signup_rules, update_rules};
use crate::validation::{NoUniqueness, UniquenessProbe, normalize};

/// Validation, hashing and hooks on top of a [`UserRepository`].
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hooks: Vec<Arc<dyn UserLifecycleHook>>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            hooks: self.hooks.clone(),
        }
    }
}

/// Email uniqueness backed by the repository.
struct EmailProbe<'a, R> {
    repository: &'a R,
    except: Option<Uuid>,
}

#[async_trait]
impl<R: UserRepository> UniquenessProbe for EmailProbe<'_, R> {
    async fn is_taken(&self, field: &str, value: &str) -> UserResult<bool> {
        match field {
            "email" => self.repository.email_exists(value, self.except).await,
            other => Err(UserError::Internal(format!(
                "No uniqueness check for field '{other}'"
            ))),
        }
    }
}

/// Deserialize input that already passed validation.
fn typed<T: DeserializeOwned>(input: Map<String, Value>) -> UserResult<T> {
    serde_json::from_value(Value::Object(input))
        .map_err(|e| UserError::Internal(format!("Validated payload did not deserialize: {e}")))
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: impl UserLifecycleHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    fn email_probe(&self, except: Option<Uuid>) -> EmailProbe<'_, R> {
        EmailProbe {
            repository: self.repository.as_ref(),
            except,
        }
    }

    pub async fn list_users(&self, ctx: &RequestContext) -> UserResult<Page<User>> {
        self.repository.search(&ctx.user_query()).await
    }

    /// Validate a signup payload, hash the password and persist the user.
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        input: Map<String, Value>,
    ) -> UserResult<User> {
        let input = normalize(input);
        signup_rules().validate(&input, &self.email_probe(None)).await?;
        let request: SignupRequest = typed(input)?;

        let password_hash = self.hash_password(&request.password)?;
        let user = User::new(request.name, request.email, password_hash);

        for hook in &self.hooks {
            hook.before_create(ctx, &user).await?;
        }

        let user = self.repository.create(user).await?;

        for hook in &self.hooks {
            hook.after_create(ctx, &user).await;
        }
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository.find(id).await
    }

    /// Re-validate the fields that were sent and apply them.
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: Map<String, Value>,
    ) -> UserResult<User> {
        let existing = self.repository.find(id).await?;

        let input = normalize(input);
        update_rules()
            .validate(&input, &self.email_probe(Some(id)))
            .await?;
        let request: UpdateUserRequest = typed(input)?;

        let changes = UserChanges {
            name: request.name,
            email: request.email,
            password_hash: request
                .password
                .map(|password| self.hash_password(&password))
                .transpose()?,
        };
        if changes.is_empty() {
            return Ok(existing);
        }

        let user = self.repository.update(id, changes).await?;

        for hook in &self.hooks {
            hook.after_update(ctx, &user).await;
        }
        Ok(user)
    }

    pub async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> UserResult<()> {
        self.repository.delete(id).await?;

        for hook in &self.hooks {
            hook.after_delete(ctx, id).await;
        }
        Ok(())
    }

    /// Check login credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, input: Map<String, Value>) -> UserResult<User> {
        let input = normalize(input);
        login_rules().validate(&input, &NoUniqueness).await?;
        let request: LoginRequest = typed(input)?;

        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.verify_password(&request.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
