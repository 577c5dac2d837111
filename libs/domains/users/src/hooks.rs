//! Extension points around user mutations.

use async_trait::async_trait;
use axum_helpers::{AuditEvent, AuditOutcome};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::UserResult;
use crate::models::User;

/// Called by the service around each mutation.
///
/// `before_create` runs after validation and hashing but before the record is
/// written; returning an error aborts the create. The `after_*` callbacks
/// observe committed changes and cannot fail the request.
#[async_trait]
pub trait UserLifecycleHook: Send + Sync {
    async fn before_create(&self, _ctx: &RequestContext, _user: &User) -> UserResult<()> {
        Ok(())
    }

    async fn after_create(&self, _ctx: &RequestContext, _user: &User) {}

    async fn after_update(&self, _ctx: &RequestContext, _user: &User) {}

    async fn after_delete(&self, _ctx: &RequestContext, _id: Uuid) {}
}

/// Writes an audit event for every committed mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditHook;

impl AuditHook {
    fn emit(ctx: &RequestContext, action: &str, id: Uuid) {
        AuditEvent::new(
            ctx.actor_id(),
            action,
            Some(format!("user:{id}")),
            AuditOutcome::Success,
        )
        .with_ip(ctx.ip_address.clone())
        .with_user_agent(ctx.user_agent.clone())
        .log();
    }
}

#[async_trait]
impl UserLifecycleHook for AuditHook {
    async fn after_create(&self, ctx: &RequestContext, user: &User) {
        Self::emit(ctx, "user.create", user.id);
    }

    async fn after_update(&self, ctx: &RequestContext, user: &User) {
        Self::emit(ctx, "user.update", user.id);
    }

    async fn after_delete(&self, ctx: &RequestContext, id: Uuid) {
        Self::emit(ctx, "user.delete", id);
    }
}
