use juniper::FieldError;

use crate::{
    graphql::{Ctx, field_error},
    progression::level::LevelInfo,
    service::ProgressSummary,
};

pub struct ProgressQueryType;

#[juniper::graphql_object(context = Ctx)]
impl ProgressQueryType {
    async fn my(ctx: &Ctx) -> Result<ProgressSummary, FieldError> {
        get_progress(ctx).await
    }

    /// Level for an arbitrary XP total, using the configured thresholds.
    async fn level(ctx: &Ctx, xp: i32) -> Result<LevelInfo, FieldError> {
        ctx.service
            .thresholds()
            .level_for(xp)
            .map_err(|e| FieldError::from(e.to_string()))
    }

    async fn thresholds(ctx: &Ctx) -> Vec<i32> {
        ctx.service.thresholds().as_slice().to_vec()
    }
}

pub async fn get_progress(ctx: &Ctx) -> Result<ProgressSummary, FieldError> {
    let user_id = ctx.require_user()?;

    match ctx.service.progress(user_id).await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            tracing::error!("[get_progress] Failed to load progress for {}: {:?}", user_id, e);
            Err(field_error(&e))
        }
    }
}
