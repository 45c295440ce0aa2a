use juniper::FieldError;

use crate::{
    graphql::{Ctx, field_error},
    service::CompletionReceipt,
};

pub struct MissionMutationType;

#[juniper::graphql_object(context = Ctx)]
impl MissionMutationType {
    async fn complete(ctx: &Ctx, mission_id: String) -> Result<CompletionReceipt, FieldError> {
        complete_mission(ctx, mission_id).await
    }
}

pub async fn complete_mission(ctx: &Ctx, mission_id: String) -> Result<CompletionReceipt, FieldError> {
    let user_id = ctx.require_user()?;

    match ctx.service.complete_mission(user_id, &mission_id).await {
        Ok(receipt) => Ok(receipt),
        Err(e) => {
            tracing::error!(
                "[complete_mission] Failed to complete {} for {}: {:?}",
                mission_id,
                user_id,
                e
            );
            Err(field_error(&e))
        }
    }
}
