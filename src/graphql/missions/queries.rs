use juniper::FieldError;

use crate::{
    graphql::Ctx,
    progression::mission::{Mission, MissionCategory},
};

pub struct MissionQueryType;

#[juniper::graphql_object(context = Ctx)]
impl MissionQueryType {
    async fn list(ctx: &Ctx, category: Option<MissionCategory>) -> Vec<Mission> {
        list_missions(ctx, category)
    }

    async fn one(ctx: &Ctx, id: String) -> Result<Mission, FieldError> {
        match ctx.service.ledger().mission(&id) {
            Some(mission) => Ok(mission.clone()),
            None => Err(FieldError::from("Unknown mission")),
        }
    }
}

pub fn list_missions(ctx: &Ctx, category: Option<MissionCategory>) -> Vec<Mission> {
    ctx.service
        .ledger()
        .list_missions(category)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::graphql::tests::{memory_service, run};
    use juniper::graphql_value;

    #[tokio::test]
    async fn test_list_missions_by_category() {
        let service = memory_service();
        let (value, errors) = run(
            "{ missions { list(category: WEEKLY) { id xp category } } }",
            None,
            &service,
        )
        .await;
        assert!(errors.is_empty());
        assert_eq!(
            value,
            graphql_value!({
                "missions": {
                    "list": [
                        {"id": "m3", "xp": 40, "category": "WEEKLY"},
                        {"id": "m4", "xp": 30, "category": "WEEKLY"}
                    ]
                }
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_mission_lookup() {
        let service = memory_service();
        let (_, errors) = run("{ missions { one(id: \"zz\") { id } } }", None, &service).await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error().message(), "Unknown mission");
    }
}
