use std::sync::Arc;

use juniper::{Context, EmptySubscription, FieldError, RootNode, graphql_object};
use juniper_rocket::{GraphQLRequest, GraphQLResponse};
use rocket::{Route, State, get, post, response::content::RawHtml};

use crate::{
    graphql::{
        missions::{mutations::MissionMutationType, queries::MissionQueryType},
        progress::queries::ProgressQueryType,
    },
    progression::errors::ProgressionError,
    service::ProgressService,
    store::{Store, StoreError},
    utils::user_id::RequestUserId,
};

pub mod missions;
pub mod progress;

pub type Service = ProgressService<Store>;

pub fn routes() -> Vec<Route> {
    routes![graphiql, graphql]
}

pub struct Ctx {
    /// Set from the `X-User-Id` header; every per-user resolver passes it on
    /// explicitly.
    pub user_id: Option<String>,
    pub service: Arc<Service>,
}

impl Context for Ctx {}

impl Ctx {
    pub fn require_user(&self) -> Result<&str, FieldError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| FieldError::from("Missing user"))
    }
}

pub struct Query;

#[graphql_object(context = Ctx)]
impl Query {
    pub async fn missions() -> MissionQueryType {
        MissionQueryType
    }

    pub async fn progress() -> ProgressQueryType {
        ProgressQueryType
    }
}

pub struct Mutation;

#[graphql_object(context = Ctx)]
impl Mutation {
    pub async fn missions() -> MissionMutationType {
        MissionMutationType
    }
}

pub type Schema = RootNode<'static, Query, Mutation, EmptySubscription<Ctx>>;

pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

/// Maps a store failure to the message returned to the client. The details
/// are logged by the caller.
pub fn field_error(error: &StoreError) -> FieldError {
    match error {
        StoreError::Progression(ProgressionError::UnknownMission(_)) => {
            FieldError::from("Unknown mission")
        }
        StoreError::Progression(ProgressionError::InvalidInput(_)) => {
            FieldError::from("Invalid input")
        }
        StoreError::ConcurrencyViolation { .. } => {
            FieldError::from("Progress changed while saving, please try again")
        }
        StoreError::Database(_) => FieldError::from("Failed to reach progress store"),
    }
}

#[get("/graphiql")]
pub fn graphiql() -> RawHtml<String> {
    juniper_rocket::graphiql_source("/graphql", None)
}

#[post("/", data = "<request>")]
pub async fn graphql(
    request: GraphQLRequest,
    user_id: RequestUserId,
    service: &State<Arc<Service>>,
) -> GraphQLResponse {
    let ctx = Ctx {
        user_id: user_id.get().map(str::to_string),
        service: service.inner().clone(),
    };
    let schema = schema();

    request.execute(&schema, &ctx).await
}
