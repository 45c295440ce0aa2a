use rocket::{
    Request,
    request::{FromRequest, Outcome},
};
use serde::{Deserialize, Serialize};

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Identifier of the authenticated user, as forwarded by the authentication
/// provider in front of this server. Empty when the header is absent.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(crate = "rocket::serde")]
pub struct RequestUserId {
    pub value: String,
}

impl RequestUserId {
    /// The trimmed id, or `None` for a missing or blank header.
    pub fn get(&self) -> Option<&str> {
        let value = self.value.trim();
        (!value.is_empty()).then_some(value)
    }
}

/// Extracts the user id from the `X-User-Id` header.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequestUserId {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let value = request.headers().get_one(USER_ID_HEADER).unwrap_or("");
        Outcome::Success(
            request
                .local_cache(|| RequestUserId {
                    value: value.to_string(),
                })
                .clone(),
        )
    }
}
