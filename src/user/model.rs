use serde::{Deserialize, Serialize};

use super::Id;

/// Authenticated user as supplied by the identity provider, or a chat target
/// as supplied by the item/reporter lookup. Both collaborators hand over the
/// same `{ id, username }` shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Id,
    pub username: String,
}

impl UserInfo {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: Id(id.into()),
            username: username.into(),
        }
    }
}
