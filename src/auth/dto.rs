use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    /// True when this login created the user.
    pub created: bool,
}
