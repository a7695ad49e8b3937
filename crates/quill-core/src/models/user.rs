//! Signed-in user

use serde::{Deserialize, Serialize};

/// User echoed by the login and signup endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}
