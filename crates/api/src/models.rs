use shared::api::UserResponse;
use sqlx::FromRow;

/// A player's game identity and the platform account it is linked to.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub platform_id: String,
    pub platform: String,
    pub device_id: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            platform_id: user.platform_id,
            platform: user.platform,
            device_id: user.device_id,
        }
    }
}
