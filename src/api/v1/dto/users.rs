/*
 * Responsibility
 * - Users の response DTO
 */
use serde::Serialize;

use crate::services::identity::Identity;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub user_name: String,
    pub image_url: Option<String>,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            user_name: identity.user_name,
            image_url: identity.image_url,
        }
    }
}
